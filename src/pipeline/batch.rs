use std::sync::Arc;
use std::time::Instant;
use tracing::{info, warn};

use crate::core::types::{ProductRecord, UrlStatus};
use crate::core::PipelineFailure;

use super::Pipeline;

/// Settled result of one URL in a batch.
#[derive(Debug, Clone, PartialEq)]
pub struct UrlOutcome {
    pub url: String,
    pub result: Result<Option<ProductRecord>, PipelineFailure>,
}

impl UrlOutcome {
    /// Row reported back to the caller. A run with neither product nor failure
    /// counts as not ok.
    pub fn status(&self) -> UrlStatus {
        let (ok, error) = match &self.result {
            Ok(Some(_)) => (true, None),
            Ok(None) => (false, Some("Could not extract product data".to_string())),
            Err(f) => (false, Some(f.to_string())),
        };
        UrlStatus {
            url: self.url.clone(),
            ok,
            error,
        }
    }

    pub fn product(&self) -> Option<&ProductRecord> {
        self.result.as_ref().ok().and_then(Option::as_ref)
    }
}

impl Pipeline {
    /// Run one isolated pipeline per URL concurrently and wait for all of them.
    ///
    /// Outcomes come back in request order. A panicking run is reported as a
    /// browser failure for its own URL only.
    pub async fn run_batch(self: &Arc<Self>, urls: Vec<String>) -> Vec<UrlOutcome> {
        let start = Instant::now();
        info!("Starting batch of {} URLs", urls.len());

        let tasks: Vec<_> = urls
            .into_iter()
            .map(|url| {
                let pipeline = Arc::clone(self);
                let task_url = url.clone();
                let handle =
                    tokio::spawn(async move { pipeline.run(&task_url).await.into_outcome() });
                (url, handle)
            })
            .collect();

        let mut outcomes = Vec::with_capacity(tasks.len());
        for (url, handle) in tasks {
            let result = match handle.await {
                Ok(r) => r,
                Err(e) => Err(PipelineFailure::Browser(format!("task join error: {e}"))),
            };
            if let Err(f) = &result {
                warn!("Batch URL failed {}: {}", url, f);
            }
            outcomes.push(UrlOutcome { url, result });
        }

        let ok = outcomes.iter().filter(|o| o.product().is_some()).count();
        info!(
            "Batch finished: {}/{} succeeded in {}ms",
            ok,
            outcomes.len(),
            start.elapsed().as_millis()
        );
        outcomes
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_rows_reflect_outcome() {
        let ok = UrlOutcome {
            url: "a".into(),
            result: Ok(Some(ProductRecord {
                title: "A".into(),
                ..Default::default()
            })),
        };
        assert_eq!(ok.status(), UrlStatus { url: "a".into(), ok: true, error: None });

        let empty = UrlOutcome {
            url: "b".into(),
            result: Ok(None),
        };
        assert!(!empty.status().ok);
        assert!(empty.product().is_none());

        let failed = UrlOutcome {
            url: "c".into(),
            result: Err(PipelineFailure::NavigationTimeout(30)),
        };
        assert_eq!(
            failed.status().error.as_deref(),
            Some("navigation timed out after 30s")
        );
    }
}
