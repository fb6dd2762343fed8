use std::sync::Arc;

use crate::core::config::ScoutConfig;
use crate::extract::OpenAiCompatClient;
use crate::pipeline::Pipeline;
use crate::scraping::ChromiumRenderer;

#[derive(Clone)]
pub struct AppState {
    pub pipeline: Arc<Pipeline>,
    /// Model of the built-in completion backend; `None` once the pipeline is swapped.
    model: Option<String>,
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("model", &self.model.as_deref().unwrap_or("custom"))
            .finish()
    }
}

impl AppState {
    /// Production wiring: Chromium renderer + OpenAI-compatible completion backend.
    pub fn new(http_client: reqwest::Client, scout_config: ScoutConfig) -> Self {
        let renderer = Arc::new(ChromiumRenderer::from_config(&scout_config.browser));
        let llm = OpenAiCompatClient::from_config(http_client, &scout_config.extraction);
        let model = Some(llm.model().to_string());
        Self {
            pipeline: Arc::new(Pipeline::new(renderer, Arc::new(llm))),
            model,
        }
    }

    /// Swap the pipeline (custom renderer / completion backend).
    pub fn with_pipeline(mut self, pipeline: Pipeline) -> Self {
        self.pipeline = Arc::new(pipeline);
        self.model = None;
        self
    }

    pub fn model(&self) -> Option<&str> {
        self.model.as_deref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::config::ExtractionSection;

    #[test]
    fn reports_configured_model() {
        let cfg = ScoutConfig {
            extraction: ExtractionSection {
                llm_model: Some("llama3".into()),
                ..Default::default()
            },
            ..Default::default()
        };
        let state = AppState::new(reqwest::Client::new(), cfg);
        assert_eq!(state.model(), Some("llama3"));
        assert!(format!("{state:?}").contains("llama3"));

        let pipeline = state.pipeline.as_ref().clone();
        let swapped = state.with_pipeline(pipeline);
        assert_eq!(swapped.model(), None);
    }
}
