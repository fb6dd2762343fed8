use anyhow::{anyhow, bail, Result};
use async_trait::async_trait;
use chromiumoxide::cdp::browser_protocol::network::{Headers, SetExtraHttpHeadersParams};
use chromiumoxide::cdp::browser_protocol::page::NavigateParams;
use chromiumoxide::Page;
use std::time::Duration;
use tracing::info;

use super::browser_manager::{self, BrowserSession, ACCEPT_HEADER, ACCEPT_LANGUAGE_HEADER};
use crate::core::config::BrowserSection;
use crate::core::PipelineFailure;

/// Produces the rendered markup of a page.
///
/// Implementations own whatever resources they need per call; nothing is shared
/// between calls.
#[async_trait]
pub trait PageRenderer: Send + Sync {
    async fn render(&self, url: &str) -> Result<String, PipelineFailure>;
}

/// Headless Chromium over CDP: one fresh browser per `render` call.
#[derive(Debug, Clone)]
pub struct ChromiumRenderer {
    executable: Option<String>,
    navigation_timeout: Duration,
    settle_delay: Duration,
}

const DOM_READY_POLL: Duration = Duration::from_millis(100);

impl ChromiumRenderer {
    pub fn new(executable: Option<String>, navigation_timeout: Duration, settle_delay: Duration) -> Self {
        Self {
            executable,
            navigation_timeout,
            settle_delay,
        }
    }

    pub fn from_config(cfg: &BrowserSection) -> Self {
        Self::new(
            cfg.resolve_chrome_executable(),
            cfg.resolve_navigation_timeout(),
            cfg.resolve_settle_delay(),
        )
    }

    fn executable(&self) -> Option<String> {
        self.executable
            .clone()
            .or_else(browser_manager::find_chrome_executable)
    }

    async fn render_in(&self, session: &BrowserSession, url: &str) -> Result<String, PipelineFailure> {
        let page = session
            .new_page()
            .await
            .map_err(|e| PipelineFailure::Browser(e.to_string()))?;

        set_request_headers(&page)
            .await
            .map_err(|e| PipelineFailure::Browser(e.to_string()))?;

        info!("🌐 Navigating to: {}", url);
        match tokio::time::timeout(self.navigation_timeout, navigate_until_dom_ready(&page, url)).await {
            Err(_) => {
                return Err(PipelineFailure::NavigationTimeout(
                    self.navigation_timeout.as_secs(),
                ))
            }
            Ok(Err(e)) => return Err(PipelineFailure::from_browser_error(e.to_string())),
            Ok(Ok(())) => {}
        }

        let html = scroll_settle_and_read(&page, self.settle_delay).await?;
        info!("✅ Rendered {} ({} chars)", url, html.len());
        Ok(html)
    }
}

#[async_trait]
impl PageRenderer for ChromiumRenderer {
    async fn render(&self, url: &str) -> Result<String, PipelineFailure> {
        let exe = self.executable().ok_or_else(|| {
            PipelineFailure::Browser(
                "No browser found. Install Chrome or Chromium, or set CHROME_EXECUTABLE.".to_string(),
            )
        })?;
        let config = browser_manager::build_headless_config(&exe, 1920, 1080)
            .map_err(|e| PipelineFailure::Browser(e.to_string()))?;
        let session = BrowserSession::launch(config)
            .await
            .map_err(|e| PipelineFailure::Browser(e.to_string()))?;

        let outcome = self.render_in(&session, url).await;
        session.close().await;
        outcome
    }
}

async fn set_request_headers(page: &Page) -> Result<()> {
    let headers = Headers::new(serde_json::json!({
        "Accept": ACCEPT_HEADER,
        "Accept-Language": ACCEPT_LANGUAGE_HEADER,
    }));
    page.execute(SetExtraHttpHeadersParams::new(headers))
        .await
        .map_err(|e| anyhow!("Failed to set request headers: {}", e))?;
    Ok(())
}

/// The part of a CDP page the post-navigation steps use.
#[async_trait]
trait PageHandle: Send + Sync {
    /// Evaluate `script`; `None` when it produced no JSON value (e.g. `undefined`).
    async fn eval(&self, script: &str) -> Result<Option<serde_json::Value>>;
    async fn html(&self) -> Result<String>;
}

#[async_trait]
impl PageHandle for Page {
    async fn eval(&self, script: &str) -> Result<Option<serde_json::Value>> {
        let result = self
            .evaluate(script)
            .await
            .map_err(|e| anyhow!("evaluate failed: {}", e))?;
        Ok(result.value().cloned())
    }

    async fn html(&self) -> Result<String> {
        self.content()
            .await
            .map_err(|e| anyhow!("Failed to get page content: {}", e))
    }
}

const DOM_READY_SCRIPT: &str =
    "location.href !== 'about:blank' && document.readyState !== 'loading'";
const SCROLL_SCRIPT: &str = "window.scrollTo(0, document.body.scrollHeight)";

/// CDP errors raised while the new document replaces the old one. Polling retries these.
const TRANSIENT_CONTEXT_ERRORS: &[&str] = &[
    "Execution context was destroyed",
    "Cannot find context with specified id",
    "Inspected target navigated or closed",
];

fn is_transient_context_error(message: &str) -> bool {
    TRANSIENT_CONTEXT_ERRORS.iter().any(|m| message.contains(m))
}

/// Navigate and return once the new document has finished parsing
/// (`DOMContentLoaded`), without waiting for subresources.
async fn navigate_until_dom_ready(page: &Page, url: &str) -> Result<()> {
    let nav = page
        .execute(NavigateParams::new(url))
        .await
        .map_err(|e| anyhow!("Failed to navigate: {}", e))?;
    if let Some(error_text) = nav.result.error_text.as_deref() {
        bail!("{}", error_text);
    }
    wait_for_dom_ready(page).await
}

async fn wait_for_dom_ready<P: PageHandle + ?Sized>(page: &P) -> Result<()> {
    loop {
        match page.eval(DOM_READY_SCRIPT).await {
            Ok(Some(serde_json::Value::Bool(true))) => return Ok(()),
            Ok(_) => {}
            Err(e) if is_transient_context_error(&e.to_string()) => {}
            Err(e) => return Err(e),
        }
        tokio::time::sleep(DOM_READY_POLL).await;
    }
}

/// Scroll once so lazy widgets materialize, let them settle, then read the markup.
async fn scroll_settle_and_read<P: PageHandle + ?Sized>(
    page: &P,
    settle_delay: Duration,
) -> Result<String, PipelineFailure> {
    page.eval(SCROLL_SCRIPT)
        .await
        .map_err(|e| PipelineFailure::from_browser_error(format!("scroll to bottom failed: {}", e)))?;
    tokio::time::sleep(settle_delay).await;
    page.html()
        .await
        .map_err(|e| PipelineFailure::from_browser_error(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::VecDeque;
    use std::sync::Mutex;

    /// Replays scripted `eval` results in order; counts `html` reads.
    struct ScriptedPage {
        evals: Mutex<VecDeque<Result<Option<serde_json::Value>, String>>>,
        html_reads: Mutex<usize>,
    }

    impl ScriptedPage {
        fn new(evals: Vec<Result<Option<serde_json::Value>, String>>) -> Self {
            Self {
                evals: Mutex::new(evals.into()),
                html_reads: Mutex::new(0),
            }
        }
    }

    #[async_trait]
    impl PageHandle for ScriptedPage {
        async fn eval(&self, _script: &str) -> Result<Option<serde_json::Value>> {
            match self.evals.lock().unwrap().pop_front() {
                Some(Ok(v)) => Ok(v),
                Some(Err(msg)) => Err(anyhow!(msg)),
                None => bail!("no scripted result left"),
            }
        }

        async fn html(&self) -> Result<String> {
            *self.html_reads.lock().unwrap() += 1;
            Ok("<html><body>ok</body></html>".to_string())
        }
    }

    #[tokio::test]
    async fn scroll_error_fails_the_render() {
        let page = ScriptedPage::new(vec![Err("Target closed".into())]);
        let err = scroll_settle_and_read(&page, Duration::ZERO).await.unwrap_err();
        assert_eq!(err.kind(), "browser");
        assert!(err.to_string().contains("scroll to bottom failed"));
        assert_eq!(*page.html_reads.lock().unwrap(), 0);
    }

    #[tokio::test]
    async fn scroll_then_read() {
        let page = ScriptedPage::new(vec![Ok(None)]);
        let html = scroll_settle_and_read(&page, Duration::ZERO).await.unwrap();
        assert!(html.contains("ok"));
    }

    #[tokio::test]
    async fn dom_wait_retries_through_context_swaps() {
        let page = ScriptedPage::new(vec![
            Ok(Some(serde_json::Value::Bool(false))),
            Err("Execution context was destroyed.".into()),
            Ok(Some(serde_json::Value::Bool(true))),
        ]);
        assert!(wait_for_dom_ready(&page).await.is_ok());
    }

    #[tokio::test]
    async fn dom_wait_surfaces_hard_errors_immediately() {
        let page = ScriptedPage::new(vec![
            Err("Cannot find context with specified id".into()),
            Err("Target closed".into()),
            Ok(Some(serde_json::Value::Bool(true))),
        ]);
        let err = wait_for_dom_ready(&page).await.unwrap_err();
        assert_eq!(err.to_string(), "Target closed");
    }
}
