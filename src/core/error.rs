use thiserror::Error;

/// Terminal failure carried on a [`crate::pipeline::PipelineContext`].
///
/// The `Display` text is what HTTP callers receive, so keep messages short and
/// self-contained.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PipelineFailure {
    #[error("navigation timed out after {0}s")]
    NavigationTimeout(u64),

    #[error("network error: {0}")]
    Network(String),

    #[error("blocking detected: anti-bot challenge page served ({0})")]
    Blocked(String),

    #[error("browser error: {0}")]
    Browser(String),

    #[error("Extraction failed: {0}")]
    Extraction(String),
}

impl PipelineFailure {
    /// Stable machine-readable tag, used in logs and batch status rows.
    pub fn kind(&self) -> &'static str {
        match self {
            PipelineFailure::NavigationTimeout(_) => "navigation_timeout",
            PipelineFailure::Network(_) => "network",
            PipelineFailure::Blocked(_) => "blocked",
            PipelineFailure::Browser(_) => "browser",
            PipelineFailure::Extraction(_) => "extraction",
        }
    }

    /// Classify a raw browser/navigation error message.
    ///
    /// Chromium reports DNS, connection and TLS problems as `net::ERR_*` codes;
    /// everything else is an unclassified browser fault.
    pub fn from_browser_error(message: impl Into<String>) -> Self {
        let message = message.into();
        if message.contains("net::ERR_") {
            PipelineFailure::Network(message)
        } else {
            PipelineFailure::Browser(message)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extraction_failures_carry_the_marker_prefix() {
        let failure = PipelineFailure::Extraction("expected value at line 1 column 1".into());
        assert!(failure.to_string().starts_with("Extraction failed:"));
        assert_eq!(failure.kind(), "extraction");
    }

    #[test]
    fn net_err_codes_classify_as_network() {
        let f = PipelineFailure::from_browser_error("net::ERR_NAME_NOT_RESOLVED");
        assert_eq!(f, PipelineFailure::Network("net::ERR_NAME_NOT_RESOLVED".into()));

        let f = PipelineFailure::from_browser_error("Target closed");
        assert_eq!(f.kind(), "browser");
    }
}
