use crate::core::types::ProductRecord;
use crate::core::PipelineFailure;

/// Per-request record threaded through the stages.
///
/// Fields are only reachable through accessors; every setter is a no-op once
/// a failure is recorded, so a failed context can never gain markup, text or
/// a product afterwards.
#[derive(Debug, Clone, PartialEq)]
pub struct PipelineContext {
    url: String,
    raw_markup: Option<String>,
    normalized_text: Option<String>,
    structured_result: Option<ProductRecord>,
    failure: Option<PipelineFailure>,
}

impl PipelineContext {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            raw_markup: None,
            normalized_text: None,
            structured_result: None,
            failure: None,
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn raw_markup(&self) -> Option<&str> {
        self.raw_markup.as_deref()
    }

    pub fn normalized_text(&self) -> Option<&str> {
        self.normalized_text.as_deref()
    }

    pub fn structured_result(&self) -> Option<&ProductRecord> {
        self.structured_result.as_ref()
    }

    pub fn failure(&self) -> Option<&PipelineFailure> {
        self.failure.as_ref()
    }

    pub fn is_failed(&self) -> bool {
        self.failure.is_some()
    }

    pub fn with_raw_markup(mut self, markup: String) -> Self {
        if !self.is_failed() {
            self.raw_markup = Some(markup);
        }
        self
    }

    pub fn with_normalized_text(mut self, text: String) -> Self {
        if !self.is_failed() {
            self.normalized_text = Some(text);
        }
        self
    }

    pub fn with_structured_result(mut self, record: ProductRecord) -> Self {
        if !self.is_failed() {
            self.structured_result = Some(record);
        }
        self
    }

    /// Record a terminal failure. The first failure wins.
    pub fn fail(mut self, failure: PipelineFailure) -> Self {
        if self.failure.is_none() {
            self.failure = Some(failure);
        }
        self
    }

    /// Final outcome: the product, or why there is none.
    pub fn into_outcome(self) -> Result<Option<ProductRecord>, PipelineFailure> {
        match self.failure {
            Some(f) => Err(f),
            None => Ok(self.structured_result),
        }
    }
}
