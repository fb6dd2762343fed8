pub mod batch;
pub mod context;

use std::sync::Arc;
use tracing::{info, warn, Instrument};

use crate::core::PipelineFailure;
use crate::extract::{build_extraction_prompt, parse_completion, CompletionClient};
use crate::normalize::normalize_markup;
use crate::scraping::antibot::detect_challenge;
use crate::scraping::PageRenderer;

pub use batch::UrlOutcome;
pub use context::PipelineContext;

/// Render the page and screen it for an anti-bot challenge.
pub async fn acquire_stage(ctx: PipelineContext, renderer: &dyn PageRenderer) -> PipelineContext {
    if ctx.is_failed() {
        return ctx;
    }
    let markup = match renderer.render(ctx.url()).await {
        Ok(m) => m,
        Err(failure) => {
            warn!("❌ render failed for {}: {}", ctx.url(), failure);
            return ctx.fail(failure);
        }
    };
    if let Some(marker) = detect_challenge(&markup) {
        warn!("🛡️ challenge page served for {}", ctx.url());
        return ctx.fail(PipelineFailure::Blocked(marker.to_string()));
    }
    info!("📄 acquired {} ({} bytes)", ctx.url(), markup.len());
    ctx.with_raw_markup(markup)
}

/// Reduce the markup to the sectioned text handed to the model.
pub fn normalize_stage(ctx: PipelineContext) -> PipelineContext {
    if ctx.is_failed() {
        return ctx;
    }
    let Some(raw) = ctx.raw_markup() else {
        return ctx;
    };
    let text = normalize_markup(raw);
    ctx.with_normalized_text(text)
}

/// Ask the model for the structured record and parse its reply.
pub async fn extract_stage(ctx: PipelineContext, llm: &dyn CompletionClient) -> PipelineContext {
    if ctx.is_failed() {
        return ctx;
    }
    let Some(text) = ctx.normalized_text() else {
        return ctx;
    };
    let prompt = build_extraction_prompt(text);

    let completion = match llm.complete(&prompt).await {
        Ok(c) => c,
        Err(e) => return ctx.fail(PipelineFailure::Extraction(format!("{e:#}"))),
    };
    match parse_completion(&completion) {
        Ok(record) => ctx.with_structured_result(record),
        Err(e) => ctx.fail(PipelineFailure::Extraction(e.to_string())),
    }
}

/// The acquire → normalize → extract chain with its two backends.
#[derive(Clone)]
pub struct Pipeline {
    renderer: Arc<dyn PageRenderer>,
    llm: Arc<dyn CompletionClient>,
}

impl std::fmt::Debug for Pipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Pipeline").finish_non_exhaustive()
    }
}

impl Pipeline {
    pub fn new(renderer: Arc<dyn PageRenderer>, llm: Arc<dyn CompletionClient>) -> Self {
        Self { renderer, llm }
    }

    /// Run all stages for one URL. Never panics; failures land on the context.
    pub async fn run(&self, url: &str) -> PipelineContext {
        let run_id = uuid::Uuid::new_v4();
        let span = tracing::info_span!("pipeline", %run_id, url);
        async {
            let ctx = PipelineContext::new(url);
            let ctx = acquire_stage(ctx, self.renderer.as_ref()).await;
            let ctx = normalize_stage(ctx);
            let ctx = extract_stage(ctx, self.llm.as_ref()).await;
            match ctx.failure() {
                Some(f) => warn!("pipeline failed ({}): {}", f.kind(), f),
                None => info!("✅ pipeline finished"),
            }
            ctx
        }
        .instrument(span)
        .await
    }
}
