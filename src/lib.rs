pub mod core;
pub mod extract;
pub mod http;
pub mod normalize;
pub mod pipeline;
pub mod scraping;

pub use core::types;
pub use core::types::*;
pub use core::{AppState, PipelineFailure};
pub use http::router;
pub use pipeline::{Pipeline, PipelineContext};
