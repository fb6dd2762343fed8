pub mod client;
pub mod prompt;
pub mod response;

pub use client::{Completion, CompletionClient, OpenAiCompatClient, TokenUsage};
pub use prompt::build_extraction_prompt;
pub use response::{parse_completion, strip_code_fence};
