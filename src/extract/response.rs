use crate::core::types::ProductRecord;

use super::client::Completion;

/// Remove a surrounding Markdown code fence (```json … ``` or ``` … ```).
pub fn strip_code_fence(content: &str) -> &str {
    let trimmed = content.trim();
    let Some(rest) = trimmed
        .strip_prefix("```json")
        .or_else(|| trimmed.strip_prefix("```"))
    else {
        return trimmed;
    };
    rest.strip_suffix("```").unwrap_or(rest).trim()
}

/// Parse a model reply into a [`ProductRecord`], folding in token usage.
///
/// Whatever `usage` the model itself wrote is replaced by the backend's counters.
pub fn parse_completion(completion: &Completion) -> Result<ProductRecord, serde_json::Error> {
    let mut record: ProductRecord = serde_json::from_str(strip_code_fence(&completion.content))?;
    record.usage = completion.usage.map(|u| u.to_map()).unwrap_or_default();
    Ok(record)
}
