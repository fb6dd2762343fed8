use anyhow::{Context, Result};
use async_trait::async_trait;
use std::collections::BTreeMap;
use tracing::info;

use crate::core::config::ExtractionSection;

/// Token counters reported by the completion backend.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TokenUsage {
    pub input_tokens: u64,
    pub output_tokens: u64,
    pub total_tokens: u64,
}

impl TokenUsage {
    /// Shape stored on the product record.
    pub fn to_map(self) -> BTreeMap<String, u64> {
        BTreeMap::from([
            ("input_tokens".to_string(), self.input_tokens),
            ("output_tokens".to_string(), self.output_tokens),
            ("total_tokens".to_string(), self.total_tokens),
        ])
    }
}

/// Raw model reply plus usage metadata.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Completion {
    pub content: String,
    pub usage: Option<TokenUsage>,
}

/// Generative text backend: prompt in, completion out.
#[async_trait]
pub trait CompletionClient: Send + Sync {
    async fn complete(&self, prompt: &str) -> Result<Completion>;
}

/// OpenAI-compatible `/chat/completions` client (OpenAI, Ollama, LM Studio, vLLM, …).
#[derive(Clone)]
pub struct OpenAiCompatClient {
    http: reqwest::Client,
    base_url: String,
    api_key: Option<String>,
    model: String,
    max_tokens: u32,
}

impl std::fmt::Debug for OpenAiCompatClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OpenAiCompatClient")
            .field("base_url", &self.base_url)
            .field("model", &self.model)
            .field("max_tokens", &self.max_tokens)
            .finish()
    }
}

impl OpenAiCompatClient {
    pub fn new(
        http: reqwest::Client,
        base_url: impl Into<String>,
        api_key: Option<String>,
        model: impl Into<String>,
        max_tokens: u32,
    ) -> Self {
        Self {
            http,
            base_url: base_url.into(),
            api_key,
            model: model.into(),
            max_tokens,
        }
    }

    pub fn from_config(http: reqwest::Client, cfg: &ExtractionSection) -> Self {
        Self::new(
            http,
            cfg.resolve_base_url(),
            cfg.resolve_api_key(),
            cfg.resolve_model(),
            cfg.resolve_max_tokens(),
        )
    }

    pub fn model(&self) -> &str {
        &self.model
    }
}

#[async_trait]
impl CompletionClient for OpenAiCompatClient {
    async fn complete(&self, prompt: &str) -> Result<Completion> {
        let url = format!("{}/chat/completions", self.base_url.trim_end_matches('/'));

        let body = serde_json::json!({
            "model": self.model,
            "temperature": 0,
            "max_tokens": self.max_tokens,
            "messages": [
                {"role": "user", "content": prompt}
            ]
        });

        let builder = self.http.post(url).json(&body);
        // Key-less local endpoints (Ollama / LM Studio) work without Authorization.
        let builder = match self.api_key.as_deref().map(str::trim) {
            Some(key) if !key.is_empty() => builder.bearer_auth(key),
            _ => builder,
        };

        let response = builder
            .send()
            .await
            .context("chat.completions request failed")?;

        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();
            anyhow::bail!("chat.completions failed: status={} body={}", status, text);
        }

        let value: serde_json::Value = response
            .json()
            .await
            .context("chat.completions response json parse failed")?;

        let content = value
            .get("choices")
            .and_then(|v| v.as_array())
            .and_then(|arr| arr.first())
            .and_then(|c| c.get("message"))
            .and_then(|m| m.get("content"))
            .and_then(|c| c.as_str())
            .map(|s| s.to_string())
            .context("chat.completions response had no message content")?;

        let usage = value.get("usage").map(|u| {
            let field = |k: &str| u.get(k).and_then(|v| v.as_u64()).unwrap_or(0);
            let input_tokens = field("prompt_tokens");
            let output_tokens = field("completion_tokens");
            let total_tokens = u
                .get("total_tokens")
                .and_then(|v| v.as_u64())
                .unwrap_or(input_tokens + output_tokens);
            TokenUsage {
                input_tokens,
                output_tokens,
                total_tokens,
            }
        });

        info!(
            "🧠 {} replied ({} chars, {} tokens)",
            self.model,
            content.len(),
            usage.map(|u| u.total_tokens).unwrap_or(0)
        );

        Ok(Completion { content, usage })
    }
}
