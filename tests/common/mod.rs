//! Shared fakes: an in-memory renderer and a scripted completion backend.
#![allow(dead_code)]

use async_trait::async_trait;
use product_scout::extract::{Completion, CompletionClient, TokenUsage};
use product_scout::scraping::PageRenderer;
use product_scout::PipelineFailure;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

pub fn init_logger() {
    let _ = tracing_subscriber::fmt()
        .with_max_level(tracing::Level::INFO)
        .with_test_writer()
        .try_init();
}

pub const PRODUCT_PAGE: &str = r#"<html><head><title>Acme Kettle</title><script>var x = 1;</script></head>
<body>
  <div id="centerCol">
    <h1 id="productTitle">Acme Electric Kettle 1.7L</h1>
    <span class="a-price">$39.99</span>
  </div>
  <div id="altImages">
    <img src="https://m.example.com/images/I/kettle1._AC_US40_.jpg">
    <img data-src="https://m.example.com/images/I/kettle2._AC_US40_.jpg">
    <img src="https://m.example.com/images/I/kettle1._SS40_.jpg">
  </div>
  <div class="a-carousel-row"><img src="https://m.example.com/images/S/brand1._CR0,0_.png"></div>
  <div class="aplus-v2 desktop celwidget"><p>Boils in 3 minutes.</p>
    <img data-old-hires="https://m.example.com/images/S/aplus1._SL1500_.jpg"></div>
  <script>{"url": "https://v.example.com/kettle-demo.mp4"}</script>
</body></html>"#;

pub enum Page {
    Markup(&'static str),
    Fails(PipelineFailure),
}

/// Serves canned markup per URL.
pub struct FakeRenderer {
    pages: HashMap<String, Page>,
}

impl FakeRenderer {
    pub fn new(pages: Vec<(&str, Page)>) -> Self {
        Self {
            pages: pages
                .into_iter()
                .map(|(u, p)| (u.to_string(), p))
                .collect(),
        }
    }
}

#[async_trait]
impl PageRenderer for FakeRenderer {
    async fn render(&self, url: &str) -> Result<String, PipelineFailure> {
        match self.pages.get(url) {
            Some(Page::Markup(m)) => Ok(m.to_string()),
            Some(Page::Fails(f)) => Err(f.clone()),
            None => Err(PipelineFailure::Network(format!(
                "net::ERR_NAME_NOT_RESOLVED at {url}"
            ))),
        }
    }
}

/// Replies with a fixed body and remembers every prompt it saw.
pub struct ScriptedLlm {
    reply: String,
    pub prompts: Mutex<Vec<String>>,
}

impl ScriptedLlm {
    pub fn new(reply: &str) -> Arc<Self> {
        Arc::new(Self {
            reply: reply.to_string(),
            prompts: Mutex::new(Vec::new()),
        })
    }

    pub fn calls(&self) -> usize {
        self.prompts.lock().unwrap().len()
    }
}

#[async_trait]
impl CompletionClient for ScriptedLlm {
    async fn complete(&self, prompt: &str) -> anyhow::Result<Completion> {
        self.prompts.lock().unwrap().push(prompt.to_string());
        Ok(Completion {
            content: self.reply.clone(),
            usage: Some(TokenUsage {
                input_tokens: 900,
                output_tokens: 100,
                total_tokens: 1000,
            }),
        })
    }
}

pub const KETTLE_REPLY: &str = "```json\n{\"title\": \"Acme Electric Kettle 1.7L\", \"price\": \"$39.99\", \"review_count\": 1234}\n```";

/// App state whose pipeline runs on the given fakes.
pub fn fake_state(
    renderer: FakeRenderer,
    llm: Arc<ScriptedLlm>,
) -> Arc<product_scout::AppState> {
    let state = product_scout::AppState::new(reqwest::Client::new(), Default::default())
        .with_pipeline(product_scout::Pipeline::new(Arc::new(renderer), llm));
    Arc::new(state)
}
