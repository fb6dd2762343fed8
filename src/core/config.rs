use std::path::{Path, PathBuf};
use std::time::Duration;

// ---------------------------------------------------------------------------
// ScoutConfig: file-based config loader (product-scout.json) with env-var fallback
// ---------------------------------------------------------------------------

pub const ENV_CONFIG_PATH: &str = "PRODUCT_SCOUT_CONFIG";
pub const ENV_CHROME_EXECUTABLE: &str = "CHROME_EXECUTABLE";

/// Browser sub-config (the `browser` key in product-scout.json).
#[derive(serde::Deserialize, Default, Clone, Debug)]
pub struct BrowserSection {
    /// Explicit Chromium-family executable. Auto-discovered when unset.
    pub chrome_executable: Option<String>,
    /// Upper bound for navigation + DOM construction. Default: 30.
    pub navigation_timeout_secs: Option<u64>,
    /// Pause after the scroll-to-bottom so lazy content can render. Default: 2000.
    pub settle_ms: Option<u64>,
}

impl BrowserSection {
    /// Executable: JSON field → `CHROME_EXECUTABLE` env var → `None` (auto-discovery).
    ///
    /// Only paths that exist on disk are returned.
    pub fn resolve_chrome_executable(&self) -> Option<String> {
        let candidate = self
            .chrome_executable
            .clone()
            .filter(|p| !p.trim().is_empty())
            .or_else(|| std::env::var(ENV_CHROME_EXECUTABLE).ok())?;
        let candidate = candidate.trim();
        if Path::new(candidate).exists() {
            Some(candidate.to_string())
        } else {
            None
        }
    }

    /// Navigation timeout: JSON field → `NAVIGATION_TIMEOUT_SECS` env var → 30s.
    pub fn resolve_navigation_timeout(&self) -> Duration {
        let secs = self
            .navigation_timeout_secs
            .or_else(|| env_parse("NAVIGATION_TIMEOUT_SECS"))
            .unwrap_or(30);
        Duration::from_secs(secs)
    }

    /// Settle delay: JSON field → `SCROLL_SETTLE_MS` env var → 2000ms.
    pub fn resolve_settle_delay(&self) -> Duration {
        let ms = self
            .settle_ms
            .or_else(|| env_parse("SCROLL_SETTLE_MS"))
            .unwrap_or(2000);
        Duration::from_millis(ms)
    }
}

/// Extraction sub-config (the `extraction` key in product-scout.json).
#[derive(serde::Deserialize, Default, Clone, Debug)]
pub struct ExtractionSection {
    /// OpenAI-compatible endpoint, e.g. `https://api.openai.com/v1` or `http://localhost:11434/v1`.
    pub llm_base_url: Option<String>,
    /// API key. Never logged. Leave blank for key-less local endpoints.
    pub llm_api_key: Option<String>,
    /// Model name, e.g. `gpt-4o-mini`, `llama3`.
    pub llm_model: Option<String>,
    /// Max tokens the model may generate. Default: 8192.
    pub max_tokens: Option<u32>,
}

impl ExtractionSection {
    /// API key: JSON field → `OPENAI_API_KEY` env var → `None`.
    ///
    /// An explicit `""` in the config file means "no key required" and is returned as `Some("")`.
    pub fn resolve_api_key(&self) -> Option<String> {
        if let Some(k) = &self.llm_api_key {
            return Some(k.trim().to_string());
        }
        std::env::var("OPENAI_API_KEY")
            .ok()
            .filter(|v| !v.trim().is_empty())
    }

    /// Base URL: JSON field → `OPENAI_BASE_URL` env var → `https://api.openai.com/v1`.
    pub fn resolve_base_url(&self) -> String {
        if let Some(u) = &self.llm_base_url {
            if !u.trim().is_empty() {
                return u.trim().to_string();
            }
        }
        std::env::var("OPENAI_BASE_URL")
            .ok()
            .filter(|v| !v.trim().is_empty())
            .unwrap_or_else(|| "https://api.openai.com/v1".to_string())
    }

    /// Model: JSON field → `PRODUCT_SCOUT_LLM_MODEL` env var → `gpt-4o-mini`.
    pub fn resolve_model(&self) -> String {
        if let Some(m) = &self.llm_model {
            if !m.trim().is_empty() {
                return m.trim().to_string();
            }
        }
        std::env::var("PRODUCT_SCOUT_LLM_MODEL")
            .ok()
            .filter(|v| !v.trim().is_empty())
            .unwrap_or_else(|| "gpt-4o-mini".to_string())
    }

    /// Max output tokens: JSON field → `PRODUCT_SCOUT_LLM_MAX_TOKENS` env var → 8192.
    pub fn resolve_max_tokens(&self) -> u32 {
        self.max_tokens
            .or_else(|| env_parse("PRODUCT_SCOUT_LLM_MAX_TOKENS"))
            .unwrap_or(8192)
    }
}

/// Top-level config loaded from `product-scout.json`.
#[derive(serde::Deserialize, Default, Clone, Debug)]
pub struct ScoutConfig {
    #[serde(default)]
    pub browser: BrowserSection,
    #[serde(default)]
    pub extraction: ExtractionSection,
}

/// Load `product-scout.json` from standard locations.
///
/// Search order (first found wins):
/// 1. `PRODUCT_SCOUT_CONFIG` env var path
/// 2. `./product-scout.json`
/// 3. `../product-scout.json`
///
/// Missing file → `ScoutConfig::default()` (all env-var fallbacks apply).
/// Parse error → warning, `ScoutConfig::default()`.
pub fn load_scout_config() -> ScoutConfig {
    let mut candidates = vec![
        PathBuf::from("product-scout.json"),
        PathBuf::from("../product-scout.json"),
    ];
    if let Ok(env_path) = std::env::var(ENV_CONFIG_PATH) {
        candidates.insert(0, PathBuf::from(env_path));
    }
    load_scout_config_from(&candidates)
}

pub fn load_scout_config_from(candidates: &[PathBuf]) -> ScoutConfig {
    for path in candidates {
        let Ok(contents) = std::fs::read_to_string(path) else {
            continue;
        };
        return match serde_json::from_str::<ScoutConfig>(&contents) {
            Ok(cfg) => {
                tracing::info!("product-scout.json loaded from {}", path.display());
                cfg
            }
            Err(e) => {
                tracing::warn!(
                    "product-scout.json parse error at {}: {}; using defaults",
                    path.display(),
                    e
                );
                ScoutConfig::default()
            }
        };
    }
    ScoutConfig::default()
}

fn env_parse<T: std::str::FromStr>(key: &str) -> Option<T> {
    std::env::var(key).ok().and_then(|v| v.trim().parse().ok())
}

// ---------------------------------------------------------------------------

/// Listening port: `--port N` / `--port=N` → `PRODUCT_SCOUT_PORT` / `PORT` → 8000.
pub fn resolve_port<I>(args: I) -> u16
where
    I: IntoIterator<Item = String>,
{
    port_from_args(args).or_else(port_from_env).unwrap_or(8000)
}

fn port_from_args<I>(args: I) -> Option<u16>
where
    I: IntoIterator<Item = String>,
{
    let mut args = args.into_iter();
    while let Some(a) = args.next() {
        if a == "--port" {
            if let Some(p) = args.next().and_then(|v| v.parse::<u16>().ok()) {
                return Some(p);
            }
        } else if let Some(rest) = a.strip_prefix("--port=") {
            if let Ok(p) = rest.parse::<u16>() {
                return Some(p);
            }
        }
    }
    None
}

fn port_from_env() -> Option<u16> {
    ["PRODUCT_SCOUT_PORT", "PORT"]
        .into_iter()
        .find_map(|k| env_parse::<u16>(k))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn json_fields_take_precedence() {
        let cfg: ScoutConfig = serde_json::from_str(
            r#"{
                "browser": {"navigation_timeout_secs": 12, "settle_ms": 500},
                "extraction": {"llm_model": "llama3", "llm_base_url": "http://localhost:11434/v1", "llm_api_key": "", "max_tokens": 2048}
            }"#,
        )
        .unwrap();

        assert_eq!(cfg.browser.resolve_navigation_timeout(), Duration::from_secs(12));
        assert_eq!(cfg.browser.resolve_settle_delay(), Duration::from_millis(500));
        assert_eq!(cfg.extraction.resolve_model(), "llama3");
        assert_eq!(cfg.extraction.resolve_base_url(), "http://localhost:11434/v1");
        assert_eq!(cfg.extraction.resolve_api_key(), Some(String::new()));
        assert_eq!(cfg.extraction.resolve_max_tokens(), 2048);
    }

    #[test]
    fn sections_are_optional() {
        let cfg: ScoutConfig = serde_json::from_str("{}").unwrap();
        assert!(cfg.browser.navigation_timeout_secs.is_none());
        assert!(cfg.extraction.llm_model.is_none());
    }

    #[test]
    fn missing_or_broken_files_fall_back_to_defaults() {
        let dir = std::env::temp_dir();
        let broken = dir.join(format!("product-scout-broken-{}.json", uuid::Uuid::new_v4()));
        std::fs::write(&broken, "{ not json").unwrap();
        let cfg = load_scout_config_from(&[dir.join("does-not-exist.json"), broken.clone()]);
        assert!(cfg.browser.settle_ms.is_none());
        std::fs::remove_file(broken).ok();

        let good = dir.join(format!("product-scout-good-{}.json", uuid::Uuid::new_v4()));
        std::fs::write(&good, r#"{"browser": {"settle_ms": 750}}"#).unwrap();
        let cfg = load_scout_config_from(&[good.clone()]);
        assert_eq!(cfg.browser.settle_ms, Some(750));
        std::fs::remove_file(good).ok();
    }

    #[test]
    fn port_flag_forms() {
        let args = |v: &[&str]| v.iter().map(|s| s.to_string()).collect::<Vec<_>>();
        assert_eq!(port_from_args(args(&["bin", "--port", "9100"])), Some(9100));
        assert_eq!(port_from_args(args(&["bin", "--port=9200"])), Some(9200));
        assert_eq!(port_from_args(args(&["bin", "--port", "nope"])), None);
    }
}
