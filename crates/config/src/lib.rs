use std::env;
use std::fs;
use std::path::Path;

use anyhow::Result;
use serde::{Deserialize, Serialize};

// ── Scrape config ────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScrapeConfig {
    /// Header name of the URL column in the input spreadsheet.
    pub url_column: String,
    /// Per-URL fetch timeout in seconds.  A timeout counts as an ordinary
    /// fetch failure for that record, not a fatal error.
    pub fetch_timeout_secs: u64,
    pub user_agent: String,
}

impl Default for ScrapeConfig {
    fn default() -> Self {
        Self {
            url_column: "book_urls".to_string(),
            fetch_timeout_secs: 5,
            user_agent: "prodsift/0.1 (https://github.com/your-org/prodsift)".to_string(),
        }
    }
}

// ── LLM config ───────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmConfig {
    /// Gemini model id used for product questions.  Overridden at runtime by
    /// the `GEMINI_MODEL` environment variable when set.
    pub model: String,
    pub api_base: String,
    pub max_output_tokens: u32,
    pub temperature: f32,
    pub top_p: f32,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            model: "gemini-2.0-flash".to_string(),
            api_base: "https://generativelanguage.googleapis.com/v1beta".to_string(),
            max_output_tokens: 300,
            temperature: 0.7,
            top_p: 0.9,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TelemetryConfig {
    pub log_level: String,
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct AppConfig {
    pub scrape: ScrapeConfig,
    pub llm: LlmConfig,
    pub telemetry: TelemetryConfig,
}

impl AppConfig {
    /// Load config from a TOML file, falling back to defaults when the file
    /// is missing.  The Gemini API key is deliberately not part of this
    /// struct: the credential is passed explicitly into the question
    /// responder by the caller.
    pub fn load_from(path: impl AsRef<Path>) -> Result<Self> {
        let mut config = Self::default();
        if let Ok(raw) = fs::read_to_string(path) {
            config = toml::from_str(&raw)?;
        }

        // Model env override (takes precedence over config file).
        if let Ok(model) = env::var("GEMINI_MODEL") {
            if !model.is_empty() {
                config.llm.model = model;
            }
        }

        Ok(config)
    }

    pub fn save_to(&self, path: impl AsRef<Path>) -> Result<()> {
        if let Some(parent) = path.as_ref().parent() {
            fs::create_dir_all(parent)?;
        }

        let rendered = toml::to_string_pretty(self)?;
        fs::write(path, rendered)?;
        Ok(())
    }
}

// ── Tests ────────────────────────────────────────────────────────────────────
