//! Morphcalc - Type Definitions
//!
//! Shared types for the self-rewriting calculator: configuration and the
//! code-generation client boundary.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

// ─── Configuration ───────────────────────────────────────────────

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MorphConfig {
    /// Base URL of the OpenAI-compatible inference endpoint.
    pub api_url: String,
    /// API key for the endpoint. Loaded from the config file and handed to
    /// the codegen client explicitly; never stored in process-global state.
    pub api_key: String,
    /// Model identifier used for rewrite requests.
    pub model: String,
    /// Token budget per rewrite completion.
    pub max_tokens: u32,
    pub log_level: LogLevel,
}

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Debug,
    Info,
    Warn,
    Error,
}

/// Models offered in the customize flow. The configured model is always
/// selectable even when it is not in this list.
pub static KNOWN_MODELS: &[&str] = &["gpt-4o", "o1-mini", "o1-preview"];

/// Returns the default `MorphConfig`. The API key has no sensible default
/// and starts empty; the customize flow prompts for it.
pub fn default_config() -> MorphConfig {
    MorphConfig {
        api_url: "https://api.openai.com".to_string(),
        api_key: String::new(),
        model: "gpt-4o".to_string(),
        max_tokens: 16_384,
        log_level: LogLevel::Info,
    }
}

// ─── Code Generation ─────────────────────────────────────────────

/// Boundary to the remote code-generation service.
///
/// Implementations receive the user's instruction and the full current
/// source of the tracked file, and return a sanitized complete replacement
/// body (no fencing, no commentary).
#[async_trait]
pub trait CodegenClient: Send + Sync {
    async fn generate(&self, instruction: &str, current_source: &str) -> anyhow::Result<String>;
}
