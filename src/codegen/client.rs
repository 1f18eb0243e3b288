//! Codegen Client
//!
//! Wraps an OpenAI-compatible /v1/chat/completions endpoint. The request
//! carries a fixed system directive asking for a complete replacement source
//! file, the user's instruction, and the full current source; the response
//! is fence-stripped before it becomes replacement content.

use anyhow::{bail, Context, Result};
use async_trait::async_trait;
use regex::Regex;
use reqwest::Client;
use serde_json::Value;
use tracing::debug;

use crate::types::CodegenClient;

/// Fixed directive sent as the system message with every rewrite request.
const SYSTEM_DIRECTIVE: &str = "You are rewriting the complete source file of a \
self-modifying calculator. Return the ENTIRE updated source file, with no \
disclaimers, no commentary, and no code fences. Provide only valid source code.";

/// Codegen client for OpenAI-compatible chat completions.
///
/// Configuration is injected by the caller; there is no process-wide client
/// state.
pub struct OpenAiCodegen {
    api_url: String,
    api_key: String,
    model: String,
    max_tokens: u32,
    http: Client,
}

impl OpenAiCodegen {
    /// Create a new codegen client.
    ///
    /// * `api_url` - Base URL of the endpoint (e.g. `https://api.openai.com`).
    /// * `api_key` - Bearer credential for the endpoint.
    /// * `model` - Model identifier (e.g. `gpt-4o`).
    /// * `max_tokens` - Token budget per completion.
    pub fn new(api_url: String, api_key: String, model: String, max_tokens: u32) -> Self {
        OpenAiCodegen {
            api_url,
            api_key,
            model,
            max_tokens,
            http: Client::new(),
        }
    }
}

#[async_trait]
impl CodegenClient for OpenAiCodegen {
    async fn generate(&self, instruction: &str, current_source: &str) -> Result<String> {
        let user_message = format!(
            "User request:\n{}\n\nCurrent code:\n{}\n\n\
             Please provide ONLY the complete updated source file:",
            instruction, current_source
        );

        // Newer models (o-series, gpt-5.x, gpt-4.1) use max_completion_tokens
        let uses_completion_tokens = Regex::new(r"^(o[1-9]|gpt-5|gpt-4\.1)")
            .map(|re| re.is_match(&self.model))
            .unwrap_or(false);

        let mut body = serde_json::json!({
            "model": self.model,
            "messages": [
                { "role": "system", "content": SYSTEM_DIRECTIVE },
                { "role": "user", "content": user_message },
            ],
            "stream": false,
        });

        if uses_completion_tokens {
            body["max_completion_tokens"] = serde_json::json!(self.max_tokens);
        } else {
            body["max_tokens"] = serde_json::json!(self.max_tokens);
        }

        let url = format!("{}/v1/chat/completions", self.api_url);
        debug!(model = %self.model, url = %url, "sending rewrite request");

        let resp = self
            .http
            .post(&url)
            .header("Content-Type", "application/json")
            .header("Authorization", format!("Bearer {}", self.api_key))
            .json(&body)
            .send()
            .await
            .context("Codegen request failed")?;

        let status = resp.status();
        if !status.is_success() {
            let text = resp.text().await.unwrap_or_default();
            bail!("Codegen request failed with status {}: {}", status, text);
        }

        let parsed: Value = resp
            .json()
            .await
            .context("Failed to parse codegen response")?;

        let content = parsed["choices"][0]["message"]["content"]
            .as_str()
            .context("Codegen response contained no message content")?;

        Ok(sanitize_response(content))
    }
}

/// Strip code-fence lines and surrounding whitespace from a model response.
/// Handles fences with language tags (` ```rust `) by dropping the whole
/// fence line.
pub fn sanitize_response(raw: &str) -> String {
    let kept: Vec<&str> = raw
        .lines()
        .filter(|line| !line.trim_start().starts_with("```"))
        .collect();
    kept.join("\n").trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sanitize_strips_fences_with_language_tags() {
        let raw = "```rust\nfn main() {}\n```\n";
        assert_eq!(sanitize_response(raw), "fn main() {}");
    }

    #[test]
    fn sanitize_keeps_unfenced_content() {
        let raw = "  fn main() {}\n";
        assert_eq!(sanitize_response(raw), "fn main() {}");
    }

    #[test]
    fn sanitize_of_fence_only_response_is_empty() {
        assert_eq!(sanitize_response("```\n```"), "");
    }

    #[test]
    fn sanitize_preserves_interior_blank_lines() {
        let raw = "```\nline one\n\nline two\n```";
        assert_eq!(sanitize_response(raw), "line one\n\nline two");
    }
}
