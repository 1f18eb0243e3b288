//! Code Generation Module
//!
//! Remote rewrite of the tracked source through an OpenAI-compatible
//! chat-completions endpoint, plus response sanitization.

pub mod client;

pub use client::{sanitize_response, OpenAiCodegen};
