//! LLM module for briefly
//!
//! Sends prompts to a locally served model (Ollama API).

mod client;
mod ollama;

pub use client::{build_provider, LlmProvider, ModelError, ModelResponse};
pub use ollama::OllamaClient;
