use anyhow::Result;
use async_trait::async_trait;
use thiserror::Error;

use crate::config::ModelSettings;
use crate::llm::ollama::OllamaClient;
use crate::prompt::Prompt;

/// Raw text returned by the model endpoint
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelResponse {
    pub text: String,
    /// Model that produced the text
    pub model: String,
}

/// Infrastructure failures of the summarization call.
///
/// These are the only conditions that abort a pipeline run.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ModelError {
    #[error("Model endpoint timed out after {attempts} attempt(s) of {timeout_ms} ms")]
    ModelTimeout { attempts: u32, timeout_ms: u64 },

    #[error("Model endpoint unavailable after {attempts} attempt(s): {reason}")]
    ModelUnavailable { attempts: u32, reason: String },
}

#[async_trait]
pub trait LlmProvider: Send + Sync {
    /// Send one prompt and return the model's reply.
    async fn complete(&self, prompt: &Prompt) -> std::result::Result<ModelResponse, ModelError>;
}

/// Build an LLM provider from model settings.
pub fn build_provider(settings: &ModelSettings) -> Result<Box<dyn LlmProvider>> {
    match settings.provider.to_lowercase().as_str() {
        "ollama" => Ok(Box::new(OllamaClient::from_settings(settings)?)),
        other => anyhow::bail!(
            "Unsupported model.provider '{}'. Supported providers: ollama",
            other
        ),
    }
}
