use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};
use url::Url;

use crate::config::ModelSettings;
use crate::llm::client::{LlmProvider, ModelError, ModelResponse};
use crate::prompt::Prompt;

const MAX_RETRY_DELAY: Duration = Duration::from_secs(5);

pub struct OllamaClient {
    http: Client,
    endpoint: String,
    model: String,
    timeout: Duration,
    max_retries: u32,
    retry_backoff: Duration,
    temperature: f32,
}

/// Outcome of a single failed request.
enum AttemptError {
    /// Connection failure or timeout; worth another attempt
    Transient { timed_out: bool, reason: String },
    /// The endpoint answered, just not usefully
    Fatal(String),
}

impl OllamaClient {
    pub fn from_settings(settings: &ModelSettings) -> Result<Self> {
        let model = settings.name.trim().to_string();
        if model.is_empty() {
            anyhow::bail!("Model name is missing. Set model.name in config or BRIEFLY_MODEL_NAME.");
        }

        let endpoint = settings.endpoint.trim().trim_end_matches('/').to_string();
        let url = Url::parse(&endpoint)
            .with_context(|| format!("Invalid model endpoint '{}'", endpoint))?;
        if !matches!(url.scheme(), "http" | "https") {
            anyhow::bail!(
                "Invalid model endpoint '{}': expected an http:// or https:// URL",
                endpoint
            );
        }

        Ok(Self {
            http: Client::builder()
                .timeout(settings.timeout())
                .build()
                .context("Failed to build model HTTP client")?,
            endpoint,
            model,
            timeout: settings.timeout(),
            max_retries: settings.max_retries,
            retry_backoff: settings.retry_backoff(),
            temperature: settings.temperature,
        })
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    fn generate_url(&self) -> String {
        format!("{}/api/generate", self.endpoint)
    }

    fn tags_url(&self) -> String {
        format!("{}/api/tags", self.endpoint)
    }

    /// Names of the models installed on the endpoint.
    pub async fn installed_models(&self) -> Result<Vec<String>> {
        let tags: TagsResponse = self
            .http
            .get(self.tags_url())
            .send()
            .await
            .context("Model endpoint request failed")?
            .error_for_status()
            .context("Model endpoint returned an error status")?
            .json()
            .await
            .context("Failed to parse model list")?;

        Ok(tags.models.into_iter().map(|m| m.name).collect())
    }

    /// Whether `installed` lists the configured model (`llama3` matches `llama3:latest`).
    pub fn is_installed(&self, installed: &[String]) -> bool {
        installed
            .iter()
            .any(|name| name == &self.model || *name == format!("{}:latest", self.model))
    }

    /// Delay before retry number `retry` (0-based), doubling up to a cap.
    fn retry_delay(&self, retry: u32) -> Duration {
        let delay = self.retry_backoff.as_secs_f64() * 2_f64.powi(retry.min(16) as i32);
        Duration::from_secs_f64(delay.min(MAX_RETRY_DELAY.as_secs_f64()))
    }

    async fn attempt(&self, body: &GenerateRequest<'_>) -> std::result::Result<String, AttemptError> {
        let response = self
            .http
            .post(self.generate_url())
            .json(body)
            .send()
            .await
            .map_err(classify)?;

        let status = response.status();
        if !status.is_success() {
            let detail = response.text().await.unwrap_or_default();
            let detail = serde_json::from_str::<ErrorResponse>(&detail)
                .map(|e| e.error)
                .unwrap_or(detail);
            return Err(AttemptError::Fatal(format!(
                "endpoint returned {}: {}",
                status,
                detail.trim()
            )));
        }

        let payload: GenerateResponse = response.json().await.map_err(|e| {
            if e.is_timeout() {
                classify(e)
            } else {
                AttemptError::Fatal(format!("invalid response body: {}", e))
            }
        })?;

        Ok(payload.response)
    }
}

fn classify(err: reqwest::Error) -> AttemptError {
    if err.is_timeout() {
        AttemptError::Transient {
            timed_out: true,
            reason: err.to_string(),
        }
    } else if err.is_connect() || err.is_request() {
        AttemptError::Transient {
            timed_out: false,
            reason: err.to_string(),
        }
    } else {
        AttemptError::Fatal(err.to_string())
    }
}

#[async_trait]
impl LlmProvider for OllamaClient {
    async fn complete(&self, prompt: &Prompt) -> std::result::Result<ModelResponse, ModelError> {
        let body = GenerateRequest {
            model: &self.model,
            prompt: &prompt.text,
            stream: false,
            options: GenerateOptions {
                temperature: self.temperature,
            },
        };

        let max_attempts = self.max_retries.saturating_add(1);
        let mut attempts = 0;

        loop {
            attempts += 1;
            let started = Instant::now();
            tracing::debug!(
                "POST {} (attempt {}/{})",
                self.generate_url(),
                attempts,
                max_attempts
            );

            match self.attempt(&body).await {
                Ok(text) => {
                    tracing::info!(
                        "Model {} replied with {} chars in {:.1}s",
                        self.model,
                        text.chars().count(),
                        started.elapsed().as_secs_f32()
                    );
                    return Ok(ModelResponse {
                        text,
                        model: self.model.clone(),
                    });
                }
                Err(AttemptError::Transient { reason, .. }) if attempts < max_attempts => {
                    let delay = self.retry_delay(attempts - 1);
                    tracing::warn!(
                        "Model request failed ({}), retrying in {} ms",
                        reason,
                        delay.as_millis()
                    );
                    tokio::time::sleep(delay).await;
                }
                Err(AttemptError::Transient {
                    timed_out: true, ..
                }) => {
                    return Err(ModelError::ModelTimeout {
                        attempts,
                        timeout_ms: self.timeout.as_millis() as u64,
                    });
                }
                Err(AttemptError::Transient { reason, .. }) | Err(AttemptError::Fatal(reason)) => {
                    return Err(ModelError::ModelUnavailable { attempts, reason });
                }
            }
        }
    }
}

#[derive(Debug, Serialize)]
struct GenerateRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    stream: bool,
    options: GenerateOptions,
}

#[derive(Debug, Serialize)]
struct GenerateOptions {
    temperature: f32,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    response: String,
}

#[derive(Debug, Deserialize)]
struct ErrorResponse {
    error: String,
}

#[derive(Debug, Deserialize)]
struct TagsResponse {
    #[serde(default)]
    models: Vec<TagsModel>,
}

#[derive(Debug, Deserialize)]
struct TagsModel {
    name: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client(backoff_ms: u64) -> OllamaClient {
        OllamaClient::from_settings(&ModelSettings {
            retry_backoff_ms: backoff_ms,
            ..ModelSettings::default()
        })
        .unwrap()
    }

    #[test]
    fn retry_delay_doubles_and_caps() {
        let client = client(250);
        assert_eq!(client.retry_delay(0), Duration::from_millis(250));
        assert_eq!(client.retry_delay(1), Duration::from_millis(500));
        assert_eq!(client.retry_delay(2), Duration::from_millis(1000));
        assert_eq!(client.retry_delay(10), MAX_RETRY_DELAY);
    }

    #[test]
    fn endpoint_trailing_slash_is_trimmed() {
        let client = OllamaClient::from_settings(&ModelSettings {
            endpoint: "http://127.0.0.1:11434/".to_string(),
            ..ModelSettings::default()
        })
        .unwrap();
        assert_eq!(client.generate_url(), "http://127.0.0.1:11434/api/generate");
    }

    #[test]
    fn installed_model_matches_latest_tag() {
        let client = client(0);
        assert!(client.is_installed(&["llama3:latest".to_string()]));
        assert!(client.is_installed(&["llama3".to_string()]));
        assert!(!client.is_installed(&["llama3.1:8b".to_string()]));
    }
}
