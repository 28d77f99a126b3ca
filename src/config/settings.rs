//! Application settings management

use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Main application settings
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Settings {
    /// Model endpoint settings
    #[serde(default)]
    pub model: ModelSettings,

    /// Prompt construction settings
    #[serde(default)]
    pub prompt: PromptSettings,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelSettings {
    /// Model serving backend (ollama)
    #[serde(default = "default_provider")]
    pub provider: String,

    /// Base URL of the model endpoint
    #[serde(default = "default_endpoint")]
    pub endpoint: String,

    /// Model name passed to the endpoint
    #[serde(default = "default_model_name")]
    pub name: String,

    /// Per-attempt request timeout in milliseconds
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,

    /// Retries on connection failure or timeout (0 = single attempt)
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,

    /// Base delay between retries, doubled on each attempt
    #[serde(default = "default_retry_backoff_ms")]
    pub retry_backoff_ms: u64,

    /// Sampling temperature (0 keeps output structured and repeatable)
    #[serde(default)]
    pub temperature: f32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PromptSettings {
    /// Prompt template version (v1, json-v1)
    #[serde(default = "default_template_version")]
    pub template_version: String,

    /// Transcript characters embedded before truncation
    #[serde(default = "default_max_input_chars")]
    pub max_input_chars: usize,
}

// Default value functions

fn default_provider() -> String {
    "ollama".to_string()
}

fn default_endpoint() -> String {
    "http://localhost:11434".to_string()
}

fn default_model_name() -> String {
    "llama3".to_string()
}

fn default_timeout_ms() -> u64 {
    60_000
}

fn default_max_retries() -> u32 {
    2
}

fn default_retry_backoff_ms() -> u64 {
    250
}

fn default_template_version() -> String {
    "v1".to_string()
}

fn default_max_input_chars() -> usize {
    24_000
}

impl Default for ModelSettings {
    fn default() -> Self {
        Self {
            provider: default_provider(),
            endpoint: default_endpoint(),
            name: default_model_name(),
            timeout_ms: default_timeout_ms(),
            max_retries: default_max_retries(),
            retry_backoff_ms: default_retry_backoff_ms(),
            temperature: 0.0,
        }
    }
}

impl ModelSettings {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    pub fn retry_backoff(&self) -> Duration {
        Duration::from_millis(self.retry_backoff_ms)
    }
}

impl Default for PromptSettings {
    fn default() -> Self {
        Self {
            template_version: default_template_version(),
            max_input_chars: default_max_input_chars(),
        }
    }
}

impl Settings {
    /// Load settings from the default configuration file
    pub fn load() -> Result<Self> {
        let config_path = Self::config_path()?;
        Self::load_from(&config_path)
    }

    /// Load settings from a specific file, falling back to defaults if it is missing
    pub fn load_from(config_path: &Path) -> Result<Self> {
        if !config_path.exists() {
            tracing::info!("No config file found, using defaults");
            let mut settings = Self::default();
            settings.apply_env_overrides();
            return Ok(settings);
        }

        let content = std::fs::read_to_string(config_path)
            .with_context(|| format!("Failed to read config file: {}", config_path.display()))?;

        let mut settings: Settings = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", config_path.display()))?;

        settings.apply_env_overrides();

        Ok(settings)
    }

    /// Load settings from a file the user named explicitly; it must exist
    pub fn load_explicit(config_path: &Path) -> Result<Self> {
        if !config_path.is_file() {
            anyhow::bail!(
                "Config file not found: {}. Run `briefly --config {} config init` to create it.",
                config_path.display(),
                config_path.display()
            );
        }
        Self::load_from(config_path)
    }

    /// Apply environment variable overrides.
    fn apply_env_overrides(&mut self) {
        if let Ok(endpoint) = std::env::var("BRIEFLY_MODEL_ENDPOINT") {
            if !endpoint.trim().is_empty() {
                self.model.endpoint = endpoint.trim().to_string();
            }
        }
        if let Ok(name) = std::env::var("BRIEFLY_MODEL_NAME") {
            if !name.trim().is_empty() {
                self.model.name = name.trim().to_string();
            }
        }
    }

    /// Get the path to the configuration file
    pub fn config_path() -> Result<PathBuf> {
        let dirs = ProjectDirs::from("com", crate::APP_NAME, crate::APP_NAME)
            .context("Could not determine config directory")?;

        let config_dir = dirs.config_dir();
        Ok(config_dir.join("config.toml"))
    }

    /// Write default configuration to a file
    pub fn write_default(path: &Path) -> Result<()> {
        let settings = Self::default();
        let content = toml::to_string_pretty(&settings)?;

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        std::fs::write(path, content)?;
        Ok(())
    }
}
