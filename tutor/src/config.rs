//! Tutor configuration types and loading

use eyre::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Main tutor configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Generative model configuration
    pub genai: GenAiConfig,

    /// Storage configuration
    pub storage: StorageConfig,
}

impl Config {
    /// Validate configuration before use
    ///
    /// Checks that the API key environment variable is set. Call this early
    /// in startup to fail fast with a clear error message.
    pub fn validate(&self) -> Result<()> {
        if std::env::var(&self.genai.api_key_env).is_err() {
            return Err(eyre::eyre!(
                "API key not found. Set the {} environment variable.",
                self.genai.api_key_env
            ));
        }
        Ok(())
    }

    /// Load configuration with fallback chain
    pub fn load(config_path: Option<&PathBuf>) -> Result<Self> {
        // If explicit config path provided, try to load it
        if let Some(path) = config_path {
            return Self::load_from_file(path).context(format!("Failed to load config from {}", path.display()));
        }

        // Try project-local config: .tutor.yml
        let local_config = PathBuf::from(".tutor.yml");
        if local_config.exists() {
            match Self::load_from_file(&local_config) {
                Ok(config) => return Ok(config),
                Err(e) => {
                    tracing::warn!("Failed to load config from {}: {}", local_config.display(), e);
                }
            }
        }

        // Try user config: ~/.config/tutor/tutor.yml
        if let Some(config_dir) = dirs::config_dir() {
            let user_config = config_dir.join("tutor").join("tutor.yml");
            if user_config.exists() {
                match Self::load_from_file(&user_config) {
                    Ok(config) => return Ok(config),
                    Err(e) => {
                        tracing::warn!("Failed to load config from {}: {}", user_config.display(), e);
                    }
                }
            }
        }

        // No config file found, use defaults
        tracing::info!("No config file found, using defaults");
        Ok(Self::default())
    }

    fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(&path).context("Failed to read config file")?;

        let config: Self = serde_yaml::from_str(&content).context("Failed to parse config file")?;

        tracing::info!("Loaded config from: {}", path.as_ref().display());
        Ok(config)
    }
}

/// Generative model configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GenAiConfig {
    /// Model for answer requests
    pub model: String,

    /// Model for diagram image requests
    #[serde(rename = "image-model")]
    pub image_model: String,

    /// Environment variable containing the API key
    #[serde(rename = "api-key-env")]
    pub api_key_env: String,

    /// API base URL
    #[serde(rename = "base-url")]
    pub base_url: String,

    /// Maximum tokens per response
    #[serde(rename = "max-output-tokens")]
    pub max_output_tokens: u32,

    /// Request timeout in milliseconds
    #[serde(rename = "timeout-ms")]
    pub timeout_ms: u64,
}

impl Default for GenAiConfig {
    fn default() -> Self {
        Self {
            model: "gemini-2.5-flash".to_string(),
            image_model: "gemini-2.5-flash-image".to_string(),
            api_key_env: "GEMINI_API_KEY".to_string(),
            base_url: "https://generativelanguage.googleapis.com/v1beta".to_string(),
            max_output_tokens: 8192,
            timeout_ms: 120_000,
        }
    }
}

/// Storage configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Directory for per-document history files
    #[serde(rename = "history-dir")]
    pub history_dir: PathBuf,
}

impl Default for StorageConfig {
    fn default() -> Self {
        // Use XDG data directory (~/.local/share/tutor/history on Linux)
        let history_dir = dirs::data_dir()
            .map(|d| d.join("tutor").join("history"))
            .unwrap_or_else(|| PathBuf::from(".tutor-history"));

        Self { history_dir }
    }
}
