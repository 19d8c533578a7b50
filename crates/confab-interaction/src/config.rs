//! Gemini credential and model configuration.
//!
//! Resolution order: the `GEMINI_API_KEY` environment variable, then
//! `~/.confab/secret.json`:
//!
//! ```json
//! { "gemini": { "api_key": "...", "model": "gemini-1.5-flash-latest" } }
//! ```

use confab_core::error::{ChatError, Result};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

/// Environment variable holding the API key, overriding secret.json.
pub const API_KEY_ENV: &str = "GEMINI_API_KEY";

/// Default model used when none is configured.
pub const DEFAULT_GEMINI_MODEL: &str = "gemini-1.5-flash-latest";

#[derive(Debug, Deserialize)]
struct SecretFile {
    gemini: Option<GeminiSecret>,
}

#[derive(Debug, Deserialize)]
struct GeminiSecret {
    api_key: String,
    model: Option<String>,
}

/// Resolved Gemini configuration.
#[derive(Debug, Clone)]
pub struct GeminiConfig {
    pub api_key: String,
    pub model: String,
}

impl GeminiConfig {
    /// Loads configuration from the environment, falling back to the
    /// default secret file location (~/.confab/secret.json).
    pub fn from_env() -> Result<Self> {
        if let Ok(api_key) = std::env::var(API_KEY_ENV) {
            if !api_key.trim().is_empty() {
                return Ok(Self {
                    api_key,
                    model: DEFAULT_GEMINI_MODEL.to_string(),
                });
            }
        }
        Self::from_secret_file(default_secret_path()?)
    }

    /// Loads configuration from a secret.json file.
    pub fn from_secret_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| {
            ChatError::remote(format!(
                "No API key configured: set {API_KEY_ENV} or create {:?} ({})",
                path, e
            ))
        })?;

        let secret: SecretFile = serde_json::from_str(&content)
            .map_err(|e| ChatError::remote(format!("Failed to parse {:?}: {}", path, e)))?;

        let gemini = secret.gemini.ok_or_else(|| {
            ChatError::remote(format!("Gemini configuration not found in {:?}", path))
        })?;

        Ok(Self {
            api_key: gemini.api_key,
            model: gemini
                .model
                .unwrap_or_else(|| DEFAULT_GEMINI_MODEL.to_string()),
        })
    }
}

fn default_secret_path() -> Result<PathBuf> {
    let home_dir = dirs::home_dir()
        .ok_or_else(|| ChatError::persistence("Failed to get home directory"))?;
    Ok(home_dir.join(".confab").join("secret.json"))
}
