//! Client configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Optional
//! - `CAFECRAFT_API_BASE_URL` - Base URL of the backend API
//!   (default: `http://localhost:8000/api`)
//! - `CAFECRAFT_STORAGE_DIR` - Directory for durable client state
//!   (default: `.cafecraft`)
//!
//! There is deliberately no per-request override surface: the whole client
//! talks to a single fixed base URL for the life of the process.

use std::path::PathBuf;

use thiserror::Error;
use url::Url;

/// Default backend API base URL for local development.
const DEFAULT_API_BASE_URL: &str = "http://localhost:8000/api";

/// Default directory for durable client state (cart, credentials).
const DEFAULT_STORAGE_DIR: &str = ".cafecraft";

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Client application configuration.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Base URL for the backend API, without a trailing slash.
    pub api_base_url: String,
    /// Directory holding the durable key-value files.
    pub storage_dir: PathBuf,
}

impl ClientConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if `CAFECRAFT_API_BASE_URL` is set but is not a
    /// valid `http`/`https` URL.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let api_base_url = get_env_or_default("CAFECRAFT_API_BASE_URL", DEFAULT_API_BASE_URL);
        let api_base_url = validate_base_url("CAFECRAFT_API_BASE_URL", &api_base_url)?;

        let storage_dir =
            PathBuf::from(get_env_or_default("CAFECRAFT_STORAGE_DIR", DEFAULT_STORAGE_DIR));

        Ok(Self {
            api_base_url,
            storage_dir,
        })
    }

    /// Configuration pointing at an explicit base URL, with durable state in
    /// the default directory. Used by embedding shells that manage their own
    /// environment.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if `base_url` is not a valid `http`/`https` URL.
    pub fn with_base_url(base_url: &str) -> Result<Self, ConfigError> {
        Ok(Self {
            api_base_url: validate_base_url("base_url", base_url)?,
            storage_dir: PathBuf::from(DEFAULT_STORAGE_DIR),
        })
    }
}

/// Get an environment variable with a default value.
fn get_env_or_default(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

/// Validate a base URL and normalize it (no trailing slash).
fn validate_base_url(name: &str, value: &str) -> Result<String, ConfigError> {
    let url = Url::parse(value)
        .map_err(|e| ConfigError::InvalidEnvVar(name.to_string(), e.to_string()))?;

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(ConfigError::InvalidEnvVar(
            name.to_string(),
            format!("unsupported scheme '{}'", url.scheme()),
        ));
    }

    Ok(value.trim_end_matches('/').to_string())
}
