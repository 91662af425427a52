//! Master configuration.

use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Tunables for the coordination core, usually the `[master]` table of the
/// server's TOML file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MasterConfig {
    /// Warn when more remote transactions than this are open at once.
    /// Replicas that crash without rolling back leave their entries behind.
    pub open_transaction_warn_threshold: usize,
    /// Log every granted lock batch at debug level.
    pub log_lock_batches: bool,
}

impl Default for MasterConfig {
    fn default() -> Self {
        Self {
            open_transaction_warn_threshold: 1024,
            log_lock_batches: false,
        }
    }
}

impl MasterConfig {
    /// Parse a configuration; missing fields take their defaults.
    pub fn from_toml_str(source: &str) -> ConfigResult<Self> {
        Ok(toml::from_str(source)?)
    }

    pub fn load(path: impl AsRef<Path>) -> ConfigResult<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.display().to_string(),
            source,
        })?;
        let config = Self::from_toml_str(&content)?;
        tracing::info!(path = %path.display(), "loaded master config");
        Ok(config)
    }

    pub fn to_toml_string(&self) -> ConfigResult<String> {
        Ok(toml::to_string_pretty(self)?)
    }
}

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("failed to serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),
}

/// Result type for configuration loading.
pub type ConfigResult<T> = Result<T, ConfigError>;
