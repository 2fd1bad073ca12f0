//! Store configuration.
//!
//! Locates the `SQLite` store file the reports read from.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use thiserror::Error;
use validator::Validate;

/// Environment variable holding the store path.
pub const DB_PATH_ENV: &str = "LOGLENS_DB_PATH";

/// Store path used when none is configured.
pub const DEFAULT_DB_PATH: &str = "./data/loglens.db";

/// Errors that can occur while loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Validation failed with details.
    #[error("Invalid store configuration: {0}")]
    ValidationError(#[from] validator::ValidationErrors),
}

/// Configuration of the report store.
///
/// # Example
///
/// ```
/// use shared::config::StoreConfig;
///
/// let config = StoreConfig::new("/var/lib/loglens/logs.db").unwrap();
/// assert_eq!(config.path().to_str(), Some("/var/lib/loglens/logs.db"));
///
/// assert!(StoreConfig::new("").is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
pub struct StoreConfig {
    /// Path to the store file.
    #[validate(length(min = 1, message = "Store path cannot be empty"))]
    pub db_path: String,
}

impl StoreConfig {
    /// Creates a validated configuration for the given path.
    ///
    /// # Errors
    ///
    /// Returns an error if the path is empty.
    pub fn new(db_path: impl Into<String>) -> Result<Self, ConfigError> {
        let config = Self {
            db_path: db_path.into(),
        };
        config.validate()?;
        Ok(config)
    }

    /// Loads the configuration from the environment.
    ///
    /// # Environment Variables
    ///
    /// - `LOGLENS_DB_PATH`: Store file path (default: `./data/loglens.db`)
    ///
    /// # Errors
    ///
    /// Returns an error if `LOGLENS_DB_PATH` is set to an empty string.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::new(std::env::var(DB_PATH_ENV).unwrap_or_else(|_| DEFAULT_DB_PATH.to_string()))
    }

    /// Returns the store path.
    #[must_use]
    pub fn path(&self) -> PathBuf {
        PathBuf::from(&self.db_path)
    }
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            db_path: DEFAULT_DB_PATH.to_string(),
        }
    }
}
