//! Error types for settingsgen configuration

use std::path::PathBuf;

use settingsgen_common::{ErrorSeverity, Severity};
use thiserror::Error;

/// Result type for configuration loading
pub type Result<T> = std::result::Result<T, ConfigError>;

/// Configuration-related errors
#[derive(Error, Debug)]
pub enum ConfigError {
    /// An explicitly requested configuration file does not exist
    #[error("Configuration file not found: {path}")]
    FileNotFound { path: PathBuf },

    /// Configuration file format not supported
    #[error("Unsupported configuration file format: {path}")]
    UnsupportedFormat { path: PathBuf },

    /// Merging or extracting the configuration failed
    #[error("Failed to parse configuration: {source}")]
    ParseError {
        #[source]
        source: Box<figment::Error>,
    },
}

impl From<figment::Error> for ConfigError {
    fn from(error: figment::Error) -> Self {
        ConfigError::ParseError {
            source: Box::new(error),
        }
    }
}

impl Severity for ConfigError {
    fn severity(&self) -> ErrorSeverity {
        match self {
            ConfigError::FileNotFound { .. } | ConfigError::UnsupportedFormat { .. } => {
                ErrorSeverity::Error
            }
            ConfigError::ParseError { .. } => ErrorSeverity::Critical,
        }
    }
}
