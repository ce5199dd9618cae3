//! Error types for settings persistence

use settingsgen_common::{ErrorSeverity, Severity};
use settingsgen_fields::FieldsError;
use thiserror::Error;

/// Result type for store operations
pub type Result<T> = std::result::Result<T, StoreError>;

/// Errors raised while reading, writing or submitting settings
#[derive(Debug, Error)]
pub enum StoreError {
    /// Page id cannot be used as a storage key
    #[error("invalid page id '{id}': only letters, digits, '_' and '-' are allowed")]
    InvalidPageId { id: String },

    /// The request lacks the capability the page requires
    #[error("missing capability '{capability}' for page '{page}'")]
    Unauthorized { page: String, capability: String },

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// YAML serialization error
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml_ng::Error),

    /// Schema or definition error
    #[error(transparent)]
    Fields(#[from] FieldsError),
}

impl Severity for StoreError {
    fn severity(&self) -> ErrorSeverity {
        match self {
            StoreError::InvalidPageId { .. } | StoreError::Unauthorized { .. } => {
                ErrorSeverity::Error
            }
            StoreError::Io(_) | StoreError::Yaml(_) => ErrorSeverity::Critical,
            StoreError::Fields(inner) => inner.severity(),
        }
    }
}
