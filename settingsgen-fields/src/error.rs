//! Error types for schema construction and page definitions
//!
//! Sanitizing and rendering never fail; only building a schema and loading a
//! page definition can.

use settingsgen_common::{ErrorSeverity, Severity};
use thiserror::Error;

/// Result type for fields operations
pub type Result<T> = std::result::Result<T, FieldsError>;

/// Errors that can occur while assembling a settings schema
#[derive(Debug, Error)]
pub enum FieldsError {
    /// Two fields share an id within one schema
    #[error("duplicate field id: {id}")]
    DuplicateField { id: String },

    /// Two tabs share an id within one schema
    #[error("duplicate tab id: {id}")]
    DuplicateTab { id: String },

    /// An explicit default tab names a tab that was never declared
    #[error("default tab '{id}' is not a declared tab")]
    UnknownTab { id: String },

    /// Field not found by id
    #[error("field not found: {id}")]
    FieldNotFound { id: String },

    /// A page definition is structurally invalid
    #[error("invalid page definition: {message}")]
    InvalidDefinition { message: String },

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// YAML serialization error
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml_ng::Error),
}

impl Severity for FieldsError {
    fn severity(&self) -> ErrorSeverity {
        match self {
            FieldsError::FieldNotFound { .. } => ErrorSeverity::Warning,
            FieldsError::DuplicateField { .. }
            | FieldsError::DuplicateTab { .. }
            | FieldsError::UnknownTab { .. }
            | FieldsError::InvalidDefinition { .. }
            | FieldsError::Io(_)
            | FieldsError::Yaml(_) => ErrorSeverity::Error,
        }
    }
}
