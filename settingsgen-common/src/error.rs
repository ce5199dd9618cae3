//! Severity classification for settingsgen errors
//!
//! Each crate owns its own `thiserror` enum. This module only supplies the
//! shared vocabulary used to decide how loudly an error is reported.

/// Severity levels for error classification
///
/// - **Warning**: the operation completed with a degraded result
/// - **Error**: the operation failed but the process can continue
/// - **Critical**: persisted state may be unusable
///
/// # Examples
///
/// ```rust
/// use settingsgen_common::ErrorSeverity;
///
/// let unreadable_record = ErrorSeverity::Critical;
/// assert!(unreadable_record > ErrorSeverity::Error);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    /// Potential issue but operation can proceed
    Warning,

    /// Operation failed but system can continue
    Error,

    /// System cannot continue, requires immediate attention
    Critical,
}

impl ErrorSeverity {
    /// The matching `tracing` level for this severity.
    pub fn level(self) -> tracing::Level {
        match self {
            ErrorSeverity::Warning => tracing::Level::WARN,
            ErrorSeverity::Error | ErrorSeverity::Critical => tracing::Level::ERROR,
        }
    }
}

impl std::fmt::Display for ErrorSeverity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ErrorSeverity::Warning => write!(f, "warning"),
            ErrorSeverity::Error => write!(f, "error"),
            ErrorSeverity::Critical => write!(f, "critical"),
        }
    }
}

/// Trait for error types that have severity levels
///
/// ```rust
/// use settingsgen_common::{ErrorSeverity, Severity};
///
/// #[derive(Debug)]
/// enum StoreProblem {
///     Corrupted,
///     Missing,
/// }
///
/// impl Severity for StoreProblem {
///     fn severity(&self) -> ErrorSeverity {
///         match self {
///             StoreProblem::Corrupted => ErrorSeverity::Critical,
///             StoreProblem::Missing => ErrorSeverity::Warning,
///         }
///     }
/// }
///
/// assert_eq!(StoreProblem::Corrupted.severity(), ErrorSeverity::Critical);
/// ```
pub trait Severity {
    /// Get the severity level of this error
    fn severity(&self) -> ErrorSeverity;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_severity_ordering() {
        assert!(ErrorSeverity::Warning < ErrorSeverity::Error);
        assert!(ErrorSeverity::Error < ErrorSeverity::Critical);
    }

    #[test]
    fn test_severity_display() {
        assert_eq!(ErrorSeverity::Warning.to_string(), "warning");
        assert_eq!(ErrorSeverity::Critical.to_string(), "critical");
    }

    #[test]
    fn test_severity_level() {
        assert_eq!(ErrorSeverity::Warning.level(), tracing::Level::WARN);
        assert_eq!(ErrorSeverity::Critical.level(), tracing::Level::ERROR);
    }
}
