//! # Settingsgen Common
//!
//! Foundational pieces shared by every settingsgen crate:
//!
//! - [`error`] - severity classification implemented by each crate's error enum
//! - [`logging`] - the [`Pretty`] log formatter and tracing subscriber setup

pub mod error;
pub mod logging;

pub use error::{ErrorSeverity, Severity};
pub use logging::{init_tracing, Pretty};
