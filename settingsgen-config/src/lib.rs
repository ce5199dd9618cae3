//! Runtime configuration for settingsgen using Figment
//!
//! Configuration is small: which store backend holds settings records, where
//! file records live, and the default log filter.
//!
//! ```toml
//! [store]
//! backend = "file"        # or "memory"
//! directory = ".settingsgen"
//!
//! [log]
//! filter = "warn"
//! ```
//!
//! Any key can be overridden from the environment, e.g.
//! `SETTINGSGEN_STORE__BACKEND=memory`.

pub mod error;
pub mod provider;
pub mod types;

pub use error::{ConfigError, Result};
pub use provider::{load_configuration, ConfigProvider, CONFIG_FILE_STEM, ENV_PREFIX};
pub use types::{LogConfig, SettingsgenConfig, StoreBackend, StoreConfig};
