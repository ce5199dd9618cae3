//! Configuration provider using Figment

use std::path::{Path, PathBuf};

use figment::{
    providers::{Env, Format, Json, Serialized, Toml, Yaml},
    Figment,
};
use tracing::{debug, trace};

use crate::error::{ConfigError, Result};
use crate::types::SettingsgenConfig;

/// Base name of configuration files discovered in the working directory.
pub const CONFIG_FILE_STEM: &str = "settingsgen";

/// Prefix of environment variables; `__` separates nested keys.
pub const ENV_PREFIX: &str = "SETTINGSGEN_";

/// Loads [`SettingsgenConfig`] from defaults, files and the environment.
///
/// Sources are merged in precedence order, later overriding earlier:
/// 1. Built-in defaults
/// 2. `settingsgen.{toml,yaml,yml,json}` in the working directory, or the
///    explicit file when one is given
/// 3. `SETTINGSGEN_*` environment variables
#[derive(Debug, Clone)]
pub struct ConfigProvider {
    working_dir: PathBuf,
    explicit_file: Option<PathBuf>,
}

impl ConfigProvider {
    pub fn new(working_dir: impl Into<PathBuf>) -> Self {
        Self {
            working_dir: working_dir.into(),
            explicit_file: None,
        }
    }

    /// Use `path` instead of discovering files in the working directory.
    pub fn with_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.explicit_file = Some(path.into());
        self
    }

    pub fn load(&self) -> Result<SettingsgenConfig> {
        let config: SettingsgenConfig = self.build_figment()?.extract()?;
        debug!(
            backend = ?config.store.backend,
            directory = %config.store.directory.display(),
            filter = %config.log.filter,
            "loaded configuration"
        );
        Ok(config)
    }

    fn build_figment(&self) -> Result<Figment> {
        let mut figment = Figment::from(Serialized::defaults(SettingsgenConfig::default()));

        match &self.explicit_file {
            Some(path) => {
                if !path.exists() {
                    return Err(ConfigError::FileNotFound { path: path.clone() });
                }
                figment = figment.merge(file_provider(path)?);
            }
            None => {
                for path in self.discover() {
                    trace!(path = %path.display(), "merging configuration file");
                    figment = figment.merge(file_provider(&path)?);
                }
            }
        }

        Ok(figment.merge(Env::prefixed(ENV_PREFIX).split("__")))
    }

    /// Configuration files present in the working directory, lowest
    /// precedence first.
    pub fn discover(&self) -> Vec<PathBuf> {
        ["toml", "yaml", "yml", "json"]
            .iter()
            .map(|ext| self.working_dir.join(format!("{CONFIG_FILE_STEM}.{ext}")))
            .filter(|path| path.is_file())
            .collect()
    }
}

impl Default for ConfigProvider {
    fn default() -> Self {
        Self::new(".")
    }
}

fn file_provider(path: &Path) -> Result<Figment> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase);
    match ext.as_deref() {
        Some("toml") => Ok(Figment::from(Toml::file(path))),
        Some("yaml") | Some("yml") => Ok(Figment::from(Yaml::file(path))),
        Some("json") => Ok(Figment::from(Json::file(path))),
        _ => Err(ConfigError::UnsupportedFormat {
            path: path.to_path_buf(),
        }),
    }
}

/// Load configuration for the current directory, optionally from an explicit file.
pub fn load_configuration(explicit_file: Option<&Path>) -> Result<SettingsgenConfig> {
    let provider = ConfigProvider::default();
    match explicit_file {
        Some(path) => provider.with_file(path).load(),
        None => provider.load(),
    }
}
