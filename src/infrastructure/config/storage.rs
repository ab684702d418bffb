//! Config file location and persistence.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use directories::ProjectDirs;
use thiserror::Error;
use tracing::{debug, info, warn};

use super::app_config::{APP_NAME, APP_ORGANIZATION, APP_QUALIFIER, AppConfig};

const CONFIG_FILE_NAME: &str = "config.toml";

/// Errors reading, writing or interpreting the configuration.
#[derive(Debug, Error)]
#[allow(missing_docs)]
pub enum ConfigError {
    #[error("failed to determine config directory")]
    ConfigDirNotFound,

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("toml serialization error: {0}")]
    TomlSer(#[from] toml::ser::Error),

    #[error("toml deserialization error: {0}")]
    TomlDe(#[from] toml::de::Error),

    #[error("missing configuration value '{key}'")]
    Missing { key: &'static str },

    #[error("invalid configuration value '{key}': {message}")]
    Invalid { key: &'static str, message: String },
}

/// Reads and writes `config.toml`, by default in the platform config
/// directory.
pub struct StorageManager {
    config_dir: PathBuf,
}

impl StorageManager {
    /// Uses the platform config directory for `rollcall`.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::ConfigDirNotFound` if the platform has no home
    /// directory.
    pub fn new() -> Result<Self, ConfigError> {
        ProjectDirs::from(APP_QUALIFIER, APP_ORGANIZATION, APP_NAME)
            .map(|dirs| Self::with_dir(dirs.config_dir().to_path_buf()))
            .ok_or(ConfigError::ConfigDirNotFound)
    }

    /// Uses the given directory instead of the platform one.
    #[must_use]
    pub const fn with_dir(config_dir: PathBuf) -> Self {
        Self { config_dir }
    }

    /// Directory holding the default config file.
    #[must_use]
    pub fn config_dir(&self) -> &Path {
        &self.config_dir
    }

    /// Creates the config directory if needed.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if the directory cannot be created.
    pub fn ensure_config_dir(&self) -> Result<(), ConfigError> {
        if !self.config_dir.exists() {
            info!(path = %self.config_dir.display(), "Creating configuration directory");
            fs::create_dir_all(&self.config_dir)?;
        }
        Ok(())
    }

    fn resolve(&self, path_override: Option<&Path>) -> PathBuf {
        path_override.map_or_else(|| self.config_dir.join(CONFIG_FILE_NAME), Path::to_path_buf)
    }

    /// Loads the configuration.
    ///
    /// A missing file is created with defaults. A malformed file is left
    /// untouched and defaults are used.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if the file cannot be read or the default written.
    pub fn load_config(&self, path_override: Option<&Path>) -> Result<AppConfig, ConfigError> {
        let path = self.resolve(path_override);

        if !path.exists() {
            info!(path = %path.display(), "Config file not found, writing defaults");
            let config = AppConfig::default();
            write_atomic(&path, &config)?;
            return Ok(config);
        }

        let content = fs::read_to_string(&path)?;
        Ok(toml::from_str(&content).unwrap_or_else(|e| {
            warn!(path = %path.display(), error = %e, "Malformed config file, using defaults");
            AppConfig::default()
        }))
    }

    /// Writes the configuration, to the default file unless a path is given.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if the file cannot be written.
    pub fn save_config(
        &self,
        config: &AppConfig,
        path_override: Option<&Path>,
    ) -> Result<(), ConfigError> {
        let path = self.resolve(path_override);
        write_atomic(&path, config)?;
        debug!(path = %path.display(), "Config saved");
        Ok(())
    }

    /// Loads the stored configuration, applies `change` and writes it back.
    ///
    /// Only what is in the file is touched; flags and environment overrides
    /// of the running process are not persisted. Unlike [`Self::load_config`]
    /// a malformed file is an error and is not overwritten.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::TomlDe` if the file does not parse, or another
    /// `ConfigError` if it cannot be read or written.
    pub fn update_config(
        &self,
        path_override: Option<&Path>,
        change: impl FnOnce(&mut AppConfig),
    ) -> Result<AppConfig, ConfigError> {
        let path = self.resolve(path_override);
        let mut config = if path.exists() {
            toml::from_str(&fs::read_to_string(&path)?)?
        } else {
            AppConfig::default()
        };
        change(&mut config);
        self.save_config(&config, path_override)?;
        Ok(config)
    }
}

fn write_atomic(path: &Path, config: &AppConfig) -> Result<(), ConfigError> {
    let content = toml::to_string_pretty(config)?;

    let parent = path
        .parent()
        .ok_or_else(|| std::io::Error::other("config path has no parent directory"))?;
    fs::create_dir_all(parent)?;

    let mut temp_file = tempfile::NamedTempFile::new_in(parent)?;
    temp_file.write_all(content.as_bytes())?;
    temp_file.persist(path).map_err(|e| e.error)?;

    Ok(())
}
