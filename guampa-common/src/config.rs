//! Bootstrap configuration and root folder resolution
//!
//! Settings are resolved in priority order:
//! 1. Command-line argument or environment variable (handled by the binary)
//! 2. TOML config file
//! 3. Compiled default
//!
//! A missing config file is not an error: the server warns and starts with
//! defaults.

use crate::{Error, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Default HTTP port
pub const DEFAULT_PORT: u16 = 5000;

/// Default bind address
pub const DEFAULT_HOST: &str = "127.0.0.1";

/// Database file name inside the root folder
pub const DATABASE_FILE: &str = "guampa.db";

/// Contents of `guampa.toml`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TomlConfig {
    /// Folder holding the database when `database_path` is not given
    #[serde(default)]
    pub root_folder: Option<PathBuf>,

    /// Explicit SQLite database file
    #[serde(default)]
    pub database_path: Option<PathBuf>,

    #[serde(default)]
    pub host: Option<String>,

    #[serde(default)]
    pub port: Option<u16>,

    /// Directory with index.html and the css/js/img/lib/partials folders
    #[serde(default)]
    pub app_dir: Option<PathBuf>,

    #[serde(default)]
    pub logging: LoggingConfig,
}

/// `[logging]` table
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// Log filter used when RUST_LOG is unset
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

fn default_log_level() -> String {
    "guampa_server=info,tower_http=info".to_string()
}

impl TomlConfig {
    /// Parse a config file, failing if it is missing or malformed
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        toml::from_str(&content)
            .map_err(|e| Error::Config(format!("{}: {}", path.display(), e)))
    }

    /// Parse a config file if one was given and exists, otherwise defaults
    ///
    /// A malformed file is still an error; only absence degrades to defaults.
    /// Logs nothing; report the returned source with [`ConfigSource::log`]
    /// once a subscriber is installed.
    pub fn load_or_default(path: Option<&Path>) -> Result<(Self, ConfigSource)> {
        match path {
            Some(path) if path.exists() => {
                Ok((Self::load(path)?, ConfigSource::File(path.to_path_buf())))
            }
            Some(path) => Ok((Self::default(), ConfigSource::Missing(path.to_path_buf()))),
            None => Ok((Self::default(), ConfigSource::Defaults)),
        }
    }
}

/// Where the bootstrap configuration came from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigSource {
    /// Parsed from this file
    File(PathBuf),
    /// This file was named but does not exist; defaults used
    Missing(PathBuf),
    /// No file named; defaults used
    Defaults,
}

impl ConfigSource {
    pub fn log(&self) {
        match self {
            ConfigSource::File(path) => {
                info!("Loaded configuration from {}", path.display())
            }
            ConfigSource::Missing(path) => {
                warn!("Config file {} not found, using defaults", path.display())
            }
            ConfigSource::Defaults => info!("No config file given, using defaults"),
        }
    }
}

/// Values supplied on the command line or through environment variables
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub root_folder: Option<PathBuf>,
    pub database_path: Option<PathBuf>,
    pub host: Option<String>,
    pub port: Option<u16>,
    pub app_dir: Option<PathBuf>,
}

/// Fully resolved server configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    pub database_path: PathBuf,
    pub host: String,
    pub port: u16,
    pub app_dir: PathBuf,
    pub log_level: String,
}

impl ServerConfig {
    /// Merge overrides over the TOML file over compiled defaults
    pub fn resolve(overrides: &ConfigOverrides, toml: &TomlConfig) -> Self {
        let database_path = overrides
            .database_path
            .clone()
            .or_else(|| toml.database_path.clone())
            .unwrap_or_else(|| {
                resolve_root_folder(overrides.root_folder.as_deref(), toml).join(DATABASE_FILE)
            });

        Self {
            database_path,
            host: overrides
                .host
                .clone()
                .or_else(|| toml.host.clone())
                .unwrap_or_else(|| DEFAULT_HOST.to_string()),
            port: overrides.port.or(toml.port).unwrap_or(DEFAULT_PORT),
            app_dir: overrides
                .app_dir
                .clone()
                .or_else(|| toml.app_dir.clone())
                .unwrap_or_else(|| PathBuf::from("app")),
            log_level: toml.logging.level.clone(),
        }
    }

    /// `host:port` string for binding the listener
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Root folder: explicit value, then TOML `root_folder`, then OS default
pub fn resolve_root_folder(explicit: Option<&Path>, toml: &TomlConfig) -> PathBuf {
    if let Some(path) = explicit {
        return path.to_path_buf();
    }
    if let Some(path) = &toml.root_folder {
        return path.clone();
    }
    default_root_folder()
}

/// OS-dependent default root folder
pub fn default_root_folder() -> PathBuf {
    dirs::data_local_dir()
        .map(|d| d.join("guampa"))
        .unwrap_or_else(|| PathBuf::from("./guampa_data"))
}
