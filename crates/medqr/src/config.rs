//! Configuration management for medqr.
//!
//! This module provides configuration loading and validation using figment,
//! supporting TOML config files, environment variables, and defaults.

use std::net::SocketAddr;
use std::path::PathBuf;

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Default configuration file name.
const CONFIG_FILE_NAME: &str = "config.toml";

/// Default data directory name.
const DATA_DIR_NAME: &str = "medqr";

/// Default database file name.
const DATABASE_FILE_NAME: &str = "profiles.db";

/// Default directory name for the file backend.
const PROFILE_DIR_NAME: &str = "profiles";

/// Largest accepted module size in pixels.
const MAX_MODULE_SIZE: u32 = 64;

/// Largest accepted border in modules.
const MAX_BORDER: u32 = 32;

/// Application configuration.
///
/// Configuration is loaded from (in order of precedence, highest first):
/// 1. Environment variables (prefixed with `MEDQR_`)
/// 2. TOML config file at `~/.config/medqr/config.toml`
/// 3. Default values
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// HTTP server configuration.
    pub server: ServerConfig,
    /// Storage configuration.
    pub storage: StorageConfig,
    /// QR rendering configuration.
    pub qr: QrConfig,
}

/// HTTP server configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Address to listen on.
    pub bind: String,
    /// Absolute base URL embedded in QR codes, e.g. `https://id.example.org`.
    /// When unset the request `Host` header is used.
    pub public_url: Option<String>,
}

/// Which storage backend serves profiles.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Backend {
    /// JSON and PNG files on disk, content-hash identifiers.
    File,
    /// Nothing persisted; the record travels in the profile URL.
    Stateless,
    /// `SQLite` rows, random-token identifiers.
    #[default]
    Database,
}

impl std::fmt::Display for Backend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::File => write!(f, "file"),
            Self::Stateless => write!(f, "stateless"),
            Self::Database => write!(f, "database"),
        }
    }
}

/// Storage-related configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Backend serving profiles.
    pub backend: Backend,
    /// Directory for the file backend.
    /// Defaults to `~/.local/share/medqr/profiles`
    pub profile_dir: Option<PathBuf>,
    /// Path to the database file.
    /// Defaults to `~/.local/share/medqr/profiles.db`
    pub database_path: Option<PathBuf>,
}

/// QR rendering configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct QrConfig {
    /// Pixels per QR module.
    pub module_size: u32,
    /// Quiet-zone width in modules.
    pub border: u32,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: "127.0.0.1:5000".to_string(),
            public_url: None,
        }
    }
}

impl Default for QrConfig {
    fn default() -> Self {
        Self {
            module_size: 10,
            border: 5,
        }
    }
}

impl Config {
    /// Load and validate configuration.
    ///
    /// Sources are merged in this order (later sources override earlier):
    /// 1. Default values
    /// 2. TOML config file at `config_path` or the default path, if it exists
    /// 3. Environment variables (prefixed with `MEDQR_`)
    ///
    /// # Errors
    ///
    /// Returns an error if configuration loading or parsing fails.
    pub fn load_from(config_path: Option<PathBuf>) -> Result<Self> {
        let config = Self::extract_from(config_path)?;
        config.validate()?;
        Ok(config)
    }

    /// Merge defaults, the config file and the environment without
    /// validating, so command-line overrides can still replace bad values.
    ///
    /// # Errors
    ///
    /// Returns an error if a source cannot be parsed.
    pub fn extract_from(config_path: Option<PathBuf>) -> Result<Self> {
        let config_file = config_path.unwrap_or_else(Self::default_config_path);

        let figment = Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Toml::file(&config_file))
            .merge(Env::prefixed("MEDQR_").split("__"));

        Ok(figment.extract()?)
    }

    /// Get the default configuration file path.
    #[must_use]
    pub fn default_config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from(".config"))
            .join(DATA_DIR_NAME)
            .join(CONFIG_FILE_NAME)
    }

    /// Get the default data directory path.
    #[must_use]
    pub fn default_data_dir() -> PathBuf {
        dirs::data_local_dir()
            .unwrap_or_else(|| PathBuf::from(".local/share"))
            .join(DATA_DIR_NAME)
    }

    /// Validate the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if any configuration values are invalid.
    pub fn validate(&self) -> Result<()> {
        self.bind_addr()?;

        if let Some(url) = &self.server.public_url {
            if !(url.starts_with("http://") || url.starts_with("https://")) {
                return Err(Error::ConfigValidation {
                    message: format!("public_url must start with http:// or https://: {url}"),
                });
            }
        }

        if self.qr.module_size == 0 || self.qr.module_size > MAX_MODULE_SIZE {
            return Err(Error::ConfigValidation {
                message: format!(
                    "module_size must be between 1 and {MAX_MODULE_SIZE}, got {}",
                    self.qr.module_size
                ),
            });
        }

        if self.qr.border > MAX_BORDER {
            return Err(Error::ConfigValidation {
                message: format!(
                    "border must be at most {MAX_BORDER}, got {}",
                    self.qr.border
                ),
            });
        }

        Ok(())
    }

    /// Parse the bind address.
    ///
    /// # Errors
    ///
    /// Returns an error if `server.bind` is not a socket address.
    pub fn bind_addr(&self) -> Result<SocketAddr> {
        self.server
            .bind
            .parse()
            .map_err(|_| Error::ConfigValidation {
                message: format!("invalid bind address: {}", self.server.bind),
            })
    }

    /// Get the profile directory, resolving defaults if not set.
    #[must_use]
    pub fn profile_dir(&self) -> PathBuf {
        self.storage
            .profile_dir
            .clone()
            .unwrap_or_else(|| Self::default_data_dir().join(PROFILE_DIR_NAME))
    }

    /// Get the database path, resolving defaults if not set.
    #[must_use]
    pub fn database_path(&self) -> PathBuf {
        self.storage
            .database_path
            .clone()
            .unwrap_or_else(|| Self::default_data_dir().join(DATABASE_FILE_NAME))
    }

    /// Get the public base URL without a trailing slash, if configured.
    #[must_use]
    pub fn public_url(&self) -> Option<&str> {
        self.server
            .public_url
            .as_deref()
            .map(|url| url.trim_end_matches('/'))
    }
}
