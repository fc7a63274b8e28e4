//! core::config
//!
//! Configuration schema and loading.
//!
//! # Overview
//!
//! The caller (usually the bootstrap phase of a job) supplies the PTY flag,
//! the signal grace period, git flags, and the lock strategy. They are read
//! once from a TOML file and passed by value into [`crate::shell::Shell`],
//! [`crate::git::Git`], and [`crate::lock::FileLock`]; nothing reads
//! configuration from global state at run time.
//!
//! # Locations
//!
//! Searched in order, first existing file wins:
//! 1. An explicit path (the `--config` flag)
//! 2. `$JOBSHELL_CONFIG` if set
//! 3. `$XDG_CONFIG_HOME/jobshell/config.toml`
//! 4. `~/.jobshell/config.toml`
//!
//! If none exist, defaults are used.
//!
//! # Example
//!
//! ```no_run
//! use jobshell::core::config::Config;
//!
//! let loaded = Config::load(None).unwrap();
//! println!("pty: {}", loaded.config.shell.pty);
//! if let Some(path) = loaded.path {
//!     println!("loaded from {}", path.display());
//! }
//! ```

pub mod schema;

pub use schema::{Config, GitConfig, LockConfig, ShellConfig};

use std::fs;
use std::path::{Path, PathBuf};

use thiserror::Error;

/// Errors from configuration operations.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file '{path}': {source}")]
    ReadError {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse config file '{path}': {message}")]
    ParseError { path: PathBuf, message: String },

    #[error("config file '{0}' does not exist")]
    NotFound(PathBuf),

    #[error("invalid config value: {0}")]
    InvalidValue(String),
}

/// Result of loading configuration.
#[derive(Debug)]
pub struct LoadedConfig {
    /// The loaded configuration.
    pub config: Config,
    /// The file it came from, if any.
    pub path: Option<PathBuf>,
}

impl Config {
    /// Load configuration from an explicit path or the default locations.
    ///
    /// # Errors
    ///
    /// Returns an error if an explicit path is missing, or if a config file
    /// exists but cannot be read, parsed, or validated. A missing file in the
    /// default locations is not an error.
    pub fn load(explicit: Option<&Path>) -> Result<LoadedConfig, ConfigError> {
        if let Some(path) = explicit {
            if !path.exists() {
                return Err(ConfigError::NotFound(path.to_path_buf()));
            }
            return Self::load_file(path);
        }
        Self::load_first(&Self::search_paths())
    }

    /// Load the first existing file among `candidates`.
    pub fn load_first(candidates: &[PathBuf]) -> Result<LoadedConfig, ConfigError> {
        match candidates.iter().find(|p| p.exists()) {
            Some(path) => Self::load_file(path),
            None => Ok(LoadedConfig {
                config: Config::default(),
                path: None,
            }),
        }
    }

    /// The default search locations, in precedence order.
    pub fn search_paths() -> Vec<PathBuf> {
        let mut paths = Vec::new();
        if let Ok(path) = std::env::var("JOBSHELL_CONFIG") {
            paths.push(PathBuf::from(path));
        }
        if let Ok(xdg_home) = std::env::var("XDG_CONFIG_HOME") {
            paths.push(PathBuf::from(xdg_home).join("jobshell/config.toml"));
        }
        if let Some(home) = dirs::home_dir() {
            paths.push(home.join(".jobshell/config.toml"));
        }
        paths
    }

    /// Parse configuration from TOML text.
    ///
    /// `origin` is only used in error messages.
    pub fn from_toml(contents: &str, origin: &Path) -> Result<Config, ConfigError> {
        let config: Config = toml::from_str(contents).map_err(|e| ConfigError::ParseError {
            path: origin.to_path_buf(),
            message: e.to_string(),
        })?;
        config.validate()?;
        Ok(config)
    }

    fn load_file(path: &Path) -> Result<LoadedConfig, ConfigError> {
        let contents = fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
            path: path.to_path_buf(),
            source: e,
        })?;
        let config = Self::from_toml(&contents, path)?;
        tracing::debug!(path = %path.display(), "loaded config");
        Ok(LoadedConfig {
            config,
            path: Some(path.to_path_buf()),
        })
    }
}
