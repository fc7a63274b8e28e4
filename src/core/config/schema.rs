//! core::config::schema
//!
//! Configuration schema types.
//!
//! # Sections
//!
//! - `[shell]` - How commands are run (PTY, termination grace period, prompt)
//! - `[git]` - Flags handed to git subcommands and mirror settings
//! - `[lock]` - File locking strategy and retry interval
//!
//! Durations are written in humantime form (`"9s"`, `"100ms"`, `"5m"`).
//!
//! # Validation
//!
//! Values are validated after parsing; a zero grace period or poll interval
//! would turn cancellation and lock retry into busy loops.

use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::ConfigError;
use crate::lock::LockStrategy;
use crate::shell::PromptStyle;

/// Complete configuration.
///
/// # Example
///
/// ```toml
/// [shell]
/// pty = true
/// signal_grace_period = "9s"
///
/// [git]
/// clean_flags = "-ffxdq"
/// mirrors_path = "/var/lib/jobshell/mirrors"
///
/// [lock]
/// strategy = "flock"
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Command execution settings
    pub shell: ShellConfig,

    /// Git invocation settings
    pub git: GitConfig,

    /// File lock settings
    pub lock: LockConfig,
}

impl Config {
    /// Validate the configuration values.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidValue` if any value is invalid.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.shell.signal_grace_period.is_zero() {
            return Err(ConfigError::InvalidValue(
                "shell.signal_grace_period must be greater than zero".into(),
            ));
        }
        if self.lock.poll_interval.is_zero() {
            return Err(ConfigError::InvalidValue(
                "lock.poll_interval must be greater than zero".into(),
            ));
        }
        Ok(())
    }
}

/// Command execution settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct ShellConfig {
    /// Attach children to a pseudo-terminal
    pub pty: bool,

    /// Time between the termination signal and a forced kill
    #[serde(with = "humantime_serde")]
    pub signal_grace_period: Duration,

    /// Prompt convention used when echoing commands
    pub prompt: PromptStyle,
}

impl Default for ShellConfig {
    fn default() -> Self {
        Self {
            pty: false,
            signal_grace_period: Duration::from_secs(9),
            prompt: PromptStyle::default(),
        }
    }
}

/// Git invocation settings.
///
/// Flag strings come from trusted agent configuration and are split on
/// whitespace into discrete arguments.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct GitConfig {
    /// Flags for `git checkout`
    pub checkout_flags: String,

    /// Flags for `git clone`
    pub clone_flags: String,

    /// Flags for `git clone --mirror`
    pub clone_mirror_flags: String,

    /// Flags for `git clean`
    pub clean_flags: String,

    /// Flags for `git fetch`
    pub fetch_flags: String,

    /// Whether submodules are cleaned alongside the checkout
    pub submodules: bool,

    /// Directory holding shared mirrors (mirroring disabled when unset)
    pub mirrors_path: Option<PathBuf>,

    /// How long to wait for another process to finish with a mirror
    #[serde(with = "humantime_serde")]
    pub mirrors_lock_timeout: Duration,

    /// Use existing mirrors without fetching
    pub mirrors_skip_update: bool,
}

impl Default for GitConfig {
    fn default() -> Self {
        Self {
            checkout_flags: "-f".into(),
            clone_flags: "-v".into(),
            clone_mirror_flags: "-v".into(),
            clean_flags: "-ffxdq".into(),
            fetch_flags: "-v --prune".into(),
            submodules: true,
            mirrors_path: None,
            mirrors_lock_timeout: Duration::from_secs(300),
            mirrors_skip_update: false,
        }
    }
}

/// File lock settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct LockConfig {
    /// Locking strategy
    pub strategy: LockStrategy,

    /// Delay between acquisition attempts
    #[serde(with = "humantime_serde")]
    pub poll_interval: Duration,
}

impl Default for LockConfig {
    fn default() -> Self {
        Self {
            strategy: LockStrategy::default(),
            poll_interval: Duration::from_millis(100),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_agent_defaults() {
        let config = Config::default();
        assert!(!config.shell.pty);
        assert_eq!(config.shell.signal_grace_period, Duration::from_secs(9));
        assert_eq!(config.git.checkout_flags, "-f");
        assert_eq!(config.git.clean_flags, "-ffxdq");
        assert_eq!(config.git.fetch_flags, "-v --prune");
        assert_eq!(config.lock.strategy, LockStrategy::Marker);
        assert_eq!(config.lock.poll_interval, Duration::from_millis(100));
    }

    #[test]
    fn parse_humantime_durations() {
        let config: Config = toml::from_str(
            r#"
            [shell]
            signal_grace_period = "2s 500ms"

            [git]
            mirrors_lock_timeout = "1m"

            [lock]
            strategy = "flock"
            poll_interval = "250ms"
            "#,
        )
        .unwrap();
        assert_eq!(config.shell.signal_grace_period, Duration::from_millis(2500));
        assert_eq!(config.git.mirrors_lock_timeout, Duration::from_secs(60));
        assert_eq!(config.lock.strategy, LockStrategy::Flock);
        assert_eq!(config.lock.poll_interval, Duration::from_millis(250));
    }

    #[test]
    fn zero_grace_period_rejected() {
        let mut config = Config::default();
        config.shell.signal_grace_period = Duration::ZERO;
        assert!(matches!(config.validate(), Err(ConfigError::InvalidValue(_))));
    }

    #[test]
    fn zero_poll_interval_rejected() {
        let mut config = Config::default();
        config.lock.poll_interval = Duration::ZERO;
        assert!(config.validate().is_err());
    }

    #[test]
    fn prompt_style_parses() {
        let config: Config = toml::from_str("[shell]\nprompt = \"windows\"\n").unwrap();
        assert_eq!(config.shell.prompt, PromptStyle::Windows);
    }
}
