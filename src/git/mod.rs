//! git
//!
//! Git invocations built from untrusted job input.
//!
//! # Architecture
//!
//! Every operation takes a [`ShellRunner`] and builds one argv for it. The
//! runner is the only thing that starts processes, so tests substitute a
//! [`MockShellRunner`] and assert on the exact argv.
//!
//! # Invariants
//!
//! - Refs are validated into a [`GitRef`](crate::core::types::GitRef)
//!   before any process is started; an invalid ref starts nothing.
//! - Repository, directory, and ref positionals follow `--`.
//! - Flag strings come from configuration and are split on whitespace.
//! - Runner errors are surfaced unchanged in [`GitError::Shell`].
//!
//! # Example
//!
//! ```no_run
//! use jobshell::core::config::GitConfig;
//! use jobshell::git::Git;
//! use jobshell::shell::Shell;
//! use tokio_util::sync::CancellationToken;
//!
//! # async fn demo() -> Result<(), Box<dyn std::error::Error>> {
//! let sh = Shell::new()?;
//! let config = GitConfig::default();
//! let git = Git::new(&sh, &config);
//! let cancel = CancellationToken::new();
//!
//! git.fetch(&cancel, "origin", &["main"]).await?;
//! git.checkout(&cancel, "FETCH_HEAD").await?;
//! git.clean(&cancel).await?;
//! # Ok(())
//! # }
//! ```

pub mod mirror;
pub mod mock;
mod ops;
mod runner;
mod ssh;

pub use mirror::{ensure_mirror, mirror_dir_for};
pub use mock::{MockResponse, MockShellRunner};
pub use ops::{checkout, clean, clean_submodules, clone, fetch, Git};
pub use runner::ShellRunner;
pub use ssh::{known_host_for, resolve_host};

use std::path::PathBuf;

use thiserror::Error;

use crate::core::types::TypeError;
use crate::lock::LockError;
use crate::shell::ShellError;

/// Errors from git operations.
#[derive(Debug, Error)]
pub enum GitError {
    /// A ref or URL failed validation. Nothing was run.
    #[error(transparent)]
    InvalidInput(#[from] TypeError),

    /// A flag would be interpreted by the nested shell of
    /// `git submodule foreach`. Nothing was run.
    #[error("refusing to pass {flag:?} to git submodule foreach")]
    UnsafeFlag { flag: String },

    /// git (or ssh) ran and failed, or could not be started.
    #[error(transparent)]
    Shell(#[from] ShellError),

    /// The mirror lock could not be taken.
    #[error(transparent)]
    Lock(#[from] LockError),

    /// Mirror operations need `git.mirrors_path`.
    #[error("git mirrors are not configured (set git.mirrors_path)")]
    MirrorsDisabled,

    /// The mirrors directory could not be created.
    #[error("cannot create mirror directory {}: {source}", path.display())]
    MirrorDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl GitError {
    /// Whether this error was raised before anything was run.
    pub fn is_validation(&self) -> bool {
        matches!(self, GitError::InvalidInput(_) | GitError::UnsafeFlag { .. })
    }
}
