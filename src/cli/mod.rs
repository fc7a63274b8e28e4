//! cli
//!
//! Command-line interface layer for jobshell.
//!
//! # Responsibilities
//!
//! - Parse command-line arguments and global flags
//! - Install the tracing subscriber and load configuration
//! - Turn Ctrl-C into cancellation of the running command
//! - Map failures to the process exit status
//!
//! # Architecture
//!
//! The CLI layer is thin. Handlers in [`commands`] build a [`Shell`] from
//! the [`Context`] and call into [`crate::git`] and [`crate::lock`]. A
//! failing child's exit status becomes jobshell's own.

pub mod args;
pub mod commands;

pub use args::{Cli, CompletionShell};

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context as _, Result};
use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;

use crate::core::config::Config;
use crate::git::GitError;
use crate::lock::{FileLock, LockError};
use crate::shell::{get_exit_code, Shell, ShellError};

/// State shared by every command handler.
#[derive(Debug, Clone)]
pub struct Context {
    /// Directory commands run in, when not the process's own.
    pub cwd: Option<PathBuf>,
    /// Effective configuration.
    pub config: Config,
    /// Fired on Ctrl-C.
    pub cancel: CancellationToken,
}

impl Context {
    /// A shell configured from `[shell]`, positioned at `--cwd`.
    pub fn shell(&self) -> Result<Shell> {
        let mut sh = Shell::from_config(&self.config.shell).context("failed to initialize shell")?;
        if let Some(cwd) = &self.cwd {
            sh.chdir(cwd)
                .with_context(|| format!("cannot use --cwd {}", cwd.display()))?;
        }
        Ok(sh)
    }

    /// A lock factory configured from `[lock]`.
    pub fn file_lock(&self) -> FileLock {
        FileLock::new(&self.config.lock)
    }
}

/// Run the CLI application.
///
/// This is the main entry point called from `main.rs`.
pub fn run() -> ExitCode {
    let cli = Cli::parse_args();
    init_tracing(cli.debug);

    let runtime = match tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
    {
        Ok(rt) => rt,
        Err(e) => {
            eprintln!("error: failed to start runtime: {e}");
            return ExitCode::FAILURE;
        }
    };

    match runtime.block_on(run_async(cli)) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            let status = exit_status_for(&err);
            if !is_quiet_failure(&err) {
                eprintln!("error: {err:#}");
            }
            ExitCode::from(status)
        }
    }
}

async fn run_async(cli: Cli) -> Result<()> {
    let loaded = Config::load(cli.config.as_deref())?;
    let mut config = loaded.config;
    if cli.pty {
        config.shell.pty = true;
    }

    let cancel = CancellationToken::new();
    let on_interrupt = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("received interrupt, cancelling");
            on_interrupt.cancel();
        }
    });

    let ctx = Context {
        cwd: cli.cwd,
        config,
        cancel,
    };
    commands::dispatch(cli.command, &ctx).await
}

fn init_tracing(debug: bool) {
    let default = if debug { "jobshell=debug" } else { "jobshell=info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    // Already installed when run twice in one process.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

fn shell_error(err: &anyhow::Error) -> Option<&ShellError> {
    err.chain().find_map(|cause| {
        cause.downcast_ref::<ShellError>().or_else(|| {
            match cause.downcast_ref::<GitError>() {
                Some(GitError::Shell(e)) => Some(e),
                _ => None,
            }
        })
    })
}

/// The exit status jobshell reports for `err`.
///
/// A child's own status is passed through; anything that does not fit in
/// a process status becomes 1.
pub fn exit_status_for(err: &anyhow::Error) -> u8 {
    match shell_error(err).map(get_exit_code) {
        Some(code) => u8::try_from(code).ok().filter(|c| *c != 0).unwrap_or(1),
        None => 1,
    }
}

// The child already reported its own failure on the shared output.
fn is_quiet_failure(err: &anyhow::Error) -> bool {
    if err.chain().any(|c| c.downcast_ref::<LockError>().is_some()) {
        return false;
    }
    matches!(shell_error(err), Some(ShellError::Exit(e)) if !e.signaled)
}
