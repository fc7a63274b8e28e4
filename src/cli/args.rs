//! cli::args
//!
//! Command-line argument definitions using clap derive.
//!
//! # Global Flags
//!
//! These flags are available on all commands:
//! - `--help` / `-h`: Show help
//! - `--version`: Show version
//! - `--cwd <path>`: Run commands in that directory
//! - `--config <file>`: Read configuration from this file
//! - `--pty`: Attach commands to a pseudo-terminal
//! - `--debug`: Enable debug logging

use std::path::PathBuf;
use std::time::Duration;

use clap::{Parser, Subcommand};

use crate::lock::LockStrategy;

/// jobshell - run CI job commands, git checkouts, and locks safely
#[derive(Parser, Debug)]
#[command(name = "jobshell")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Run commands as if started in this directory
    #[arg(long, global = true)]
    pub cwd: Option<PathBuf>,

    /// Configuration file (default: $JOBSHELL_CONFIG, then the XDG and home locations)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Attach commands to a pseudo-terminal
    #[arg(long, global = true)]
    pub pty: bool,

    /// Enable debug logging
    #[arg(long, global = true)]
    pub debug: bool,

    #[command(subcommand)]
    pub command: Command,
}

impl Cli {
    /// Parse command-line arguments.
    pub fn parse_args() -> Self {
        Parser::parse()
    }
}

/// Available commands.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run a program, echoing a prompt line first
    #[command(after_help = "\
EXAMPLES:
    jobshell run make test
    jobshell --pty run ./scripts/build.sh --release")]
    Run {
        /// Program and arguments
        #[arg(required = true, trailing_var_arg = true, allow_hyphen_values = true)]
        command: Vec<String>,
    },

    /// Run a program and print its trimmed standard output
    Capture {
        /// Program and arguments
        #[arg(required = true, trailing_var_arg = true, allow_hyphen_values = true)]
        command: Vec<String>,
    },

    /// Check out a ref with the configured checkout flags
    Checkout {
        /// Branch, tag, or commit to check out
        #[arg(allow_hyphen_values = true)]
        reference: String,
    },

    /// Clone a repository with the configured clone flags
    Clone {
        /// Repository URL or path
        repo: String,
        /// Target directory
        dir: String,
    },

    /// Remove untracked files, including in submodules when enabled
    Clean,

    /// Fetch refs from a repository with the configured fetch flags
    Fetch {
        /// Repository URL, path, or remote name
        repo: String,
        /// Refs to fetch
        #[arg(allow_hyphen_values = true)]
        refs: Vec<String>,
    },

    /// Create or update the shared mirror of a repository
    Mirror {
        /// Repository URL
        repo: String,
        /// How long to wait for another process updating the same mirror
        #[arg(long, value_parser = humantime::parse_duration)]
        timeout: Option<Duration>,
    },

    /// Print the host and port ssh would connect to for a host alias
    ResolveHost {
        /// Host or alias from ssh configuration
        #[arg(allow_hyphen_values = true)]
        host: String,
    },

    /// Print the normalized form of a git remote URL
    ParseUrl {
        /// Path, scp-like address, or URL
        url: String,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Hold a file lock while running a program
    #[command(after_help = "\
EXAMPLES:
    jobshell lock /var/lib/mirrors/repo.lock -- git fetch origin
    jobshell lock --strategy flock --timeout 30s build.lock -- make")]
    Lock {
        /// Path to lock
        path: PathBuf,

        /// Give up after this long
        #[arg(long, default_value = "10s", value_parser = humantime::parse_duration)]
        timeout: Duration,

        /// Locking strategy (default from configuration)
        #[arg(long)]
        strategy: Option<LockStrategy>,

        /// Program and arguments to run while holding the lock
        #[arg(last = true, required = true)]
        command: Vec<String>,
    },

    /// Generate shell completion scripts
    Completion {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: CompletionShell,
    },
}

/// Supported shells for completion
#[derive(clap::ValueEnum, Debug, Clone, Copy)]
pub enum CompletionShell {
    Bash,
    Zsh,
    Fish,
    PowerShell,
}
