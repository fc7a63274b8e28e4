//! shell::error
//!
//! Errors from running subprocesses, and uniform exit-code extraction.
//!
//! # Exit codes
//!
//! [`get_exit_code`] gives every error a code so callers can report one
//! number regardless of how the command failed:
//!
//! | Failure | Code |
//! |---------|------|
//! | normal non-zero exit | the process's code |
//! | terminated by signal, or cancelled | [`SIGNALED_EXIT_CODE`] |
//! | executable not found | 127 |
//! | permission denied | 126 |
//! | any other start or I/O failure | 1 |

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Portable exit code reported for signal termination.
///
/// Platform signal numbers are deliberately not exposed.
pub const SIGNALED_EXIT_CODE: i32 = -1;

/// A process that ran and did not exit successfully.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExitError {
    /// The program that was run.
    pub program: String,
    /// Exit code, or [`SIGNALED_EXIT_CODE`] when signaled.
    pub code: i32,
    /// Whether the process was terminated by a signal.
    pub signaled: bool,
    /// Diagnostic output, when the invocation captured it.
    pub stderr: String,
}

impl std::fmt::Display for ExitError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.signaled {
            write!(f, "{} was terminated by a signal", self.program)
        } else {
            write!(f, "{} exited with status {}", self.program, self.code)
        }
    }
}

impl std::error::Error for ExitError {}

/// Errors from shell operations.
#[derive(Debug, Error)]
pub enum ShellError {
    /// The process could not be started.
    #[error("failed to start {program}: {source}")]
    Start {
        program: String,
        #[source]
        source: io::Error,
    },

    /// The process ran and failed.
    #[error(transparent)]
    Exit(#[from] ExitError),

    /// The invocation was cancelled before the process was started.
    #[error("{program} was not started: cancelled")]
    Cancelled { program: String },

    /// Terminating a running process failed.
    #[error("failed to terminate {program}: {source}")]
    Terminate {
        program: String,
        #[source]
        source: io::Error,
    },

    /// The working directory could not be changed.
    #[error("cannot change directory to {}: {source}", path.display())]
    Chdir {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// I/O error while streaming output or waiting for the process.
    #[error("shell i/o error: {0}")]
    Io(#[from] io::Error),
}

impl ShellError {
    /// The exit code this error represents.
    pub fn exit_code(&self) -> i32 {
        match self {
            ShellError::Exit(e) => e.code,
            ShellError::Cancelled { .. } => SIGNALED_EXIT_CODE,
            ShellError::Start { source, .. } => match source.kind() {
                io::ErrorKind::NotFound => 127,
                io::ErrorKind::PermissionDenied => 126,
                _ => 1,
            },
            ShellError::Terminate { .. } | ShellError::Chdir { .. } | ShellError::Io(_) => 1,
        }
    }

    /// Whether the process ran and was terminated by a signal.
    pub fn is_exit_signaled(&self) -> bool {
        matches!(self, ShellError::Exit(e) if e.signaled)
    }

    /// Whether the invocation was cancelled before anything was started.
    pub fn is_cancelled(&self) -> bool {
        matches!(self, ShellError::Cancelled { .. })
    }
}

/// Exit code carried by a shell error.
pub fn get_exit_code(err: &ShellError) -> i32 {
    err.exit_code()
}

/// Whether a shell error is a signal termination.
pub fn is_exit_signaled(err: &ShellError) -> bool {
    err.is_exit_signaled()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn exit(code: i32, signaled: bool) -> ShellError {
        ShellError::Exit(ExitError {
            program: "prog".into(),
            code,
            signaled,
            stderr: String::new(),
        })
    }

    #[test]
    fn exit_code_of_normal_exit() {
        assert_eq!(get_exit_code(&exit(24, false)), 24);
        assert!(!is_exit_signaled(&exit(24, false)));
    }

    #[test]
    fn exit_code_of_signal_is_sentinel() {
        let err = exit(SIGNALED_EXIT_CODE, true);
        assert_eq!(err.exit_code(), SIGNALED_EXIT_CODE);
        assert!(is_exit_signaled(&err));
    }

    #[test]
    fn start_failures_map_to_shell_conventions() {
        let not_found = ShellError::Start {
            program: "nope".into(),
            source: io::Error::from(io::ErrorKind::NotFound),
        };
        let denied = ShellError::Start {
            program: "nope".into(),
            source: io::Error::from(io::ErrorKind::PermissionDenied),
        };
        assert_eq!(not_found.exit_code(), 127);
        assert_eq!(denied.exit_code(), 126);
        assert!(!not_found.is_exit_signaled());
    }

    #[test]
    fn cancellation_is_not_a_signal_exit() {
        let err = ShellError::Cancelled {
            program: "sleep".into(),
        };
        assert!(err.is_cancelled());
        assert!(!err.is_exit_signaled());
    }

    #[test]
    fn display_formatting() {
        assert_eq!(exit(3, false).to_string(), "prog exited with status 3");
        assert!(exit(-1, true).to_string().contains("signal"));
    }
}
