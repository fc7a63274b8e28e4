//! git::runner
//!
//! The seam between git operations and process execution.

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

use crate::shell::{Shell, ShellError};

/// Anything that can run a program as an argv.
///
/// [`Shell`] is the real implementation; [`MockShellRunner`](super::MockShellRunner)
/// records calls for tests.
#[async_trait]
pub trait ShellRunner: Send + Sync {
    /// Run `program` with a prompt line, streaming its output.
    async fn run(
        &self,
        cancel: &CancellationToken,
        program: &str,
        args: &[&str],
    ) -> Result<(), ShellError>;

    /// Run `program` and return its trimmed standard output.
    async fn run_and_capture(
        &self,
        cancel: &CancellationToken,
        program: &str,
        args: &[&str],
    ) -> Result<String, ShellError>;
}

#[async_trait]
impl ShellRunner for Shell {
    async fn run(
        &self,
        cancel: &CancellationToken,
        program: &str,
        args: &[&str],
    ) -> Result<(), ShellError> {
        Shell::run(self, cancel, program, args).await
    }

    async fn run_and_capture(
        &self,
        cancel: &CancellationToken,
        program: &str,
        args: &[&str],
    ) -> Result<String, ShellError> {
        Shell::run_and_capture(self, cancel, program, args).await
    }
}
