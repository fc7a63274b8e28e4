//! git::mock
//!
//! Recording [`ShellRunner`] for deterministic tests of argv construction.
//!
//! # Example
//!
//! ```
//! use jobshell::git::{self, MockShellRunner};
//! use tokio_util::sync::CancellationToken;
//!
//! # tokio::runtime::Runtime::new().unwrap().block_on(async {
//! let sh = MockShellRunner::new();
//! git::checkout(&CancellationToken::new(), &sh, "-f -q", "main").await.unwrap();
//! assert_eq!(sh.calls(), vec![vec!["git", "checkout", "-f", "-q", "main"]]);
//! # });
//! ```

use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

use super::runner::ShellRunner;
use crate::shell::{ExitError, ShellError, SIGNALED_EXIT_CODE};

/// What the next recorded call returns.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MockResponse {
    /// Exit 0, with this standard output for captures.
    Success(String),
    /// Exit non-zero with this diagnostic output.
    Exit { code: i32, stderr: String },
    /// Terminated by a signal.
    Signaled,
    /// The program could not be found.
    StartFailure,
}

/// Records every argv it is asked to run.
///
/// Responses are consumed in order; once the queue is empty every call
/// succeeds with empty output. Clones share state.
#[derive(Debug, Clone, Default)]
pub struct MockShellRunner {
    inner: Arc<Mutex<MockInner>>,
}

#[derive(Debug, Default)]
struct MockInner {
    calls: Vec<Vec<String>>,
    responses: VecDeque<MockResponse>,
}

impl MockShellRunner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a response for the next unanswered call.
    pub fn respond(&self, response: MockResponse) -> &Self {
        self.lock().responses.push_back(response);
        self
    }

    /// Every argv run so far, program first.
    pub fn calls(&self) -> Vec<Vec<String>> {
        self.lock().calls.clone()
    }

    pub fn call_count(&self) -> usize {
        self.lock().calls.len()
    }

    fn lock(&self) -> MutexGuard<'_, MockInner> {
        match self.inner.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    fn record(&self, program: &str, args: &[&str]) -> MockResponse {
        let mut inner = self.lock();
        let mut argv = vec![program.to_string()];
        argv.extend(args.iter().map(|a| a.to_string()));
        inner.calls.push(argv);
        inner
            .responses
            .pop_front()
            .unwrap_or(MockResponse::Success(String::new()))
    }

    fn answer(program: &str, response: MockResponse) -> Result<String, ShellError> {
        match response {
            MockResponse::Success(stdout) => Ok(stdout.trim().to_string()),
            MockResponse::Exit { code, stderr } => Err(ShellError::Exit(ExitError {
                program: program.to_string(),
                code,
                signaled: false,
                stderr,
            })),
            MockResponse::Signaled => Err(ShellError::Exit(ExitError {
                program: program.to_string(),
                code: SIGNALED_EXIT_CODE,
                signaled: true,
                stderr: String::new(),
            })),
            MockResponse::StartFailure => Err(ShellError::Start {
                program: program.to_string(),
                source: std::io::Error::from(std::io::ErrorKind::NotFound),
            }),
        }
    }
}

#[async_trait]
impl ShellRunner for MockShellRunner {
    async fn run(
        &self,
        cancel: &CancellationToken,
        program: &str,
        args: &[&str],
    ) -> Result<(), ShellError> {
        self.run_and_capture(cancel, program, args).await.map(|_| ())
    }

    async fn run_and_capture(
        &self,
        cancel: &CancellationToken,
        program: &str,
        args: &[&str],
    ) -> Result<String, ShellError> {
        if cancel.is_cancelled() {
            return Err(ShellError::Cancelled {
                program: program.to_string(),
            });
        }
        let response = self.record(program, args);
        Self::answer(program, response)
    }
}
