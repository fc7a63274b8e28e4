//! shell
//!
//! Running external programs on behalf of a job.
//!
//! # Architecture
//!
//! A [`Shell`] owns a working directory, an [`Environment`] snapshot, an
//! output sink, and a logger. It runs one program at a time as a discrete
//! argv (never through a shell interpreter), either on plain pipes or
//! attached to a pseudo-terminal.
//!
//! Every child leads its own process group. Stopping a child goes through
//! one path whether it was requested by cancelling the invocation's
//! [`CancellationToken`] or through an [`InterruptHandle`]: the group is
//! signalled, and if it has not exited after the signal grace period it is
//! killed. Either way the result is a signaled [`ExitError`].
//!
//! # Example
//!
//! ```no_run
//! use jobshell::shell::Shell;
//! use tokio_util::sync::CancellationToken;
//!
//! # async fn demo() -> Result<(), jobshell::shell::ShellError> {
//! let mut sh = Shell::new()?;
//! sh.chdir("/tmp")?;
//! let cancel = CancellationToken::new();
//! sh.run(&cancel, "git", &["--version"]).await?;
//! let head = sh.run_and_capture(&cancel, "git", &["rev-parse", "HEAD"]).await?;
//! println!("{head}");
//! # Ok(())
//! # }
//! ```

pub mod env;
pub mod error;
pub mod logger;
pub mod output;
pub mod process;
mod pty;

pub use env::Environment;
pub use error::{get_exit_code, is_exit_signaled, ExitError, ShellError, SIGNALED_EXIT_CODE};
pub use logger::{DiscardLogger, ShellLogger, TracingLogger, WriterLogger};
pub use output::{CaptureBuffer, OutputSink};

use std::borrow::Cow;
use std::fs;
use std::future::Future;
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWriteExt};
use tokio::process::{ChildStdin, Command};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::core::config::ShellConfig;
use crate::core::duration::{format_duration, round};
use output::Tee;
use process::StopSignal;

/// How the prompt line echoed before a command is drawn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PromptStyle {
    /// `$ program args`
    Posix,
    /// `> program args`
    Windows,
}

impl PromptStyle {
    pub fn symbol(self) -> &'static str {
        match self {
            PromptStyle::Posix => "$",
            PromptStyle::Windows => ">",
        }
    }
}

impl Default for PromptStyle {
    fn default() -> Self {
        if cfg!(windows) {
            PromptStyle::Windows
        } else {
            PromptStyle::Posix
        }
    }
}

/// Interrupts whatever a shell is currently running.
///
/// Cloning shares the handle. May be used from any task or thread.
#[derive(Debug, Clone, Default)]
pub struct InterruptHandle {
    current: Arc<Mutex<Option<CancellationToken>>>,
}

impl InterruptHandle {
    /// Interrupt the running process, if any.
    ///
    /// Returns whether a process was running.
    pub fn interrupt(&self) -> bool {
        match self.slot().as_ref() {
            Some(token) => {
                token.cancel();
                true
            }
            None => false,
        }
    }

    fn begin(&self) -> CancellationToken {
        let token = CancellationToken::new();
        *self.slot() = Some(token.clone());
        token
    }

    fn finish(&self) {
        *self.slot() = None;
    }

    fn slot(&self) -> std::sync::MutexGuard<'_, Option<CancellationToken>> {
        match self.current.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }
}

/// Clears the interrupt slot when an invocation ends.
struct Active<'a>(&'a InterruptHandle);

impl Drop for Active<'_> {
    fn drop(&mut self) {
        self.0.finish();
    }
}

/// How a process ended, before it is interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct RawExit {
    pub code: i32,
    pub signaled: bool,
}

impl From<std::process::ExitStatus> for RawExit {
    fn from(status: std::process::ExitStatus) -> Self {
        #[cfg(unix)]
        let signaled = {
            use std::os::unix::process::ExitStatusExt;
            status.signal().is_some()
        };
        #[cfg(not(unix))]
        let signaled = false;
        RawExit {
            code: status.code().unwrap_or(SIGNALED_EXIT_CODE),
            signaled,
        }
    }
}

/// The result of a finished process.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecutionOutcome {
    /// Exit code, or [`SIGNALED_EXIT_CODE`] when signaled.
    pub exit_code: i32,
    /// Whether the process was stopped by a signal.
    pub signaled: bool,
    /// Wall-clock time from spawn to exit.
    pub elapsed: Duration,
    /// Captured standard output. On a PTY this is the merged terminal stream.
    pub stdout: Option<Vec<u8>>,
    /// Captured standard error. Always `None` on a PTY.
    pub stderr: Option<Vec<u8>>,
}

impl ExecutionOutcome {
    pub fn success(&self) -> bool {
        self.exit_code == 0 && !self.signaled
    }

    /// Turn a failed outcome into an [`ExitError`].
    pub fn into_result(self, program: &str) -> Result<Self, ShellError> {
        if self.success() {
            return Ok(self);
        }
        let diagnostics = self.stderr.as_deref().or(self.stdout.as_deref()).unwrap_or_default();
        Err(ShellError::Exit(ExitError {
            program: program.to_string(),
            code: self.exit_code,
            signaled: self.signaled,
            stderr: String::from_utf8_lossy(diagnostics).into_owned(),
        }))
    }
}

/// A working directory, environment, and I/O configuration for running
/// programs.
///
/// Only one invocation may be in flight per `Shell`. Clones are independent:
/// they copy the directory and environment and get their own interrupt
/// handle.
pub struct Shell {
    wd: PathBuf,
    env: Environment,
    writer: OutputSink,
    logger: Arc<dyn ShellLogger>,
    pty: bool,
    signal_grace_period: Duration,
    prompt: PromptStyle,
    stdin: Mutex<Option<Box<dyn Read + Send>>>,
    interrupt: InterruptHandle,
}

impl Shell {
    /// A shell in the process's current directory with a snapshot of the
    /// process environment.
    pub fn new() -> Result<Self, ShellError> {
        let wd = std::env::current_dir()?;
        Ok(Self::with_dir_and_env(wd, Environment::from_process()))
    }

    /// Like [`Shell::new`], configured from `[shell]` settings.
    pub fn from_config(config: &ShellConfig) -> Result<Self, ShellError> {
        Ok(Self::new()?
            .with_pty(config.pty)
            .with_signal_grace_period(config.signal_grace_period)
            .with_prompt_style(config.prompt))
    }

    /// A shell with an explicit directory and environment.
    ///
    /// `wd` should be absolute; it is not checked here.
    pub fn with_dir_and_env(wd: PathBuf, env: Environment) -> Self {
        Self {
            wd,
            env,
            writer: OutputSink::stdout(),
            logger: Arc::new(TracingLogger),
            pty: false,
            signal_grace_period: Duration::from_secs(9),
            prompt: PromptStyle::default(),
            stdin: Mutex::new(None),
            interrupt: InterruptHandle::default(),
        }
    }

    pub fn with_writer(mut self, writer: OutputSink) -> Self {
        self.writer = writer;
        self
    }

    pub fn with_logger(mut self, logger: impl ShellLogger + 'static) -> Self {
        self.logger = Arc::new(logger);
        self
    }

    pub fn with_pty(mut self, pty: bool) -> Self {
        self.pty = pty;
        self
    }

    pub fn with_signal_grace_period(mut self, grace: Duration) -> Self {
        self.signal_grace_period = grace;
        self
    }

    pub fn with_prompt_style(mut self, prompt: PromptStyle) -> Self {
        self.prompt = prompt;
        self
    }

    /// A derived shell that feeds `reader` to the next program it runs.
    ///
    /// The derived shell shares this shell's interrupt handle.
    pub fn with_stdin(&self, reader: impl Read + Send + 'static) -> Shell {
        let mut derived = self.clone();
        derived.stdin = Mutex::new(Some(Box::new(reader)));
        derived.interrupt = self.interrupt.clone();
        derived
    }

    /// The working directory.
    pub fn getwd(&self) -> &Path {
        &self.wd
    }

    /// Change the working directory.
    ///
    /// Relative paths resolve against the current working directory of this
    /// shell. The process's working directory is never touched. `PWD` in the
    /// shell's environment follows the change.
    pub fn chdir(&mut self, path: impl AsRef<Path>) -> Result<(), ShellError> {
        let target = self.wd.join(path.as_ref());
        let meta = fs::metadata(&target).map_err(|source| ShellError::Chdir {
            path: target.clone(),
            source,
        })?;
        if !meta.is_dir() {
            return Err(ShellError::Chdir {
                path: target,
                source: io::Error::other("not a directory"),
            });
        }
        self.env.set("PWD", target.to_string_lossy());
        self.wd = target;
        Ok(())
    }

    pub fn env(&self) -> &Environment {
        &self.env
    }

    pub fn env_mut(&mut self) -> &mut Environment {
        &mut self.env
    }

    pub fn writer(&self) -> &OutputSink {
        &self.writer
    }

    pub fn logger(&self) -> &dyn ShellLogger {
        self.logger.as_ref()
    }

    pub fn pty(&self) -> bool {
        self.pty
    }

    pub fn signal_grace_period(&self) -> Duration {
        self.signal_grace_period
    }

    /// A handle that interrupts this shell's running process.
    pub fn interrupt_handle(&self) -> InterruptHandle {
        self.interrupt.clone()
    }

    /// Interrupt the running process, if any.
    pub fn interrupt(&self) -> bool {
        self.interrupt.interrupt()
    }

    /// Resolve `program` the way [`Shell::run`] will.
    ///
    /// Names containing a path separator resolve against the working
    /// directory; bare names are looked up on this shell's `PATH`.
    pub fn absolute_path(&self, program: &str) -> io::Result<PathBuf> {
        let candidate = Path::new(program);
        if candidate.is_absolute() || candidate.components().count() > 1 {
            return Ok(self.wd.join(candidate));
        }
        let search = self.env.get("PATH").unwrap_or_default();
        which::which_in(program, Some(search), &self.wd).map_err(|e| {
            io::Error::new(
                io::ErrorKind::NotFound,
                format!("{program} not found on PATH: {e}"),
            )
        })
    }

    /// Echo a prompt line, then run `program`.
    pub async fn run(
        &self,
        cancel: &CancellationToken,
        program: &str,
        args: &[&str],
    ) -> Result<(), ShellError> {
        self.write_prompt(program, args)?;
        self.run_without_prompt(cancel, program, args).await
    }

    /// Run `program`, streaming its output to the writer.
    pub async fn run_without_prompt(
        &self,
        cancel: &CancellationToken,
        program: &str,
        args: &[&str],
    ) -> Result<(), ShellError> {
        self.execute(cancel, program, args, false)
            .await?
            .into_result(program)
            .map(|_| ())
    }

    /// Run `program` and return its standard output, trimmed.
    ///
    /// Standard error still goes to the writer, and is kept in the
    /// [`ExitError`] if the program fails.
    pub async fn run_and_capture(
        &self,
        cancel: &CancellationToken,
        program: &str,
        args: &[&str],
    ) -> Result<String, ShellError> {
        let outcome = self
            .execute(cancel, program, args, true)
            .await?
            .into_result(program)?;
        let stdout = outcome.stdout.unwrap_or_default();
        Ok(String::from_utf8_lossy(&stdout).trim().to_string())
    }

    /// Run `program` to completion and describe how it ended.
    ///
    /// A non-zero exit is an `Ok` outcome here; only failures to start,
    /// pre-start cancellation, and I/O problems are errors.
    pub async fn execute(
        &self,
        cancel: &CancellationToken,
        program: &str,
        args: &[&str],
        capture: bool,
    ) -> Result<ExecutionOutcome, ShellError> {
        if cancel.is_cancelled() {
            return Err(ShellError::Cancelled {
                program: program.to_string(),
            });
        }
        let resolved = self
            .absolute_path(program)
            .map_err(|source| ShellError::Start {
                program: program.to_string(),
                source,
            })?;
        let stdin = self.take_stdin();

        let interrupt = self.interrupt.begin();
        let _active = Active(&self.interrupt);

        let started = Instant::now();
        let mut outcome = if self.pty {
            self.execute_pty(program, &resolved, args, stdin, capture, cancel, &interrupt)
                .await?
        } else {
            self.execute_piped(program, &resolved, args, stdin, capture, cancel, &interrupt)
                .await?
        };
        outcome.elapsed = started.elapsed();

        tracing::debug!(
            program,
            exit_code = outcome.exit_code,
            signaled = outcome.signaled,
            elapsed = %format_duration(round(outcome.elapsed)),
            "process finished"
        );
        Ok(outcome)
    }

    #[allow(clippy::too_many_arguments)]
    async fn execute_piped(
        &self,
        program: &str,
        resolved: &Path,
        args: &[&str],
        stdin: Option<Box<dyn Read + Send>>,
        capture: bool,
        cancel: &CancellationToken,
        interrupt: &CancellationToken,
    ) -> Result<ExecutionOutcome, ShellError> {
        let mut cmd = Command::new(resolved);
        cmd.args(args)
            .current_dir(&self.wd)
            .env_clear()
            .envs(self.env.iter())
            .stdin(if stdin.is_some() {
                Stdio::piped()
            } else {
                Stdio::null()
            })
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);
        process::prepare(&mut cmd);

        let mut child = cmd.spawn().map_err(|source| ShellError::Start {
            program: program.to_string(),
            source,
        })?;
        let pid = child.id();
        tracing::debug!(program, pid, "spawned");

        if let (Some(reader), Some(pipe)) = (stdin, child.stdin.take()) {
            feed_stdin(reader, pipe);
        }

        let stdout_capture = capture.then(CaptureBuffer::new);
        let stderr_capture = capture.then(CaptureBuffer::new);

        let stdout_target: Box<dyn Write + Send> = match &stdout_capture {
            Some(buf) => Box::new(buf.clone()),
            None => Box::new(self.writer.clone()),
        };
        let mut stderr_targets: Vec<Box<dyn Write + Send>> = vec![Box::new(self.writer.clone())];
        if let Some(buf) = &stderr_capture {
            stderr_targets.push(Box::new(buf.clone()));
        }

        let pumps = [
            child.stdout.take().map(|out| pump(out, stdout_target)),
            child
                .stderr
                .take()
                .map(|err| pump(err, Box::new(Tee::new(stderr_targets)))),
        ];

        let status = self
            .supervise(
                program,
                pid,
                async { child.wait().await.map(RawExit::from) },
                cancel,
                interrupt,
            )
            .await?;

        for handle in pumps.into_iter().flatten() {
            handle.await.map_err(io::Error::other)??;
        }

        Ok(ExecutionOutcome {
            exit_code: status.code,
            signaled: status.signaled,
            elapsed: Duration::ZERO,
            stdout: stdout_capture.map(|buf| buf.contents()),
            stderr: stderr_capture.map(|buf| buf.contents()),
        })
    }

    #[allow(clippy::too_many_arguments)]
    async fn execute_pty(
        &self,
        program: &str,
        resolved: &Path,
        args: &[&str],
        stdin: Option<Box<dyn Read + Send>>,
        capture: bool,
        cancel: &CancellationToken,
        interrupt: &CancellationToken,
    ) -> Result<ExecutionOutcome, ShellError> {
        let capture_buf = capture.then(CaptureBuffer::new);
        let output: Box<dyn Write + Send> = match &capture_buf {
            Some(buf) => Box::new(buf.clone()),
            None => Box::new(self.writer.clone()),
        };

        let child = pty::spawn(resolved, args, &self.wd, &self.env, output, stdin).map_err(
            |source| ShellError::Start {
                program: program.to_string(),
                source,
            },
        )?;
        let pid = child.pid;
        tracing::debug!(program, pid, "spawned on pty");

        let status = self
            .supervise(program, pid, child.wait(), cancel, interrupt)
            .await?;

        Ok(ExecutionOutcome {
            exit_code: status.code,
            signaled: status.signaled,
            elapsed: Duration::ZERO,
            stdout: capture_buf.map(|buf| buf.contents()),
            stderr: None,
        })
    }

    /// Wait for `wait` to finish, stopping the process group if the
    /// invocation is cancelled or interrupted first.
    async fn supervise<F>(
        &self,
        program: &str,
        pid: Option<u32>,
        wait: F,
        cancel: &CancellationToken,
        interrupt: &CancellationToken,
    ) -> Result<RawExit, ShellError>
    where
        F: Future<Output = io::Result<RawExit>>,
    {
        tokio::pin!(wait);

        let stop = tokio::select! {
            biased;
            status = &mut wait => return Ok(status?),
            _ = cancel.cancelled() => StopSignal::Terminate,
            _ = interrupt.cancelled() => StopSignal::Interrupt,
        };

        let stopped = RawExit {
            code: SIGNALED_EXIT_CODE,
            signaled: true,
        };
        let Some(pid) = pid else {
            wait.await?;
            return Ok(stopped);
        };

        tracing::debug!(program, pid, signal = %stop, "stopping process group");
        process::signal(pid, stop).map_err(|source| ShellError::Terminate {
            program: program.to_string(),
            source,
        })?;

        if tokio::time::timeout(self.signal_grace_period, &mut wait)
            .await
            .is_err()
        {
            self.logger.warning(&format!(
                "{program} did not exit within {}, killing it",
                format_duration(self.signal_grace_period)
            ));
            process::force_kill(pid).map_err(|source| ShellError::Terminate {
                program: program.to_string(),
                source,
            })?;
            wait.await?;
        }
        Ok(stopped)
    }

    fn write_prompt(&self, program: &str, args: &[&str]) -> Result<(), ShellError> {
        let mut line = format!("{} {}", self.prompt.symbol(), quote(program));
        for arg in args {
            line.push(' ');
            line.push_str(&quote(arg));
        }
        line.push('\n');
        let mut writer = self.writer.clone();
        writer.write_all(line.as_bytes())?;
        writer.flush()?;
        Ok(())
    }

    fn take_stdin(&self) -> Option<Box<dyn Read + Send>> {
        match self.stdin.lock() {
            Ok(mut slot) => slot.take(),
            Err(poisoned) => poisoned.into_inner().take(),
        }
    }
}

impl Clone for Shell {
    fn clone(&self) -> Self {
        Self {
            wd: self.wd.clone(),
            env: self.env.clone(),
            writer: self.writer.clone(),
            logger: Arc::clone(&self.logger),
            pty: self.pty,
            signal_grace_period: self.signal_grace_period,
            prompt: self.prompt,
            stdin: Mutex::new(None),
            interrupt: InterruptHandle::default(),
        }
    }
}

impl std::fmt::Debug for Shell {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Shell")
            .field("wd", &self.wd)
            .field("env", &self.env.len())
            .field("pty", &self.pty)
            .field("signal_grace_period", &self.signal_grace_period)
            .field("prompt", &self.prompt)
            .finish_non_exhaustive()
    }
}

fn quote(arg: &str) -> Cow<'_, str> {
    shlex::try_quote(arg).unwrap_or(Cow::Borrowed(arg))
}

fn pump<R>(mut src: R, mut dst: Box<dyn Write + Send>) -> JoinHandle<io::Result<()>>
where
    R: AsyncRead + Unpin + Send + 'static,
{
    tokio::spawn(async move {
        let mut buf = vec![0u8; 8192];
        loop {
            let n = src.read(&mut buf).await?;
            if n == 0 {
                break;
            }
            dst.write_all(&buf[..n])?;
        }
        dst.flush()
    })
}

/// Copy `reader` into the child's stdin, closing it at EOF.
///
/// The reader may block, so it is drained on its own thread.
fn feed_stdin(mut reader: Box<dyn Read + Send>, mut pipe: ChildStdin) {
    let (tx, mut rx) = tokio::sync::mpsc::channel::<Vec<u8>>(16);
    std::thread::spawn(move || {
        let mut buf = vec![0u8; 8192];
        loop {
            match reader.read(&mut buf) {
                Ok(0) => break,
                Ok(n) => {
                    if tx.blocking_send(buf[..n].to_vec()).is_err() {
                        break;
                    }
                }
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => {
                    tracing::debug!(error = %e, "stdin reader failed");
                    break;
                }
            }
        }
    });
    tokio::spawn(async move {
        while let Some(chunk) = rx.recv().await {
            if pipe.write_all(&chunk).await.is_err() {
                break;
            }
        }
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    fn shell_in(dir: &Path) -> Shell {
        Shell::with_dir_and_env(dir.to_path_buf(), Environment::from_process())
            .with_logger(DiscardLogger)
    }

    #[test]
    fn prompt_symbols() {
        assert_eq!(PromptStyle::Posix.symbol(), "$");
        assert_eq!(PromptStyle::Windows.symbol(), ">");
    }

    #[test]
    fn prompt_quotes_arguments() {
        let capture = CaptureBuffer::new();
        let sh = shell_in(Path::new("/"))
            .with_prompt_style(PromptStyle::Posix)
            .with_writer(OutputSink::new(capture.clone()));
        sh.write_prompt("git", &["commit", "-m", "two words"]).unwrap();
        assert_eq!(capture.contents_string(), "$ git commit -m 'two words'\n");
    }

    #[test]
    fn windows_prompt() {
        let capture = CaptureBuffer::new();
        let sh = shell_in(Path::new("/"))
            .with_prompt_style(PromptStyle::Windows)
            .with_writer(OutputSink::new(capture.clone()));
        sh.write_prompt("git", &["status"]).unwrap();
        assert_eq!(capture.contents_string(), "> git status\n");
    }

    #[test]
    fn chdir_resolves_relative_to_own_wd() {
        let temp = tempfile::TempDir::new().unwrap();
        fs::create_dir_all(temp.path().join("a/b")).unwrap();
        let before = std::env::current_dir().unwrap();

        let mut sh = shell_in(temp.path());
        sh.chdir("a").unwrap();
        sh.chdir("b").unwrap();
        assert_eq!(sh.getwd(), temp.path().join("a/b"));
        let expected = temp.path().join("a/b").to_string_lossy().into_owned();
        assert_eq!(sh.env().get("PWD"), Some(expected.as_str()));
        assert_eq!(std::env::current_dir().unwrap(), before);
    }

    #[test]
    fn chdir_rejects_missing_and_files() {
        let temp = tempfile::TempDir::new().unwrap();
        fs::write(temp.path().join("file"), "").unwrap();
        let mut sh = shell_in(temp.path());
        assert!(matches!(sh.chdir("missing"), Err(ShellError::Chdir { .. })));
        assert!(matches!(sh.chdir("file"), Err(ShellError::Chdir { .. })));
        assert_eq!(sh.getwd(), temp.path());
    }

    #[test]
    fn clones_have_independent_state() {
        let mut a = shell_in(Path::new("/"));
        a.env_mut().set("ONLY_IN_A", "1");
        let b = a.clone();
        a.env_mut().set("ONLY_IN_A", "2");
        assert_eq!(b.env().get("ONLY_IN_A"), Some("1"));
        assert!(!b.interrupt());
    }

    #[test]
    fn interrupt_without_process_is_noop() {
        let sh = shell_in(Path::new("/"));
        assert!(!sh.interrupt_handle().interrupt());
    }

    #[test]
    fn absolute_path_uses_own_path() {
        let temp = tempfile::TempDir::new().unwrap();
        let mut sh = shell_in(temp.path());
        sh.env_mut().set("PATH", temp.path().join("empty").to_string_lossy());
        assert!(sh.absolute_path("sh").is_err());
    }

    #[test]
    fn absolute_path_with_separator_joins_wd() {
        let sh = shell_in(Path::new("/work"));
        assert_eq!(
            sh.absolute_path("./build.sh").unwrap(),
            Path::new("/work/./build.sh")
        );
    }

    #[test]
    fn outcome_into_result() {
        let ok = ExecutionOutcome {
            exit_code: 0,
            signaled: false,
            elapsed: Duration::ZERO,
            stdout: None,
            stderr: None,
        };
        assert!(ok.clone().into_result("true").is_ok());

        let failed = ExecutionOutcome {
            exit_code: 2,
            stderr: Some(b"boom".to_vec()),
            ..ok
        };
        match failed.into_result("false") {
            Err(ShellError::Exit(e)) => {
                assert_eq!(e.code, 2);
                assert_eq!(e.stderr, "boom");
                assert!(!e.signaled);
            }
            other => panic!("expected exit error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn pre_cancelled_never_spawns() {
        let sh = shell_in(Path::new("/"));
        let cancel = CancellationToken::new();
        cancel.cancel();
        let err = sh
            .run_without_prompt(&cancel, "definitely-not-a-program", &[])
            .await
            .unwrap_err();
        assert!(err.is_cancelled());
        assert!(!is_exit_signaled(&err));
    }

    #[tokio::test]
    async fn missing_program_is_start_failure() {
        let sh = shell_in(Path::new("/"));
        let err = sh
            .run_without_prompt(&CancellationToken::new(), "asdasdasdasdzxczxczxzxc", &[])
            .await
            .unwrap_err();
        assert!(matches!(err, ShellError::Start { .. }));
        assert_eq!(get_exit_code(&err), 127);
    }
}
