//! lock
//!
//! Cross-process advisory file locks with bounded retry.
//!
//! # Strategies
//!
//! - [`LockStrategy::Marker`] creates the lock path with exclusive-create
//!   semantics and writes the holder's pid into it. The file existing is
//!   the lock. A marker left behind by a pid that no longer exists is
//!   removed on the next attempt (POSIX only). Removal happens under an OS
//!   lock on `<path>.reclaim`, which is left on disk.
//! - [`LockStrategy::Flock`] takes an OS advisory lock on `<path>f`. The
//!   file stays on disk after release; holding the OS lock is the lock.
//!
//! Participants only exclude each other when they use the same strategy and
//! path.
//!
//! # Retry
//!
//! [`FileLock::lock`] polls at the configured interval until it acquires the
//! lock, the timeout elapses ([`LockError::Timeout`]), or the cancellation
//! token fires ([`LockError::Cancelled`]). Time is read from a [`Clock`] so
//! tests can drive the loop without sleeping.
//!
//! # Example
//!
//! ```no_run
//! use std::path::Path;
//! use std::time::Duration;
//! use jobshell::core::config::LockConfig;
//! use jobshell::lock::FileLock;
//! use tokio_util::sync::CancellationToken;
//!
//! # async fn demo() -> Result<(), jobshell::lock::LockError> {
//! let locks = FileLock::new(&LockConfig::default());
//! let cancel = CancellationToken::new();
//! let mut handle = locks
//!     .lock(&cancel, Path::new("/var/lib/mirrors/repo.clonelock"), Duration::from_secs(300))
//!     .await?;
//! // ... update the mirror ...
//! handle.release()?;
//! # Ok(())
//! # }
//! ```

pub mod clock;

pub use clock::{Clock, ManualClock, SystemClock};

use std::ffi::OsString;
use std::fs::{self, File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use fs2::FileExt;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio_util::sync::CancellationToken;

use crate::core::config::LockConfig;
use crate::core::duration::format_duration;
use crate::shell::process;

/// Errors from locking operations.
#[derive(Debug, Error)]
pub enum LockError {
    /// The lock was still held by someone else when the timeout elapsed.
    #[error("timed out after {} waiting for lock on {}", format_duration(*timeout), path.display())]
    Timeout { path: PathBuf, timeout: Duration },

    /// The wait was cancelled.
    #[error("cancelled while waiting for lock on {}", path.display())]
    Cancelled { path: PathBuf },

    /// I/O error creating, locking, or removing the lock artifact.
    #[error("lock i/o error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl LockError {
    fn io(path: &Path, source: io::Error) -> Self {
        LockError::Io {
            path: path.to_path_buf(),
            source,
        }
    }
}

/// How exclusion is implemented on disk.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LockStrategy {
    /// Exclusive-create marker file at the lock path.
    #[default]
    Marker,
    /// OS advisory lock on the lock path suffixed with `f`.
    Flock,
}

impl LockStrategy {
    /// The file that actually represents the lock for `path`.
    pub fn artifact_path(self, path: &Path) -> PathBuf {
        match self {
            LockStrategy::Marker => path.to_path_buf(),
            LockStrategy::Flock => {
                let mut os: OsString = path.as_os_str().to_owned();
                os.push("f");
                PathBuf::from(os)
            }
        }
    }
}

impl std::fmt::Display for LockStrategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LockStrategy::Marker => f.write_str("marker"),
            LockStrategy::Flock => f.write_str("flock"),
        }
    }
}

impl FromStr for LockStrategy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "marker" => Ok(LockStrategy::Marker),
            "flock" => Ok(LockStrategy::Flock),
            other => Err(format!(
                "unknown lock strategy '{other}' (expected 'marker' or 'flock')"
            )),
        }
    }
}

/// Acquires locks with one strategy and retry interval.
#[derive(Debug, Clone)]
pub struct FileLock {
    strategy: LockStrategy,
    poll_interval: Duration,
    clock: Arc<dyn Clock>,
}

impl FileLock {
    pub fn new(config: &LockConfig) -> Self {
        Self {
            strategy: config.strategy,
            poll_interval: config.poll_interval,
            clock: Arc::new(SystemClock),
        }
    }

    /// Use `clock` for deadlines and retry sleeps.
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn strategy(&self) -> LockStrategy {
        self.strategy
    }

    /// Make one attempt to take the lock.
    ///
    /// Returns `Ok(None)` if someone else holds it.
    pub fn try_lock(&self, path: &Path) -> Result<Option<LockHandle>, LockError> {
        let artifact = self.strategy.artifact_path(path);
        if let Some(parent) = artifact.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| LockError::io(parent, e))?;
        }

        let held = match self.strategy {
            LockStrategy::Marker => try_marker(&artifact)?,
            LockStrategy::Flock => try_flock(&artifact)?,
        };
        Ok(held.map(|state| {
            tracing::debug!(path = %artifact.display(), strategy = %self.strategy, "lock acquired");
            LockHandle {
                path: artifact,
                acquired_at: Utc::now(),
                state: Some(state),
            }
        }))
    }

    /// Take the lock, retrying until `timeout` elapses or `cancel` fires.
    pub async fn lock(
        &self,
        cancel: &CancellationToken,
        path: &Path,
        timeout: Duration,
    ) -> Result<LockHandle, LockError> {
        // A timeout past what `Instant` can represent never expires.
        let deadline = self.clock.now().checked_add(timeout);
        let mut attempts = 0u32;

        loop {
            if cancel.is_cancelled() {
                return Err(LockError::Cancelled {
                    path: path.to_path_buf(),
                });
            }

            attempts += 1;
            if let Some(handle) = self.try_lock(path)? {
                return Ok(handle);
            }

            let remaining = deadline.map(|d| d.saturating_duration_since(self.clock.now()));
            if remaining == Some(Duration::ZERO) {
                tracing::debug!(path = %path.display(), attempts, "lock wait timed out");
                return Err(LockError::Timeout {
                    path: path.to_path_buf(),
                    timeout,
                });
            }
            if attempts == 1 {
                tracing::debug!(path = %path.display(), "lock is held, waiting");
            }

            let wait = remaining.map_or(self.poll_interval, |r| self.poll_interval.min(r));
            tokio::select! {
                _ = cancel.cancelled() => {
                    return Err(LockError::Cancelled {
                        path: path.to_path_buf(),
                    });
                }
                _ = self.clock.sleep(wait) => {}
            }
        }
    }
}

#[derive(Debug)]
enum Held {
    Marker,
    Flock(File),
}

fn try_marker(path: &Path) -> Result<Option<Held>, LockError> {
    match create_marker(path) {
        Ok(held) => Ok(Some(held)),
        Err(e) if e.kind() == io::ErrorKind::AlreadyExists => {
            if remove_stale_marker(path)? {
                match create_marker(path) {
                    Ok(held) => Ok(Some(held)),
                    Err(e) if e.kind() == io::ErrorKind::AlreadyExists => Ok(None),
                    Err(e) => Err(LockError::io(path, e)),
                }
            } else {
                Ok(None)
            }
        }
        Err(e) => Err(LockError::io(path, e)),
    }
}

fn create_marker(path: &Path) -> io::Result<Held> {
    create_marker_with(path, |file| writeln!(file, "{}", std::process::id()))
}

/// Exclusively create the marker and fill it with `write_pid`.
///
/// A marker whose pid could not be written is removed again.
fn create_marker_with(
    path: &Path,
    write_pid: impl FnOnce(&mut File) -> io::Result<()>,
) -> io::Result<Held> {
    let mut file = OpenOptions::new().write(true).create_new(true).open(path)?;
    if let Err(e) = write_pid(&mut file).and_then(|()| file.sync_data()) {
        drop(file);
        if let Err(remove) = fs::remove_file(path) {
            tracing::warn!(
                path = %path.display(),
                error = %remove,
                "failed to remove partial lock"
            );
        }
        return Err(e);
    }
    Ok(Held::Marker)
}

/// Sidecar flocked while a stale marker is checked and removed.
fn reclaim_guard_path(path: &Path) -> PathBuf {
    let mut os: OsString = path.as_os_str().to_owned();
    os.push(".reclaim");
    PathBuf::from(os)
}

/// Remove a marker whose owner is gone. Returns whether it was removed.
///
/// Reclaimers serialize on a flocked sidecar and re-read the marker under
/// it, so a marker recreated by another reclaimer is never deleted. A
/// marker without a readable pid may be mid-creation and is left alone.
fn remove_stale_marker(path: &Path) -> Result<bool, LockError> {
    let guard_path = reclaim_guard_path(path);
    let guard = OpenOptions::new()
        .read(true)
        .write(true)
        .create(true)
        .truncate(false)
        .open(&guard_path)
        .map_err(|e| LockError::io(&guard_path, e))?;
    match FileExt::try_lock_exclusive(&guard) {
        Ok(()) => {}
        Err(e)
            if e.kind() == io::ErrorKind::WouldBlock
                || e.raw_os_error() == fs2::lock_contended_error().raw_os_error() =>
        {
            // Someone else is reclaiming; retry on the next attempt.
            return Ok(false);
        }
        Err(e) => return Err(LockError::io(&guard_path, e)),
    }

    let contents = match fs::read_to_string(path) {
        Ok(contents) => contents,
        // Released between our attempt and this read.
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(true),
        Err(e) => return Err(LockError::io(path, e)),
    };
    let Ok(pid) = contents.trim().parse::<u32>() else {
        return Ok(false);
    };
    if process::pid_alive(pid) {
        return Ok(false);
    }
    tracing::debug!(path = %path.display(), pid, "removing stale lock");
    let removed = match fs::remove_file(path) {
        Ok(()) => Ok(true),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(true),
        Err(e) => Err(LockError::io(path, e)),
    };
    if let Err(e) = FileExt::unlock(&guard) {
        tracing::debug!(path = %guard_path.display(), error = %e, "reclaim guard unlock failed");
    }
    removed
}

fn try_flock(path: &Path) -> Result<Option<Held>, LockError> {
    let file = OpenOptions::new()
        .read(true)
        .write(true)
        .create(true)
        .truncate(false)
        .open(path)
        .map_err(|e| LockError::io(path, e))?;

    match FileExt::try_lock_exclusive(&file) {
        Ok(()) => Ok(Some(Held::Flock(file))),
        Err(e)
            if e.kind() == io::ErrorKind::WouldBlock
                || e.raw_os_error() == fs2::lock_contended_error().raw_os_error() =>
        {
            Ok(None)
        }
        Err(e) => Err(LockError::io(path, e)),
    }
}

/// A held lock. Released on [`LockHandle::release`] or drop.
#[derive(Debug)]
pub struct LockHandle {
    path: PathBuf,
    acquired_at: DateTime<Utc>,
    state: Option<Held>,
}

impl LockHandle {
    /// The on-disk artifact representing the lock.
    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn acquired_at(&self) -> DateTime<Utc> {
        self.acquired_at
    }

    pub fn is_held(&self) -> bool {
        self.state.is_some()
    }

    /// Release the lock. Releasing again does nothing.
    pub fn release(&mut self) -> Result<(), LockError> {
        match self.state.take() {
            None => Ok(()),
            Some(Held::Marker) => match fs::remove_file(&self.path) {
                Ok(()) => Ok(()),
                Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
                Err(e) => Err(LockError::io(&self.path, e)),
            },
            Some(Held::Flock(file)) => {
                FileExt::unlock(&file).map_err(|e| LockError::io(&self.path, e))
            }
        }
    }
}

impl Drop for LockHandle {
    fn drop(&mut self) {
        if let Err(e) = self.release() {
            tracing::warn!(error = %e, "failed to release lock");
        }
    }
}
