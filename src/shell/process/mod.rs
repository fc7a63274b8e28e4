//! shell::process
//!
//! Platform process control.
//!
//! Every child is started as the leader of its own process group (a new
//! process group on Windows) so that signals reach the whole tree it spawns.
//! The runner only talks to this interface:
//!
//! - [`prepare`] configures a command before spawning
//! - [`signal`] asks the process group to stop
//! - [`force_kill`] kills the process group unconditionally
//! - [`pid_alive`] checks whether a pid still exists
//!
//! A process group that has already gone away is not an error.

#[cfg(unix)]
mod unix;
#[cfg(unix)]
use unix as imp;

#[cfg(windows)]
mod windows;
#[cfg(windows)]
use windows as imp;

use std::io;

/// How the runner asks a process to stop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopSignal {
    /// An explicit interrupt from [`InterruptHandle`](super::InterruptHandle).
    Interrupt,
    /// Cancellation of the invocation.
    Terminate,
}

impl std::fmt::Display for StopSignal {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StopSignal::Interrupt => f.write_str("interrupt"),
            StopSignal::Terminate => f.write_str("terminate"),
        }
    }
}

/// Configure `cmd` so the child leads its own process group.
pub fn prepare(cmd: &mut tokio::process::Command) {
    imp::prepare(cmd);
}

/// Deliver `stop` to the process group led by `pid`.
pub fn signal(pid: u32, stop: StopSignal) -> io::Result<()> {
    imp::signal(pid, stop)
}

/// Kill the process group led by `pid`.
pub fn force_kill(pid: u32) -> io::Result<()> {
    imp::force_kill(pid)
}

/// Whether a process with this pid exists.
///
/// Platforms without a cheap check report `true`.
pub fn pid_alive(pid: u32) -> bool {
    imp::pid_alive(pid)
}
