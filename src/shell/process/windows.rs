//! shell::process::windows
//!
//! Tree termination through `taskkill`.

use std::io;
use std::process::{Command, Stdio};

use super::StopSignal;

const CREATE_NEW_PROCESS_GROUP: u32 = 0x0000_0200;

pub(super) fn prepare(cmd: &mut tokio::process::Command) {
    cmd.creation_flags(CREATE_NEW_PROCESS_GROUP);
}

pub(super) fn signal(pid: u32, _stop: StopSignal) -> io::Result<()> {
    taskkill(pid, false)
}

pub(super) fn force_kill(pid: u32) -> io::Result<()> {
    taskkill(pid, true)
}

pub(super) fn pid_alive(_pid: u32) -> bool {
    true
}

fn taskkill(pid: u32, force: bool) -> io::Result<()> {
    let mut cmd = Command::new("taskkill");
    cmd.arg("/T");
    if force {
        cmd.arg("/F");
    }
    let pid = pid.to_string();
    let status = cmd
        .args(["/PID", pid.as_str()])
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()?;
    // 128: no such process.
    if status.success() || status.code() == Some(128) {
        Ok(())
    } else {
        Err(io::Error::other(format!("taskkill exited with {status}")))
    }
}
