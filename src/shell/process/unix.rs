//! shell::process::unix
//!
//! Process-group signalling with `killpg(2)`.

use std::io;

use nix::errno::Errno;
use nix::sys::signal::{kill, killpg, Signal};
use nix::unistd::Pid;

use super::StopSignal;

pub(super) fn prepare(cmd: &mut tokio::process::Command) {
    cmd.process_group(0);
}

pub(super) fn signal(pid: u32, stop: StopSignal) -> io::Result<()> {
    let sig = match stop {
        StopSignal::Interrupt => Signal::SIGINT,
        StopSignal::Terminate => Signal::SIGTERM,
    };
    send(pid, sig)
}

pub(super) fn force_kill(pid: u32) -> io::Result<()> {
    send(pid, Signal::SIGKILL)
}

pub(super) fn pid_alive(pid: u32) -> bool {
    let Ok(pid) = to_pid(pid) else {
        return false;
    };
    match kill(pid, None) {
        Ok(()) => true,
        // Exists but owned by someone else.
        Err(Errno::EPERM) => true,
        Err(_) => false,
    }
}

fn send(pid: u32, sig: Signal) -> io::Result<()> {
    let pgid = to_pid(pid)?;
    match killpg(pgid, sig) {
        Ok(()) | Err(Errno::ESRCH) => Ok(()),
        Err(e) => Err(io::Error::from_raw_os_error(e as i32)),
    }
}

fn to_pid(pid: u32) -> io::Result<Pid> {
    let raw = i32::try_from(pid).map_err(|_| {
        io::Error::new(io::ErrorKind::InvalidInput, format!("pid {pid} out of range"))
    })?;
    if raw <= 0 {
        return Err(io::Error::new(
            io::ErrorKind::InvalidInput,
            format!("refusing to signal pid {raw}"),
        ));
    }
    Ok(Pid::from_raw(raw))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn own_pid_is_alive() {
        assert!(pid_alive(std::process::id()));
    }

    #[test]
    fn zero_pid_is_refused() {
        assert!(signal(0, StopSignal::Terminate).is_err());
        assert!(!pid_alive(0));
    }

    #[test]
    fn out_of_range_pid_is_refused() {
        assert!(force_kill(u32::MAX).is_err());
    }
}
