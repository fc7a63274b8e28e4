//! shell::pty
//!
//! Running a child attached to a pseudo-terminal.
//!
//! The child sees a terminal on stdin, stdout, and stderr, so its two output
//! streams arrive merged on the master side. The terminal translates `\n`
//! into `\r\n`.

use std::io::{self, Read, Write};
use std::path::Path;

use portable_pty::{native_pty_system, Child, CommandBuilder, PtySize};
use tokio::task::JoinHandle;

use super::env::Environment;
use super::{RawExit, SIGNALED_EXIT_CODE};

/// A spawned PTY child and the task draining its output.
pub(super) struct PtyProcess {
    pub pid: Option<u32>,
    child: Box<dyn Child + Send + Sync>,
    output: JoinHandle<()>,
}

/// Spawn `program` on a fresh pseudo-terminal, copying everything it
/// prints into `output` and feeding `stdin` (if any) into its terminal.
pub(super) fn spawn(
    program: &Path,
    args: &[&str],
    wd: &Path,
    env: &Environment,
    mut output: Box<dyn Write + Send>,
    stdin: Option<Box<dyn Read + Send>>,
) -> io::Result<PtyProcess> {
    let pair = native_pty_system()
        .openpty(PtySize {
            rows: 24,
            cols: 80,
            pixel_width: 0,
            pixel_height: 0,
        })
        .map_err(io::Error::other)?;

    let mut cmd = CommandBuilder::new(program);
    cmd.args(args);
    cmd.cwd(wd);
    cmd.env_clear();
    for (name, value) in env.iter() {
        cmd.env(name, value);
    }

    let child = pair.slave.spawn_command(cmd).map_err(io::Error::other)?;
    // Our copy of the slave must go, or the master never reports EOF.
    drop(pair.slave);
    let pid = child.process_id();

    let mut reader = pair.master.try_clone_reader().map_err(io::Error::other)?;

    if let Some(mut input) = stdin {
        let mut writer = pair.master.take_writer().map_err(io::Error::other)?;
        std::thread::spawn(move || {
            if let Err(e) = io::copy(&mut input, &mut writer) {
                tracing::debug!(error = %e, "pty stdin copy ended");
            }
        });
    }

    let output = tokio::task::spawn_blocking(move || {
        // Keeps the master open until the child side closes.
        let _master = pair.master;
        let mut buf = [0u8; 8192];
        loop {
            match reader.read(&mut buf) {
                Ok(0) => break,
                Ok(n) => {
                    if let Err(e) = output.write_all(&buf[..n]) {
                        tracing::debug!(error = %e, "dropping pty output");
                    }
                }
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                // Linux reports EIO once the last slave descriptor closes.
                Err(_) => break,
            }
        }
        let _ = output.flush();
    });

    Ok(PtyProcess { pid, child, output })
}

impl PtyProcess {
    /// Wait for the child to exit, then for its output to drain.
    pub async fn wait(self) -> io::Result<RawExit> {
        let PtyProcess {
            mut child, output, ..
        } = self;
        let status = tokio::task::spawn_blocking(move || child.wait())
            .await
            .map_err(io::Error::other)??;
        output.await.map_err(io::Error::other)?;
        let signaled = status.signal().is_some();
        let code = if signaled {
            SIGNALED_EXIT_CODE
        } else {
            i32::try_from(status.exit_code()).unwrap_or(i32::MAX)
        };
        Ok(RawExit { code, signaled })
    }
}
