//! lock command - Run a program while holding a file lock

use std::io::Write;
use std::path::Path;
use std::time::Duration;

use anyhow::Result;

use super::split_command;
use crate::cli::Context;
use crate::core::duration::{format_duration, round};
use crate::lock::{FileLock, LockStrategy};

/// Hold the lock on `path` for the duration of `command`.
///
/// `acquired <path>` is printed to stdout and flushed as soon as the lock
/// is held, so another process can wait for it.
pub async fn lock(
    ctx: &Context,
    path: &Path,
    timeout: Duration,
    strategy: Option<LockStrategy>,
    command: &[String],
) -> Result<()> {
    let (program, args) = split_command(command)?;
    let sh = ctx.shell()?;

    let mut config = ctx.config.lock.clone();
    if let Some(strategy) = strategy {
        config.strategy = strategy;
    }
    let locks = FileLock::new(&config);

    let mut handle = locks.lock(&ctx.cancel, path, timeout).await?;
    {
        let mut stdout = std::io::stdout().lock();
        writeln!(stdout, "acquired {}", path.display())?;
        stdout.flush()?;
    }

    let result = sh.run_without_prompt(&ctx.cancel, program, &args).await;

    let held = chrono::Utc::now() - handle.acquired_at();
    let held = held.to_std().unwrap_or_default();
    tracing::debug!(path = %path.display(), held = %format_duration(round(held)), "releasing lock");
    handle.release()?;

    result?;
    Ok(())
}
