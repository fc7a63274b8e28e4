//! git::mirror
//!
//! Shared bare mirrors that checkouts borrow objects from.
//!
//! Several jobs on one host may want the same mirror at once, so every
//! update happens under a [`FileLock`] on `<mirror>.clonelock`.

use std::fs;
use std::path::{Path, PathBuf};

use tokio_util::sync::CancellationToken;

use super::runner::ShellRunner;
use super::{ops, GitError};
use crate::core::config::GitConfig;
use crate::lock::FileLock;

/// The mirror directory for `repo` under `mirrors_path`.
///
/// Every character that is not ASCII alphanumeric becomes `-`.
pub fn mirror_dir_for(mirrors_path: &Path, repo: &str) -> PathBuf {
    let name: String = repo
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '-' })
        .collect();
    mirrors_path.join(name)
}

fn clone_lock_path(mirror: &Path) -> PathBuf {
    let mut os = mirror.as_os_str().to_owned();
    os.push(".clonelock");
    PathBuf::from(os)
}

/// Create or refresh the mirror of `repo`, returning its path.
///
/// A missing mirror is cloned with `git clone --mirror`. An existing one is
/// fetched unless `mirrors_skip_update` is set.
pub async fn ensure_mirror<R: ShellRunner + ?Sized>(
    cancel: &CancellationToken,
    sh: &R,
    locks: &FileLock,
    config: &GitConfig,
    repo: &str,
) -> Result<PathBuf, GitError> {
    let mirrors_path = config
        .mirrors_path
        .as_deref()
        .ok_or(GitError::MirrorsDisabled)?;
    fs::create_dir_all(mirrors_path).map_err(|source| GitError::MirrorDir {
        path: mirrors_path.to_path_buf(),
        source,
    })?;

    let mirror = mirror_dir_for(mirrors_path, repo);
    let mut lock = locks
        .lock(cancel, &clone_lock_path(&mirror), config.mirrors_lock_timeout)
        .await?;

    let mirror_str = mirror.to_string_lossy();
    if !mirror.exists() {
        tracing::debug!(repo, mirror = %mirror.display(), "cloning mirror");
        let flags = format!("--mirror {}", config.clone_mirror_flags);
        if let Err(e) = ops::clone(cancel, sh, &flags, repo, &mirror_str).await {
            // A half-written mirror would be mistaken for a good one next time.
            if mirror.exists() {
                if let Err(rm) = fs::remove_dir_all(&mirror) {
                    tracing::warn!(
                        mirror = %mirror.display(),
                        error = %rm,
                        "failed to remove partial mirror"
                    );
                }
            }
            return Err(e);
        }
    } else if !config.mirrors_skip_update {
        tracing::debug!(repo, mirror = %mirror.display(), "updating mirror");
        let mut args = vec!["--git-dir", mirror_str.as_ref(), "fetch"];
        args.extend(config.fetch_flags.split_whitespace());
        args.extend(["--", "origin"]);
        sh.run(cancel, "git", &args).await?;
    } else {
        tracing::debug!(mirror = %mirror.display(), "using existing mirror without update");
    }

    lock.release()?;
    Ok(mirror)
}
