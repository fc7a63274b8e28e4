//! git commands
//!
//! Thin wrappers over [`crate::git::Git`] using the `[git]` configuration.

use std::time::Duration;

use anyhow::{Context as _, Result};

use crate::cli::Context;
use crate::core::url::parse_gittable_url;
use crate::git::{ensure_mirror, Git};

/// Check out `reference` with the configured flags.
pub async fn checkout(ctx: &Context, reference: &str) -> Result<()> {
    let sh = ctx.shell()?;
    Git::new(&sh, &ctx.config.git)
        .checkout(&ctx.cancel, reference)
        .await
        .with_context(|| format!("checkout of {reference} failed"))
}

/// Clone `repo` into `dir` with the configured flags.
pub async fn clone(ctx: &Context, repo: &str, dir: &str) -> Result<()> {
    let sh = ctx.shell()?;
    Git::new(&sh, &ctx.config.git)
        .clone(&ctx.cancel, repo, dir)
        .await
        .with_context(|| format!("clone of {repo} failed"))
}

/// Clean the checkout and, when enabled, its submodules.
pub async fn clean(ctx: &Context) -> Result<()> {
    let sh = ctx.shell()?;
    Git::new(&sh, &ctx.config.git).clean(&ctx.cancel).await?;
    Ok(())
}

/// Fetch `refs` from `repo` with the configured flags.
pub async fn fetch(ctx: &Context, repo: &str, refs: &[String]) -> Result<()> {
    let sh = ctx.shell()?;
    let refs: Vec<&str> = refs.iter().map(String::as_str).collect();
    Git::new(&sh, &ctx.config.git)
        .fetch(&ctx.cancel, repo, &refs)
        .await
        .with_context(|| format!("fetch from {repo} failed"))
}

/// Create or update the mirror of `repo` and print its path.
pub async fn mirror(ctx: &Context, repo: &str, timeout: Option<Duration>) -> Result<()> {
    let sh = ctx.shell()?;
    let mut config = ctx.config.git.clone();
    if let Some(timeout) = timeout {
        config.mirrors_lock_timeout = timeout;
    }
    let path = ensure_mirror(&ctx.cancel, &sh, &ctx.file_lock(), &config, repo).await?;
    println!("{}", path.display());
    Ok(())
}

/// Print the `host[:port]` ssh would connect to for `host`.
pub async fn resolve_host(ctx: &Context, host: &str) -> Result<()> {
    let sh = ctx.shell()?;
    let resolved = Git::new(&sh, &ctx.config.git)
        .resolve_host(&ctx.cancel, host)
        .await?;
    println!("{resolved}");
    Ok(())
}

/// Print the normalized form of a remote location.
pub fn parse_url(raw: &str, json: bool) -> Result<()> {
    let url = parse_gittable_url(raw)?;

    if json {
        let value = serde_json::json!({
            "url": url.as_str(),
            "scheme": url.scheme(),
            "user": url.user(),
            "host": url.host(),
            "path": url.path(),
            "ssh": url.is_ssh(),
            "local": url.is_local_path(),
        });
        println!("{}", serde_json::to_string_pretty(&value)?);
        return Ok(());
    }

    println!("{url}");
    println!("  scheme: {}", url.scheme());
    if let Some(user) = url.user() {
        println!("  user:   {user}");
    }
    if !url.hostname().is_empty() {
        println!("  host:   {}", url.host());
    }
    println!("  path:   {}", url.path());
    Ok(())
}
