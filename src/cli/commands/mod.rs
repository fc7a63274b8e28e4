//! cli::commands
//!
//! Command dispatch and handlers.
//!
//! # Architecture
//!
//! Each command handler:
//! 1. Builds what it needs from the [`Context`]
//! 2. Calls into the library
//! 3. Prints results to stdout
//!
//! Diagnostics go through `tracing` to stderr, so stdout carries only
//! command output.

mod completion;
mod git;
mod lock;
mod run;

pub use completion::completion;
pub use git::{checkout, clean, clone, fetch, mirror, parse_url, resolve_host};
pub use lock::lock;
pub use run::{capture, run};

use anyhow::Result;

use super::args::Command;
use super::Context;

/// Dispatch a command to its handler.
pub async fn dispatch(command: Command, ctx: &Context) -> Result<()> {
    match command {
        Command::Run { command } => run(ctx, &command).await,
        Command::Capture { command } => capture(ctx, &command).await,
        Command::Checkout { reference } => checkout(ctx, &reference).await,
        Command::Clone { repo, dir } => clone(ctx, &repo, &dir).await,
        Command::Clean => clean(ctx).await,
        Command::Fetch { repo, refs } => fetch(ctx, &repo, &refs).await,
        Command::Mirror { repo, timeout } => mirror(ctx, &repo, timeout).await,
        Command::ResolveHost { host } => resolve_host(ctx, &host).await,
        Command::ParseUrl { url, json } => parse_url(&url, json),
        Command::Lock {
            path,
            timeout,
            strategy,
            command,
        } => lock(ctx, &path, timeout, strategy, &command).await,
        Command::Completion { shell } => completion(shell),
    }
}

/// Split `command` into a program and its arguments.
pub(crate) fn split_command(command: &[String]) -> Result<(&str, Vec<&str>)> {
    let (program, args) = command
        .split_first()
        .ok_or_else(|| anyhow::anyhow!("no program given"))?;
    Ok((program.as_str(), args.iter().map(String::as_str).collect()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn split_command_separates_program() {
        let command = vec!["git".to_string(), "status".into(), "-s".into()];
        let (program, args) = split_command(&command).unwrap();
        assert_eq!(program, "git");
        assert_eq!(args, ["status", "-s"]);
    }

    #[test]
    fn split_command_rejects_empty() {
        assert!(split_command(&[]).is_err());
    }
}
