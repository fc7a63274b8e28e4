//! run and capture commands

use anyhow::Result;

use super::split_command;
use crate::cli::Context;

/// Run a program with a prompt line, streaming its output.
pub async fn run(ctx: &Context, command: &[String]) -> Result<()> {
    let (program, args) = split_command(command)?;
    let sh = ctx.shell()?;
    sh.run(&ctx.cancel, program, &args).await?;
    Ok(())
}

/// Run a program and print its trimmed standard output.
pub async fn capture(ctx: &Context, command: &[String]) -> Result<()> {
    let (program, args) = split_command(command)?;
    let sh = ctx.shell()?;
    let output = sh.run_and_capture(&ctx.cancel, program, &args).await?;
    println!("{output}");
    Ok(())
}
