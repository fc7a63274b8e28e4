//! completion command - Generate shell completion scripts

use crate::cli::args::{Cli, CompletionShell};
use anyhow::Result;
use clap::CommandFactory;
use clap_complete::{generate, shells};

/// Write the completion script for `shell` to stdout.
pub fn completion(shell: CompletionShell) -> Result<()> {
    let mut cmd = Cli::command();
    let name = cmd.get_name().to_string();
    let out = &mut std::io::stdout();

    match shell {
        CompletionShell::Bash => generate(shells::Bash, &mut cmd, &name, out),
        CompletionShell::Zsh => generate(shells::Zsh, &mut cmd, &name, out),
        CompletionShell::Fish => generate(shells::Fish, &mut cmd, &name, out),
        CompletionShell::PowerShell => generate(shells::PowerShell, &mut cmd, &name, out),
    }

    Ok(())
}
