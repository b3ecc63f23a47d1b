//! Completion command.
//!
//! Prints a completion script for bash, zsh, fish, or PowerShell.

use std::io::{self, Write};

use clap::CommandFactory;
use clap_complete::{generate, Shell as CompletionShell};

use crate::cli::{Cli, Shell};
use crate::error::{InputError, Result};

/// Write the completion script for `shell` to stdout.
pub fn execute(shell: Shell) -> Result<()> {
    let mut stdout = io::stdout().lock();
    write_script(shell, &mut stdout)
        .and_then(|()| stdout.flush())
        .map_err(|e| InputError::Output(e).into())
}

fn write_script<W: Write>(shell: Shell, out: &mut W) -> io::Result<()> {
    let mut cmd = Cli::command();
    let target = match shell {
        Shell::Bash => CompletionShell::Bash,
        Shell::Zsh => CompletionShell::Zsh,
        Shell::Fish => CompletionShell::Fish,
        Shell::PowerShell => CompletionShell::PowerShell,
    };

    generate(target, &mut cmd, "cellar", out);

    // Lets `source <(cellar completion zsh)` work without fpath setup.
    if matches!(shell, Shell::Zsh) {
        writeln!(out, "compdef _cellar cellar")?;
    }
    Ok(())
}
