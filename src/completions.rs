//! Shell completion scripts for the whole command tree

use std::io::Write;

use clap::Command;
use clap_complete::Shell;

/// Name of the built-in group generating completions
pub const NAME: &str = "completions";

const SHELLS: [Shell; 3] = [Shell::Bash, Shell::Zsh, Shell::Fish];

/// The `completions` group with one subcommand per supported shell.
#[must_use]
pub fn command() -> Command {
    Command::new(NAME)
        .about("Generate completion scripts")
        .subcommands(SHELLS.map(|shell| {
            Command::new(shell.to_string()).about(format!("Generate completions for {shell}"))
        }))
}

/// Shell named by a `completions` subcommand.
#[must_use]
pub fn shell(name: &str) -> Option<Shell> {
    SHELLS.into_iter().find(|shell| shell.to_string() == name)
}

/// Write the completion script for `root` to `out`, under the root's name.
pub fn generate(shell: Shell, root: &mut Command, out: &mut dyn Write) {
    let bin_name = root.get_name().to_string();
    clap_complete::generate(shell, root, bin_name, out);
}
