//! Assembly of the clap command tree
//!
//! The static part of the interface (global flags, `completions`) is declared
//! with clap's derive API, everything discovered on disk is added with the
//! builder API at runtime.

use clap::{Arg, ArgAction, ArgMatches, Args, Command};

use crate::commands::node::{CommandNode, NodeKind, Script};
use crate::commands::usage::ArgumentValidator;
use crate::completions;
use crate::flags::{GlobalArgs, RuntimeFlags};
use crate::theme;

/// Id of the positional argument collecting a script's arguments
pub const SCRIPT_ARGS: &str = "args";

/// Build the root command named after the current alias.
#[must_use]
pub fn build(flags: &RuntimeFlags, nodes: &[CommandNode]) -> Command {
    let root = Command::new(flags.alias.clone())
        .bin_name(flags.alias.clone())
        .version(env!("CARGO_PKG_VERSION"))
        .about("Turn a directory of scripts into a command-line tool")
        .styles(theme::help_styles())
        .subcommand(completions::command());
    let parents = [flags.alias.clone()];
    GlobalArgs::augment_args(root).subcommands(nodes.iter().map(|node| to_command(node, &parents)))
}

/// Clap command for a single node and, for groups, everything below it.
///
/// `parents` is the invocation path of the node's parent, starting with the
/// program name.
#[must_use]
pub fn to_command(node: &CommandNode, parents: &[String]) -> Command {
    let mut command = Command::new(node.name.clone()).hide(node.is_inert());
    if !node.short_help.is_empty() {
        command = command.about(node.short_help.clone());
    }
    match &node.kind {
        NodeKind::Group(group) => {
            if let Some(long_help) = &group.long_help {
                command = command.long_about(long_help.clone());
            }
            let mut path = parents.to_vec();
            path.push(node.name.clone());
            command.subcommands(group.children.iter().map(|child| to_command(child, &path)))
        }
        NodeKind::Script(script) => script_command(command, script, parents),
    }
}

fn script_command(mut command: Command, script: &Script, parents: &[String]) -> Command {
    if let Some(synopsis) = &script.synopsis {
        let name = command.get_name().to_string();
        command = command.override_usage(format!(
            "{} {name} [OPTIONS] {synopsis}",
            parents.join(" ")
        ));
    }
    if !script.example.is_empty() {
        command = command.after_help(format!("Examples:\n{}", script.example));
    }
    match script_args(script.validator) {
        Some(arg) => command.arg(arg),
        None => command,
    }
}

/// Positional argument enforcing a validator, `None` when the script takes
/// no arguments at all.
#[must_use]
pub fn script_args(validator: ArgumentValidator) -> Option<Arg> {
    let (min, max) = validator.bounds()?;
    if max == Some(0) {
        return None;
    }
    // Append lets a single-valued positional repeat
    let action = if max == Some(1) {
        ArgAction::Set
    } else {
        ArgAction::Append
    };
    let arg = Arg::new(SCRIPT_ARGS)
        .action(action)
        .allow_hyphen_values(true)
        .required(min > 0);
    Some(match max {
        Some(max) => arg.num_args(min..=max),
        None => arg.num_args(min..),
    })
}

/// The chain of subcommand names that were matched, and the innermost matches.
#[must_use]
pub fn selected_path(matches: &ArgMatches) -> (Vec<String>, &ArgMatches) {
    let mut path = Vec::new();
    let mut current = matches;
    while let Some((name, sub)) = current.subcommand() {
        path.push(name.to_string());
        current = sub;
    }
    (path, current)
}

/// Positional arguments collected for a script.
#[must_use]
pub fn script_values(matches: &ArgMatches) -> Vec<String> {
    matches
        .try_get_many::<String>(SCRIPT_ARGS)
        .ok()
        .flatten()
        .map(|values| values.cloned().collect())
        .unwrap_or_default()
}

/// Find the clap command at `path` below `root`.
pub fn find_command_mut<'a>(root: &'a mut Command, path: &[String]) -> Option<&'a mut Command> {
    path.iter()
        .try_fold(root, |command, name| command.find_subcommand_mut(name))
}
