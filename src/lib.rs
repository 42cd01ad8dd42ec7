//! Core implementation of sd, the script directory command runner
//!
//! sd turns directories of executable scripts into a hierarchical command-line
//! tool: every subdirectory becomes a command group and every executable file a
//! command. Comments inside the scripts provide help text, usage lines and
//! examples, and the usage line decides how many arguments a script accepts.
//!
//! Scripts are looked up in `~/.sd`, `./scripts` and every directory listed in
//! `$SD_PATH`, in that order.

use std::ffi::OsString;
use std::io::{self, Write};
use std::path::PathBuf;

use clap::FromArgMatches;
use log::debug;
use thiserror::Error;

use crate::commands::node::CommandNode;
use crate::commands::tree::{self, LoadError};
use crate::dispatch::{Dispatch, DispatchError, Dispatcher};
use crate::env::Environment;
use crate::flags::{GlobalArgs, RuntimeFlags};

pub mod cli;
pub mod commands;
pub mod completions;
pub mod dispatch;
pub mod env;
pub mod flags;
pub mod logger;
pub mod paths;
pub mod theme;

/// Errors surfaced to the binary
#[derive(Error, Debug)]
pub enum SdError {
    #[error(transparent)]
    Load(#[from] LoadError),
    #[error(transparent)]
    Dispatch(#[from] DispatchError),
    #[error(transparent)]
    Cli(#[from] clap::Error),
    #[error("No command registered for '{0}'")]
    UnknownCommand(String),
    #[error("Unable to write output: {0}")]
    Io(#[from] io::Error),
}

/// A loaded command tree together with its clap interface
pub struct Sd {
    flags: RuntimeFlags,
    nodes: Vec<CommandNode>,
    cli: clap::Command,
}

impl Sd {
    /// Load every script root visible from the current working directory.
    ///
    /// # Errors
    ///
    /// Returns `LoadError` if the working directory is unknown, or a root
    /// cannot be scanned.
    pub fn load(flags: RuntimeFlags, env: &dyn Environment) -> Result<Self, LoadError> {
        let cwd = std::env::current_dir().map_err(LoadError::WorkingDirectory)?;
        debug!("Current working dir is set to: {}", cwd.display());
        let roots = paths::roots_from_env(env, &cwd);
        Self::from_roots(flags, &roots)
    }

    /// Load the given roots, in order.
    ///
    /// # Errors
    ///
    /// Returns `LoadError` if a root cannot be scanned.
    pub fn from_roots(flags: RuntimeFlags, roots: &[PathBuf]) -> Result<Self, LoadError> {
        let nodes = tree::load(roots, &flags.alias)?;
        let cli = cli::build(&flags, &nodes);
        Ok(Sd { flags, nodes, cli })
    }

    #[must_use]
    pub fn nodes(&self) -> &[CommandNode] {
        &self.nodes
    }

    #[must_use]
    pub fn flags(&self) -> &RuntimeFlags {
        &self.flags
    }

    /// Parse `args` and act on the selected command.
    ///
    /// Global flags count wherever they appear before `--`. Long help for
    /// groups and completion scripts are written to `out`. Running a
    /// script hands the process over to it, so on success this only returns
    /// when nothing was executed.
    ///
    /// # Errors
    ///
    /// Returns `SdError::Cli` for usage errors as well as `--help`/`--version`
    /// (which clap reports as errors), or the error that stopped dispatch.
    pub fn run<I, T>(
        mut self,
        args: I,
        dispatcher: &Dispatcher,
        out: &mut dyn Write,
    ) -> Result<(), SdError>
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString>,
    {
        let matches = self
            .cli
            .try_get_matches_from_mut(flags::hoist_globals(args))?;
        let (path, leaf) = cli::selected_path(&matches);
        debug!("Selected command: {path:?}");

        if path.first().is_some_and(|name| name == completions::NAME) {
            return self.run_completions(&path, out);
        }

        let globals = GlobalArgs::from_arg_matches(leaf)?;
        let flags = self.flags.with_edit(globals.edit);
        let dispatch = match CommandNode::find(&self.nodes, &path) {
            Some(node) => dispatcher.plan(node, &cli::script_values(leaf), &flags),
            None if path.is_empty() => Dispatch::Usage,
            None => return Err(SdError::UnknownCommand(path.join(" "))),
        };

        match dispatch {
            Dispatch::Usage => self.write_help(&path, out),
            dispatch => Ok(dispatcher.run(&dispatch)?),
        }
    }

    fn run_completions(&mut self, path: &[String], out: &mut dyn Write) -> Result<(), SdError> {
        match path.get(1).and_then(|name| completions::shell(name)) {
            Some(shell) => {
                completions::generate(shell, &mut self.cli, out);
                debug!("Generated {shell} completions");
                Ok(())
            }
            None => self.write_help(path, out),
        }
    }

    fn write_help(&mut self, path: &[String], out: &mut dyn Write) -> Result<(), SdError> {
        let command = cli::find_command_mut(&mut self.cli, path)
            .ok_or_else(|| SdError::UnknownCommand(path.join(" ")))?;
        write!(out, "{}", command.render_long_help())?;
        Ok(())
    }
}
