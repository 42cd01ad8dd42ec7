//! Building the command tree from directories of scripts

use std::collections::HashSet;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use log::{debug, warn};
use thiserror::Error;

use crate::commands::metadata::{ScriptMetadata, render_example};
use crate::commands::node::{CommandNode, Group, NodeKind, Script};
use crate::commands::usage::ArgumentValidator;

/// Name of the file documenting a group
pub const README: &str = "README";

/// Errors that abort loading the command tree
#[derive(Error, Debug)]
pub enum LoadError {
    #[error("Unable to determine the working directory: {0}")]
    WorkingDirectory(#[source] io::Error),
    #[error("Unable to list directory {path}: {source}")]
    ReadDir {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("Unable to read script {path}: {source}")]
    ReadScript {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

fn is_hidden(name: &str) -> bool {
    name.starts_with('.')
}

#[cfg(unix)]
fn is_executable(metadata: &fs::Metadata) -> bool {
    use std::os::unix::fs::PermissionsExt;
    metadata.is_file() && metadata.permissions().mode() & 0o100 != 0
}

#[cfg(not(unix))]
fn is_executable(metadata: &fs::Metadata) -> bool {
    metadata.is_file()
}

/// Build the nodes for every entry of `path`.
///
/// `parents` is the invocation path leading to this directory, starting with
/// the program name; it is used to render examples. A missing directory yields
/// no nodes.
///
/// # Errors
///
/// Returns `LoadError` if a directory cannot be listed or a script cannot be read.
pub fn visit_dir(path: &Path, parents: &[String]) -> Result<Vec<CommandNode>, LoadError> {
    debug!("Visiting path: {}", path.display());
    let read_dir_error = |source: io::Error| LoadError::ReadDir {
        path: path.to_path_buf(),
        source,
    };

    let entries = match fs::read_dir(path) {
        Ok(entries) => entries,
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            debug!("Path does not exist: {}", path.display());
            return Ok(Vec::new());
        }
        Err(e) => return Err(read_dir_error(e)),
    };
    let mut entries = entries
        .collect::<Result<Vec<fs::DirEntry>, io::Error>>()
        .map_err(read_dir_error)?;
    entries.sort_by_key(fs::DirEntry::file_name);

    let mut nodes = Vec::new();
    for entry in entries {
        let name = entry.file_name().to_string_lossy().into_owned();
        let entry_path = entry.path();
        if is_hidden(&name) {
            debug!("Ignoring hidden path: {}", entry_path.display());
            continue;
        }

        let metadata = entry.metadata().map_err(read_dir_error)?;
        if metadata.is_dir() {
            debug!("Found directory: {}", entry_path.display());
            nodes.push(group_from_dir(&entry_path, name, parents)?);
        } else if is_executable(&metadata) {
            debug!("Script found: {}", entry_path.display());
            nodes.push(command_from_script(&entry_path, parents)?);
        }
    }
    Ok(nodes)
}

fn group_from_dir(path: &Path, name: String, parents: &[String]) -> Result<CommandNode, LoadError> {
    let readme_path = path.join(README);
    let readme = fs::read_to_string(&readme_path).ok();
    if readme.is_some() {
        debug!("Found README at: {}", readme_path.display());
    }

    let mut command_path = parents.to_vec();
    command_path.push(name.clone());
    let children = visit_dir(path, &command_path)?;
    if !children.is_empty() {
        debug!(
            "Directory has scripts (subcommands) inside it: {}",
            path.display()
        );
    }

    Ok(CommandNode {
        name,
        short_help: readme
            .as_deref()
            .and_then(|readme| readme.lines().next())
            .unwrap_or_default()
            .to_string(),
        kind: NodeKind::Group(Group {
            long_help: readme,
            children,
        }),
    })
}

/// Build a script node from the annotations in the file at `path`.
///
/// # Errors
///
/// Returns `LoadError::ReadScript` if the file cannot be read.
pub fn command_from_script(path: &Path, parents: &[String]) -> Result<CommandNode, LoadError> {
    let metadata = ScriptMetadata::from_file(path).map_err(|source| LoadError::ReadScript {
        path: path.to_path_buf(),
        source,
    })?;

    let (name, validator, synopsis) = match metadata.usage {
        Some(usage) => {
            let synopsis = usage.synopsis();
            (usage.name, usage.validator, Some(synopsis))
        }
        None => (
            path.file_name()
                .map(|name| name.to_string_lossy().into_owned())
                .unwrap_or_default(),
            ArgumentValidator::Unbounded,
            None,
        ),
    };

    let mut command_path = parents.to_vec();
    command_path.push(name.clone());
    let example = metadata
        .example
        .map(|example| render_example(&command_path, &example))
        .unwrap_or_default();

    debug!("Created command: {name}");
    Ok(CommandNode {
        name,
        short_help: metadata.description,
        kind: NodeKind::Script(Script {
            source: path.to_path_buf(),
            validator,
            synopsis,
            example,
        }),
    })
}

/// Names that clap or sd itself already use at the top level
pub const RESERVED_NAMES: [&str; 2] = ["help", "completions"];

/// Build and merge the trees of every root, in order.
///
/// A node whose name is already taken by an earlier sibling is dropped, so
/// the first definition wins.
///
/// # Errors
///
/// Returns the first `LoadError` hit while visiting any root.
pub fn load(roots: &[PathBuf], program: &str) -> Result<Vec<CommandNode>, LoadError> {
    debug!("Loading commands started");
    let parents = [program.to_string()];
    let mut forest = Vec::new();
    for root in roots {
        forest.extend(visit_dir(root, &parents)?);
    }
    let forest = dedupe_siblings(forest, &RESERVED_NAMES);
    debug!(
        "Loading commands done: {} scripts",
        forest.iter().map(CommandNode::script_count).sum::<usize>()
    );
    Ok(forest)
}

fn dedupe_siblings(nodes: Vec<CommandNode>, reserved: &[&str]) -> Vec<CommandNode> {
    let mut seen: HashSet<String> = reserved.iter().map(ToString::to_string).collect();
    nodes
        .into_iter()
        .filter_map(|mut node| {
            if !seen.insert(node.name.clone()) {
                warn!("Skipping duplicate command '{}'", node.name);
                return None;
            }
            if let NodeKind::Group(group) = &mut node.kind {
                group.children = dedupe_siblings(std::mem::take(&mut group.children), &["help"]);
            }
            Some(node)
        })
        .collect()
}
