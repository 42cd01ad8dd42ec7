//! Resolution of the directories that are scanned for scripts

use std::collections::HashSet;
use std::ffi::OsStr;
use std::hash::Hash;
use std::path::{Path, PathBuf};

use log::debug;

use crate::env::Environment;

/// Directory under `$HOME` holding personal scripts
pub const HOME_DIR: &str = ".sd";
/// Directory under the working directory holding project scripts
pub const PROJECT_DIR: &str = "scripts";
/// Path-list variable naming extra script directories
pub const SD_PATH: &str = "SD_PATH";

/// Deduplicate a sequence, keeping the first occurrence of every element.
#[must_use]
pub fn deduplicate<T>(input: Vec<T>) -> Vec<T>
where
    T: Eq + Hash + Clone,
{
    let mut seen = HashSet::new();
    input
        .into_iter()
        .filter(|item| seen.insert(item.clone()))
        .collect()
}

/// Ordered list of roots: `{home}/.sd`, `{cwd}/scripts`, then every non-empty
/// entry of `sd_path`, without duplicates.
///
/// Nothing here touches the filesystem; missing directories are dealt with
/// while building the tree.
#[must_use]
pub fn resolve_roots(home: Option<&Path>, cwd: &Path, sd_path: Option<&OsStr>) -> Vec<PathBuf> {
    let mut roots = Vec::new();
    if let Some(home) = home {
        roots.push(home.join(HOME_DIR));
    }
    roots.push(cwd.join(PROJECT_DIR));
    if let Some(sd_path) = sd_path {
        roots.extend(
            std::env::split_paths(sd_path).filter(|path| !path.as_os_str().is_empty()),
        );
    }
    deduplicate(roots)
}

/// Resolve the roots from the given environment and working directory.
#[must_use]
pub fn roots_from_env(env: &dyn Environment, cwd: &Path) -> Vec<PathBuf> {
    let home = env.var("HOME").filter(|home| !home.is_empty()).map(PathBuf::from);
    match &home {
        Some(home) => debug!("HOME is set to: {}", home.display()),
        None => debug!("HOME is not set, skipping {HOME_DIR}"),
    }
    let sd_path = env.var(SD_PATH);
    debug!("{SD_PATH} is set to: {sd_path:?}");

    let roots = resolve_roots(home.as_deref(), cwd, sd_path.as_deref().map(OsStr::new));
    debug!("Script roots: {roots:?}");
    roots
}
