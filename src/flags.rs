//! Process-wide flags that have to be known before the command tree exists
//!
//! The alias changes the program name shown in help text and examples, and the
//! debug flag changes the log level, so both are read by hand from the raw
//! arguments before clap ever sees them. The edit flag is only needed at
//! dispatch time and comes from the parsed matches instead.
//!
//! Global flags count wherever they appear before `--`, even after a script's
//! own arguments, so the same recognizer also reorders the arguments handed
//! to clap.

use std::ffi::OsString;

use clap::Args;

/// Program name used when no alias is given
pub const DEFAULT_ALIAS: &str = "sd";

/// Global flags registered on the root command and visible to every subcommand
#[derive(Args, Debug, Clone, Default)]
pub struct GlobalArgs {
    /// Use an alias in help text and completions
    #[arg(short, long, global = true, hide = true, default_value = DEFAULT_ALIAS)]
    pub alias: String,

    /// Turn debugging on/off
    #[arg(short, long, global = true)]
    pub debug: bool,

    /// Edit command
    #[arg(short, long, global = true)]
    pub edit: bool,
}

/// Flags resolved once per invocation and never changed afterwards
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuntimeFlags {
    pub alias: String,
    pub debug: bool,
    pub edit: bool,
}

impl Default for RuntimeFlags {
    fn default() -> Self {
        RuntimeFlags {
            alias: DEFAULT_ALIAS.to_string(),
            debug: false,
            edit: false,
        }
    }
}

impl RuntimeFlags {
    /// Scan raw process arguments for the global flags.
    ///
    /// The first element is treated as the program name and skipped. Flags are
    /// recognized anywhere up to `--`, including clustered short forms such as
    /// `-de` or `-da quack`.
    #[must_use]
    pub fn prescan<I, T>(args: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString>,
    {
        let mut flags = RuntimeFlags::default();
        for global in scan(args.into_iter().skip(1)).found {
            match global {
                Global::Debug => flags.debug = true,
                Global::Edit => flags.edit = true,
                Global::Alias(alias) if !alias.is_empty() => flags.alias = alias,
                Global::Alias(_) => {}
            }
        }
        flags
    }

    /// Returns a copy with the edit flag taken from the parsed matches.
    #[must_use]
    pub fn with_edit(&self, edit: bool) -> Self {
        RuntimeFlags {
            edit,
            ..self.clone()
        }
    }
}

/// Move every global flag in front of the first subcommand, keeping the
/// program name first and everything else in order.
///
/// Script arguments accept values starting with `-`, so clap would otherwise
/// hand a trailing `-e` or `-d` to the script. After this the parsed flags
/// always agree with [`RuntimeFlags::prescan`].
#[must_use]
pub fn hoist_globals<I, T>(args: I) -> Vec<OsString>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString>,
{
    let mut args = args.into_iter().map(Into::<OsString>::into);
    let program = args.next();
    let scanned = scan(args);
    program
        .into_iter()
        .chain(scanned.flags)
        .chain(scanned.rest)
        .collect()
}

/// A global flag recognized in the raw arguments
#[derive(Debug, Clone, PartialEq, Eq)]
enum Global {
    Debug,
    Edit,
    Alias(String),
}

#[derive(Default)]
struct Scan {
    /// Tokens making up global flags, values included
    flags: Vec<OsString>,
    /// Everything else, in order
    rest: Vec<OsString>,
    found: Vec<Global>,
}

/// Split arguments, program name excluded, into global flags and the rest.
fn scan<I, T>(args: I) -> Scan
where
    I: IntoIterator<Item = T>,
    T: Into<OsString>,
{
    let mut scan = Scan::default();
    let mut args = args.into_iter().map(Into::<OsString>::into).peekable();
    while let Some(arg) = args.next() {
        if arg == "--" {
            scan.rest.push(arg);
            scan.rest.extend(args);
            break;
        }
        let next = args.peek().map(|next| next.to_string_lossy().into_owned());
        let parsed = parse_global(&arg.to_string_lossy(), next.as_deref());
        let Some((found, takes_next)) = parsed else {
            scan.rest.push(arg);
            continue;
        };
        scan.flags.push(arg);
        if takes_next {
            scan.flags.extend(args.next());
        }
        scan.found.extend(found);
    }
    scan
}

/// Global flags carried by `arg`, and whether it consumes `next` as the
/// alias. `None` when `arg` is not a global flag.
fn parse_global(arg: &str, next: Option<&str>) -> Option<(Vec<Global>, bool)> {
    match arg {
        "--debug" => return Some((vec![Global::Debug], false)),
        "--edit" => return Some((vec![Global::Edit], false)),
        "--alias" => return Some(alias_from_next(Vec::new(), next)),
        _ => {}
    }
    if let Some(alias) = arg.strip_prefix("--alias=") {
        return Some((vec![Global::Alias(alias.to_string())], false));
    }

    let cluster = arg
        .strip_prefix('-')
        .filter(|cluster| !cluster.is_empty() && !cluster.starts_with('-'))?;
    let mut found = Vec::new();
    for (i, flag) in cluster.char_indices() {
        match flag {
            'd' => found.push(Global::Debug),
            'e' => found.push(Global::Edit),
            'a' => {
                let rest = &cluster[i + 1..];
                if rest.is_empty() {
                    return Some(alias_from_next(found, next));
                }
                let alias = rest.strip_prefix('=').unwrap_or(rest);
                found.push(Global::Alias(alias.to_string()));
                return Some((found, false));
            }
            _ => return None,
        }
    }
    Some((found, false))
}

fn alias_from_next(mut found: Vec<Global>, next: Option<&str>) -> (Vec<Global>, bool) {
    match next.filter(|next| !next.starts_with('-')) {
        Some(alias) => {
            found.push(Global::Alias(alias.to_string()));
            (found, true)
        }
        None => (found, false),
    }
}
