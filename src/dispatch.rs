//! Turning a selected script into an editor session or a running process

use std::collections::BTreeMap;
use std::ffi::OsString;
use std::io;
use std::path::{Path, PathBuf};

use log::debug;
use thiserror::Error;

use crate::commands::node::{CommandNode, NodeKind};
use crate::env::{Environment, script_environment};
use crate::flags::RuntimeFlags;

/// Shell used to run the editor command line
pub const SHELL: &str = "/bin/sh";
/// Editor used when neither `$VISUAL` nor `$EDITOR` is set
pub const FALLBACK_EDITOR: &str = "$(which vim)";

#[derive(Error, Debug)]
pub enum DispatchError {
    #[error("Unable to exec {program}: {source}")]
    Exec {
        program: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("Unable to run {program}: {source}")]
    Spawn {
        program: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// A process to replace the current one with
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    pub program: PathBuf,
    /// Full argument vector, including argument zero
    pub argv: Vec<OsString>,
    /// Complete environment, or `None` to inherit the current one unchanged
    pub env: Option<BTreeMap<OsString, OsString>>,
}

/// What invoking a node amounts to
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Dispatch {
    /// Print the node's help
    Usage,
    /// Open the script in an editor
    Edit(Invocation),
    /// Run the script
    Execute(Invocation),
}

/// Replaces the running process.
pub trait ProcessReplacer {
    /// Hand control to `invocation`. Only returns on failure, or when the
    /// platform cannot replace processes and the child could not be started.
    ///
    /// # Errors
    ///
    /// Returns `DispatchError` when the process cannot be started.
    fn replace(&self, invocation: &Invocation) -> Result<(), DispatchError>;
}

/// Replaces the process with `execve`, or runs the child and exits with its
/// status where that is not available.
#[derive(Debug, Clone, Copy, Default)]
pub struct Exec;

impl ProcessReplacer for Exec {
    fn replace(&self, invocation: &Invocation) -> Result<(), DispatchError> {
        let mut command = std::process::Command::new(&invocation.program);
        if let Some((_, args)) = invocation.argv.split_first() {
            command.args(args);
        }
        if let Some(env) = &invocation.env {
            command.env_clear().envs(env);
        }
        replace_with(command, invocation)
    }
}

#[cfg(unix)]
fn replace_with(
    mut command: std::process::Command,
    invocation: &Invocation,
) -> Result<(), DispatchError> {
    use std::os::unix::process::CommandExt;
    if let Some(arg0) = invocation.argv.first() {
        command.arg0(arg0);
    }
    let source = command.exec();
    Err(DispatchError::Exec {
        program: invocation.program.clone(),
        source,
    })
}

#[cfg(not(unix))]
fn replace_with(
    mut command: std::process::Command,
    invocation: &Invocation,
) -> Result<(), DispatchError> {
    let status = command.status().map_err(|source| DispatchError::Spawn {
        program: invocation.program.clone(),
        source,
    })?;
    std::process::exit(status.code().unwrap_or(1))
}

/// Decides what invoking a node does and carries it out
pub struct Dispatcher<'a> {
    env: &'a dyn Environment,
    process: &'a dyn ProcessReplacer,
}

impl<'a> Dispatcher<'a> {
    #[must_use]
    pub fn new(env: &'a dyn Environment, process: &'a dyn ProcessReplacer) -> Self {
        Dispatcher { env, process }
    }

    /// Editor command: `$VISUAL`, then `$EDITOR`, then vim from `$PATH`.
    #[must_use]
    pub fn editor(&self) -> String {
        let non_empty = |key: &str| self.env.var(key).filter(|value| !value.is_empty());
        non_empty("VISUAL")
            .or_else(|| {
                debug!("$VISUAL not set, trying $EDITOR...");
                non_empty("EDITOR")
            })
            .unwrap_or_else(|| {
                debug!("$EDITOR not set, trying {FALLBACK_EDITOR}...");
                FALLBACK_EDITOR.to_string()
            })
    }

    fn edit(&self, source: &Path) -> Invocation {
        let cmdline = format!("{} {}", self.editor(), source.display());
        Invocation {
            program: PathBuf::from(SHELL),
            argv: vec!["sh".into(), "-c".into(), cmdline.into()],
            env: None,
        }
    }

    fn execute(&self, source: &Path, args: &[String], flags: &RuntimeFlags) -> Invocation {
        let mut argv: Vec<OsString> = vec![source.as_os_str().to_owned()];
        argv.extend(args.iter().map(OsString::from));
        Invocation {
            program: source.to_path_buf(),
            argv,
            env: Some(script_environment(self.env, flags)),
        }
    }

    /// Work out what invoking `node` with `args` means.
    #[must_use]
    pub fn plan(&self, node: &CommandNode, args: &[String], flags: &RuntimeFlags) -> Dispatch {
        match &node.kind {
            NodeKind::Group(_) => Dispatch::Usage,
            NodeKind::Script(script) if flags.edit => Dispatch::Edit(self.edit(&script.source)),
            NodeKind::Script(script) => {
                Dispatch::Execute(self.execute(&script.source, args, flags))
            }
        }
    }

    /// Carry out an edit or execute plan. `Usage` is left to the caller,
    /// which owns the help text.
    ///
    /// # Errors
    ///
    /// Returns `DispatchError` if the process cannot be replaced.
    pub fn run(&self, dispatch: &Dispatch) -> Result<(), DispatchError> {
        match dispatch {
            Dispatch::Usage => Ok(()),
            Dispatch::Edit(invocation) => {
                debug!("Running {:?}", invocation.argv);
                self.process.replace(invocation)
            }
            Dispatch::Execute(invocation) => {
                debug!(
                    "Exec: {} with args: {:?}",
                    invocation.program.display(),
                    invocation.argv.get(1..).unwrap_or_default()
                );
                self.process.replace(invocation)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::node::{Group, Script};
    use crate::commands::usage::ArgumentValidator;
    use crate::env::MapEnvironment;
    use std::cell::RefCell;

    #[derive(Default)]
    struct Recorder {
        calls: RefCell<Vec<Invocation>>,
    }

    impl ProcessReplacer for Recorder {
        fn replace(&self, invocation: &Invocation) -> Result<(), DispatchError> {
            self.calls.borrow_mut().push(invocation.clone());
            Ok(())
        }
    }

    fn script(source: &str) -> CommandNode {
        CommandNode {
            name: "foo".to_string(),
            short_help: String::new(),
            kind: NodeKind::Script(Script {
                source: PathBuf::from(source),
                validator: ArgumentValidator::Unbounded,
                synopsis: None,
                example: String::new(),
            }),
        }
    }

    fn editing() -> RuntimeFlags {
        RuntimeFlags::default().with_edit(true)
    }

    fn argv(invocation: &Invocation) -> Vec<&str> {
        invocation
            .argv
            .iter()
            .map(|arg| arg.to_str().unwrap())
            .collect()
    }

    fn edit_cmdline(env: &MapEnvironment) -> Vec<String> {
        let recorder = Recorder::default();
        let dispatcher = Dispatcher::new(env, &recorder);
        let plan = dispatcher.plan(&script("/path/to/foo"), &[], &editing());
        dispatcher.run(&plan).unwrap();
        let calls = recorder.calls.borrow();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].program, PathBuf::from("/bin/sh"));
        assert_eq!(calls[0].env, None);
        argv(&calls[0]).into_iter().map(String::from).collect()
    }

    #[test]
    fn test_edit_with_visual() {
        let env = MapEnvironment::from([("VISUAL", "some-visual-editor"), ("EDITOR", "other")]);
        assert_eq!(
            edit_cmdline(&env),
            vec!["sh", "-c", "some-visual-editor /path/to/foo"]
        );
    }

    #[test]
    fn test_edit_with_editor() {
        let env = MapEnvironment::from([("VISUAL", ""), ("EDITOR", "some-editor")]);
        assert_eq!(edit_cmdline(&env), vec!["sh", "-c", "some-editor /path/to/foo"]);
    }

    #[test]
    fn test_edit_with_default_vim() {
        let env = MapEnvironment::default();
        assert_eq!(edit_cmdline(&env), vec!["sh", "-c", "$(which vim) /path/to/foo"]);
    }

    #[test]
    fn test_exec_script() {
        let env = MapEnvironment::from([("PATH", "/bin")]);
        let recorder = Recorder::default();
        let dispatcher = Dispatcher::new(&env, &recorder);
        let flags = RuntimeFlags {
            alias: "quack".to_string(),
            debug: true,
            edit: false,
        };
        let plan = dispatcher.plan(&script("/path/to/foo"), &["bar".to_string()], &flags);
        dispatcher.run(&plan).unwrap();

        let calls = recorder.calls.borrow();
        assert_eq!(calls[0].program, PathBuf::from("/path/to/foo"));
        assert_eq!(argv(&calls[0]), vec!["/path/to/foo", "bar"]);
        let env = calls[0].env.as_ref().unwrap();
        assert_eq!(env.get(&OsString::from("PATH")), Some(&OsString::from("/bin")));
        assert_eq!(env.get(&OsString::from("SD_ALIAS")), Some(&OsString::from("quack")));
        assert_eq!(env.get(&OsString::from("DEBUG")), Some(&OsString::from("true")));
    }

    #[test]
    fn test_group_shows_usage() {
        let env = MapEnvironment::default();
        let recorder = Recorder::default();
        let dispatcher = Dispatcher::new(&env, &recorder);
        let group = CommandNode {
            name: "db".to_string(),
            short_help: String::new(),
            kind: NodeKind::Group(Group::default()),
        };

        let plan = dispatcher.plan(&group, &[], &editing());
        assert_eq!(plan, Dispatch::Usage);
        dispatcher.run(&plan).unwrap();
        assert!(recorder.calls.borrow().is_empty());
    }

    #[cfg(unix)]
    #[test]
    fn test_exec_failure_is_returned() {
        let invocation = Invocation {
            program: PathBuf::from("/definitely/not/here"),
            argv: vec!["/definitely/not/here".into()],
            env: Some(BTreeMap::new()),
        };
        let result = Exec.replace(&invocation);
        assert!(matches!(result, Err(DispatchError::Exec { .. })));
    }
}
