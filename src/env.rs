//! Access to the process environment, and the environment handed to scripts

use std::collections::{BTreeMap, HashMap};
use std::ffi::OsString;

use crate::flags::RuntimeFlags;

/// Variable holding the program name as currently displayed
pub const SD_ALIAS: &str = "SD_ALIAS";
/// Variable set to `true` for scripts run in debug mode
pub const DEBUG: &str = "DEBUG";

/// Read access to environment variables.
pub trait Environment {
    /// Value of `key`, or `None` when unset or not valid unicode.
    fn var(&self, key: &str) -> Option<String>;

    /// Every variable, in no particular order.
    fn vars(&self) -> Vec<(OsString, OsString)>;
}

/// The environment of the running process
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessEnvironment;

impl Environment for ProcessEnvironment {
    fn var(&self, key: &str) -> Option<String> {
        std::env::var(key).ok()
    }

    fn vars(&self) -> Vec<(OsString, OsString)> {
        std::env::vars_os().collect()
    }
}

/// A fixed set of variables, for tests and embedding
#[derive(Debug, Clone, Default)]
pub struct MapEnvironment {
    vars: HashMap<String, String>,
}

impl MapEnvironment {
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.vars.insert(key.into(), value.into());
    }
}

impl<K, V, const N: usize> From<[(K, V); N]> for MapEnvironment
where
    K: Into<String>,
    V: Into<String>,
{
    fn from(vars: [(K, V); N]) -> Self {
        MapEnvironment {
            vars: vars
                .into_iter()
                .map(|(key, value)| (key.into(), value.into()))
                .collect(),
        }
    }
}

impl Environment for MapEnvironment {
    fn var(&self, key: &str) -> Option<String> {
        self.vars.get(key).cloned()
    }

    fn vars(&self) -> Vec<(OsString, OsString)> {
        self.vars
            .iter()
            .map(|(key, value)| (key.into(), value.into()))
            .collect()
    }
}

/// Environment for an executed script: everything inherited, plus `SD_ALIAS`,
/// plus `DEBUG=true` when debugging.
#[must_use]
pub fn script_environment(env: &dyn Environment, flags: &RuntimeFlags) -> BTreeMap<OsString, OsString> {
    let mut vars: BTreeMap<OsString, OsString> = env.vars().into_iter().collect();
    vars.insert(SD_ALIAS.into(), flags.alias.clone().into());
    if flags.debug {
        vars.insert(DEBUG.into(), "true".into());
    }
    vars
}

#[cfg(test)]
mod tests {
    use super::*;

    fn get<'a>(vars: &'a BTreeMap<OsString, OsString>, key: &str) -> Option<&'a str> {
        vars.get(&OsString::from(key)).and_then(|value| value.to_str())
    }

    #[test]
    fn test_inherits_and_adds_alias() {
        let env = MapEnvironment::from([("PATH", "/bin"), ("SD_PATH", "/opt/scripts")]);
        let vars = script_environment(&env, &RuntimeFlags::default());
        assert_eq!(get(&vars, "PATH"), Some("/bin"));
        assert_eq!(get(&vars, "SD_PATH"), Some("/opt/scripts"));
        assert_eq!(get(&vars, SD_ALIAS), Some("sd"));
        assert_eq!(get(&vars, DEBUG), None);
        assert_eq!(vars.len(), 3);
    }

    #[test]
    fn test_debug_only_when_enabled() {
        let env = MapEnvironment::default();
        let flags = RuntimeFlags {
            alias: "quack".to_string(),
            debug: true,
            edit: false,
        };
        let vars = script_environment(&env, &flags);
        assert_eq!(get(&vars, SD_ALIAS), Some("quack"));
        assert_eq!(get(&vars, DEBUG), Some("true"));
    }

    #[test]
    fn test_alias_overrides_inherited_value() {
        let env = MapEnvironment::from([(SD_ALIAS, "stale")]);
        let vars = script_environment(&env, &RuntimeFlags::default());
        assert_eq!(get(&vars, SD_ALIAS), Some("sd"));
    }
}
