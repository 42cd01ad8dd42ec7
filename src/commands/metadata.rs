//! Annotation comments inside scripts
//!
//! Three kinds of lines are recognized, anywhere in the file:
//!
//! ```text
//! # name-of-the-file: short description.
//! # usage: name-of-the-command required [optional] ...
//! # example: foo bar 1 2 3
//! ```
//!
//! Each kind is matched independently and the first matching line wins.

use std::io::{self, BufRead, BufReader};
use std::path::Path;
use std::sync::LazyLock;

use log::debug;
use regex::Regex;

use crate::commands::usage::Usage;

static USAGE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^# usage: (.*)$").expect("usage pattern is valid"));
static EXAMPLE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^# example: (.*)$").expect("example pattern is valid"));

/// Annotations found in a single script
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScriptMetadata {
    /// Text after `# <file name>: `, empty when absent
    pub description: String,
    pub usage: Option<Usage>,
    /// Text after `# example: `
    pub example: Option<String>,
}

impl ScriptMetadata {
    /// Scan the script at `path`.
    ///
    /// # Errors
    ///
    /// Returns the I/O error if the file cannot be opened or read.
    pub fn from_file(path: &Path) -> io::Result<Self> {
        let file_name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default();
        let reader = BufReader::new(std::fs::File::open(path)?);
        let mut lines = Vec::new();
        for line in reader.split(b'\n') {
            let line = line?;
            let line = line.strip_suffix(b"\r").unwrap_or(&line);
            lines.push(String::from_utf8_lossy(line).into_owned());
        }
        let metadata = Self::from_lines(&file_name, &lines);
        debug!("Metadata for {}: {metadata:?}", path.display());
        Ok(metadata)
    }

    /// Scan already-read lines of a script named `file_name`.
    #[must_use]
    pub fn from_lines<S: AsRef<str>>(file_name: &str, lines: &[S]) -> Self {
        let description = Regex::new(&format!(r"^# {}: (.*)$", regex::escape(file_name)))
            .ok()
            .and_then(|pattern| first_capture(&pattern, lines))
            .unwrap_or_default();
        let usage = lines.iter().find_map(|line| {
            USAGE
                .captures(line.as_ref())
                .and_then(|caps| Usage::parse(&caps[1]))
        });
        let example = first_capture(&EXAMPLE, lines);

        ScriptMetadata {
            description,
            usage,
            example,
        }
    }
}

fn first_capture<S: AsRef<str>>(pattern: &Regex, lines: &[S]) -> Option<String> {
    lines.iter().find_map(|line| {
        pattern
            .captures(line.as_ref())
            .map(|caps| caps[1].to_string())
    })
}

/// Render an example as shown in help: two spaces, the full invocation path,
/// then the annotation text.
#[must_use]
pub fn render_example(command_path: &[String], example: &str) -> String {
    format!("  {} {example}", command_path.join(" "))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::usage::ArgumentValidator;

    #[test]
    fn test_short_description() {
        let metadata = ScriptMetadata::from_lines("deploy", &["#", "# deploy: blah", "#"]);
        assert_eq!(metadata.description, "blah");
    }

    #[test]
    fn test_short_description_requires_own_name() {
        let metadata = ScriptMetadata::from_lines("deploy", &["# other: blah", "# deploy2: nope"]);
        assert_eq!(metadata.description, "");
    }

    #[test]
    fn test_short_description_escapes_name() {
        let metadata = ScriptMetadata::from_lines("a.b", &["# axb: wrong", "# a.b: right"]);
        assert_eq!(metadata.description, "right");
    }

    #[test]
    fn test_first_match_wins() {
        let metadata = ScriptMetadata::from_lines(
            "foo",
            &[
                "# foo: first",
                "# foo: second",
                "# example: one",
                "# example: two",
                "# usage: foo a",
                "# usage: foo a b",
            ],
        );
        assert_eq!(metadata.description, "first");
        assert_eq!(metadata.example.as_deref(), Some("one"));
        assert_eq!(
            metadata.usage.map(|usage| usage.validator),
            Some(ArgumentValidator::Exact(1))
        );
    }

    #[test]
    fn test_annotations_anywhere() {
        let metadata = ScriptMetadata::from_lines(
            "foo",
            &["#!/bin/sh", "echo hi", "", "# example: later"],
        );
        assert_eq!(metadata.example.as_deref(), Some("later"));
    }

    #[test]
    fn test_missing() {
        let metadata = ScriptMetadata::from_lines("foo", &["#", "#", "#"]);
        assert_eq!(metadata, ScriptMetadata::default());
    }

    #[test]
    fn test_empty_usage_is_skipped() {
        let metadata = ScriptMetadata::from_lines("foo", &["# usage: ", "# usage: bar x"]);
        assert_eq!(metadata.usage.map(|usage| usage.name), Some("bar".to_string()));
    }

    #[test]
    fn test_render_example() {
        let path = vec!["sd".to_string(), "group".to_string(), "foo".to_string()];
        assert_eq!(render_example(&path, "one two three"), "  sd group foo one two three");
    }

    #[test]
    fn test_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("test-script");
        std::fs::write(
            &path,
            "#!/bin/sh\r\n# test-script: blah\r\n# usage: test-script foo\n# example: one two\n",
        )
        .unwrap();
        let metadata = ScriptMetadata::from_file(&path).unwrap();
        assert_eq!(metadata.description, "blah");
        assert_eq!(metadata.example.as_deref(), Some("one two"));
        assert_eq!(
            metadata.usage.map(|usage| usage.validator),
            Some(ArgumentValidator::Exact(1))
        );
    }

    #[test]
    fn test_from_file_with_binary_content() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tool");
        std::fs::write(&path, b"\x7fELF\xff\xfe\n# tool: binary\n").unwrap();
        let metadata = ScriptMetadata::from_file(&path).unwrap();
        assert_eq!(metadata.description, "binary");
    }

    #[test]
    fn test_from_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        assert!(ScriptMetadata::from_file(&dir.path().join("nope")).is_err());
    }
}
