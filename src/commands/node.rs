use std::path::PathBuf;

use crate::commands::usage::ArgumentValidator;

/// A command in the tree: either a directory of commands or a single script
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandNode {
    pub name: String,
    pub short_help: String,
    pub kind: NodeKind,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeKind {
    Group(Group),
    Script(Script),
}

/// A directory, shown as a command that only prints its usage
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Group {
    /// Contents of the directory's README
    pub long_help: Option<String>,
    pub children: Vec<CommandNode>,
}

/// An executable file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Script {
    pub source: PathBuf,
    pub validator: ArgumentValidator,
    /// Argument part of the usage annotation, if there is one
    pub synopsis: Option<String>,
    /// Rendered example, empty when the script has none
    pub example: String,
}

impl CommandNode {
    #[must_use]
    pub fn as_group(&self) -> Option<&Group> {
        match &self.kind {
            NodeKind::Group(group) => Some(group),
            NodeKind::Script(_) => None,
        }
    }

    #[must_use]
    pub fn as_script(&self) -> Option<&Script> {
        match &self.kind {
            NodeKind::Script(script) => Some(script),
            NodeKind::Group(_) => None,
        }
    }

    /// Groups without children and without a README do nothing and are left
    /// out of help listings.
    #[must_use]
    pub fn is_inert(&self) -> bool {
        self.as_group()
            .is_some_and(|group| group.children.is_empty() && group.long_help.is_none())
    }

    /// Find a descendant by the names along its path, starting below `nodes`.
    #[must_use]
    pub fn find<'a, S: AsRef<str>>(nodes: &'a [CommandNode], path: &[S]) -> Option<&'a CommandNode> {
        let (first, rest) = path.split_first()?;
        let node = nodes.iter().find(|node| node.name == first.as_ref())?;
        if rest.is_empty() {
            return Some(node);
        }
        Self::find(&node.as_group()?.children, rest)
    }

    /// Number of scripts in this subtree.
    #[must_use]
    pub fn script_count(&self) -> usize {
        match &self.kind {
            NodeKind::Script(_) => 1,
            NodeKind::Group(group) => group.children.iter().map(CommandNode::script_count).sum(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_script(name: &str) -> CommandNode {
        CommandNode {
            name: name.to_string(),
            short_help: String::new(),
            kind: NodeKind::Script(Script {
                source: PathBuf::from("/scripts").join(name),
                validator: ArgumentValidator::Unbounded,
                synopsis: None,
                example: String::new(),
            }),
        }
    }

    fn make_group(name: &str, children: Vec<CommandNode>) -> CommandNode {
        CommandNode {
            name: name.to_string(),
            short_help: String::new(),
            kind: NodeKind::Group(Group {
                long_help: None,
                children,
            }),
        }
    }

    #[test]
    fn test_find_nested() {
        let tree = vec![
            make_script("top"),
            make_group("db", vec![make_group("backup", vec![make_script("run")])]),
        ];
        let node = CommandNode::find(&tree, &["db", "backup", "run"]).unwrap();
        assert_eq!(node.as_script().unwrap().source, PathBuf::from("/scripts/run"));
        assert!(CommandNode::find(&tree, &["db", "missing"]).is_none());
        assert!(CommandNode::find(&tree, &["top", "below"]).is_none());
        assert!(CommandNode::find::<&str>(&tree, &[]).is_none());
    }

    #[test]
    fn test_inert() {
        assert!(make_group("empty", vec![]).is_inert());
        assert!(!make_group("full", vec![make_script("a")]).is_inert());
        assert!(!make_script("a").is_inert());

        let mut documented = make_group("documented", vec![]);
        if let NodeKind::Group(group) = &mut documented.kind {
            group.long_help = Some("Docs\n".to_string());
        }
        assert!(!documented.is_inert());
    }

    #[test]
    fn test_script_count() {
        let tree = make_group(
            "root",
            vec![make_script("a"), make_group("g", vec![make_script("b"), make_script("c")])],
        );
        assert_eq!(tree.script_count(), 3);
    }
}
