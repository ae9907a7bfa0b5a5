//! # Validation Options
//!
//! Per-call settings and the path of the node being checked.
//!
//! Options are never mutated during a walk. Descending into a child
//! derives a new value with [`ValidationOptions::trace`], so sibling
//! branches never see each other's path segments.

use std::fmt;

use mtype_core::{Document, Key, KeyType};

/// One step in a path through a document.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Segment {
    /// A map key, by normalized name.
    Key(String),
    /// A list position.
    Index(usize),
}

impl Segment {
    pub fn key(name: impl Into<String>) -> Self {
        Segment::Key(name.into())
    }
}

impl From<&Key> for Segment {
    fn from(key: &Key) -> Self {
        Segment::Key(key.name().to_string())
    }
}

impl From<usize> for Segment {
    fn from(index: usize) -> Self {
        Segment::Index(index)
    }
}

/// The path from the document root to a node.
///
/// Renders as `foo.bar[0].baz`, or `(root)` for the root itself.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct KeyPath(Vec<Segment>);

impl KeyPath {
    pub fn segments(&self) -> &[Segment] {
        &self.0
    }

    pub fn is_root(&self) -> bool {
        self.0.is_empty()
    }

    /// A new path extended by one segment.
    pub fn join(&self, segment: impl Into<Segment>) -> Self {
        let mut segments = self.0.clone();
        segments.push(segment.into());
        KeyPath(segments)
    }

    /// Follow this path from `root`, matching keys in either lexical form.
    pub fn resolve<'d>(&self, root: &'d Document) -> Option<&'d Document> {
        self.0.iter().try_fold(root, |node, segment| match segment {
            Segment::Key(name) => node.get(name),
            Segment::Index(index) => node.index(*index),
        })
    }
}

impl From<Vec<Segment>> for KeyPath {
    fn from(segments: Vec<Segment>) -> Self {
        KeyPath(segments)
    }
}

impl fmt::Display for KeyPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.is_empty() {
            return write!(f, "(root)");
        }
        for (i, segment) in self.0.iter().enumerate() {
            match segment {
                Segment::Key(name) if i == 0 => write!(f, "{name}")?,
                Segment::Key(name) => write!(f, ".{name}")?,
                Segment::Index(index) => write!(f, "[{index}]")?,
            }
        }
        Ok(())
    }
}

/// Settings for one top-level validation call.
///
/// | Setting | Default | Effect |
/// |---|---|---|
/// | `exhaustive` | `true` | required keys must be present |
/// | `strict` | `true` | keys without a rule are rejected |
/// | `loose` | `false` | keys declared loose are not required |
/// | `expected_key_type` | symbol | lexical form every key must use |
#[derive(Debug, Clone)]
pub struct ValidationOptions<'d> {
    exhaustive: bool,
    strict: bool,
    loose: bool,
    expected_key_type: KeyType,
    context: Option<&'d Document>,
    path: KeyPath,
}

impl Default for ValidationOptions<'_> {
    fn default() -> Self {
        Self {
            exhaustive: true,
            strict: true,
            loose: false,
            expected_key_type: KeyType::Symbol,
            context: None,
            path: KeyPath::default(),
        }
    }
}

impl<'d> ValidationOptions<'d> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn exhaustive(mut self, exhaustive: bool) -> Self {
        self.exhaustive = exhaustive;
        self
    }

    pub fn strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }

    pub fn loose(mut self, loose: bool) -> Self {
        self.loose = loose;
        self
    }

    pub fn expect_key_type(mut self, key_type: KeyType) -> Self {
        self.expected_key_type = key_type;
        self
    }

    /// Start the walk at `path` instead of the root.
    pub fn at_path(mut self, path: KeyPath) -> Self {
        self.path = path;
        self
    }

    pub fn is_exhaustive(&self) -> bool {
        self.exhaustive
    }

    pub fn is_strict(&self) -> bool {
        self.strict
    }

    pub fn is_loose(&self) -> bool {
        self.loose
    }

    pub fn expected_key_type(&self) -> KeyType {
        self.expected_key_type
    }

    pub fn path(&self) -> &KeyPath {
        &self.path
    }

    pub fn context(&self) -> Option<&'d Document> {
        self.context
    }

    /// Derive options for a child node.
    pub fn trace(&self, segment: impl Into<Segment>) -> Self {
        Self {
            path: self.path.join(segment),
            ..self.clone()
        }
    }

    /// Derive options with exhaustiveness switched on.
    pub fn force_exhaustive(&self) -> Self {
        Self {
            exhaustive: true,
            ..self.clone()
        }
    }

    /// Record the root document the path is relative to.
    pub fn with_context(self, context: &'d Document) -> Self {
        Self {
            context: Some(context),
            ..self
        }
    }

    /// The node under check, recovered by replaying the path on the
    /// recorded root. `None` without a root or when the path is not found.
    pub fn scoped_output(&self) -> Option<&'d Document> {
        self.path.resolve(self.context?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_defaults() {
        let options = ValidationOptions::default();
        assert!(options.is_exhaustive());
        assert!(options.is_strict());
        assert!(!options.is_loose());
        assert_eq!(options.expected_key_type(), KeyType::Symbol);
        assert!(options.path().is_root());
    }

    #[test]
    fn test_trace_does_not_mutate_parent() {
        let parent = ValidationOptions::default().trace(Segment::key("foo"));
        let child = parent.trace(2usize);
        assert_eq!(parent.path().to_string(), "foo");
        assert_eq!(child.path().to_string(), "foo[2]");
    }

    #[test]
    fn test_key_path_rendering() {
        let path = KeyPath::from(vec![
            Segment::key("foo"),
            Segment::key("bar"),
            Segment::Index(0),
            Segment::key("baz"),
        ]);
        assert_eq!(path.to_string(), "foo.bar[0].baz");
        assert_eq!(KeyPath::default().to_string(), "(root)");
    }

    #[test]
    fn test_force_exhaustive_keeps_other_settings() {
        let options = ValidationOptions::default()
            .exhaustive(false)
            .strict(false)
            .trace(Segment::key("a"));
        let forced = options.force_exhaustive();
        assert!(forced.is_exhaustive());
        assert!(!forced.is_strict());
        assert_eq!(forced.path(), options.path());
    }

    #[test]
    fn test_scoped_output_replays_path() {
        let doc = Document::textual(json!({"foo": [{"bar": 1}, {"bar": 2}]}));
        let options = ValidationOptions::default()
            .with_context(&doc)
            .trace(Segment::key("foo"))
            .trace(1usize)
            .trace(Segment::key("bar"));
        assert_eq!(options.scoped_output(), Some(&Document::symbolic(json!(2))));
    }

    #[test]
    fn test_scoped_output_without_context() {
        assert!(ValidationOptions::default().scoped_output().is_none());
    }
}
