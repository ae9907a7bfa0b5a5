//! # Error Types
//!
//! Two families, kept apart because they are handled differently:
//!
//! - [`ValidationError`]: a document does not satisfy a scheme. Returned by
//!   `validate`, folded into a boolean by `valid`, and collected per
//!   fixture by `assert_sane`.
//! - [`SchemeError`]: a scheme was declared incorrectly. Raised while
//!   building and never produced by validation.
//!
//! Every validation error carries the [`KeyPath`] of the failing node so
//! messages point at `foo.bar[0].baz` rather than at the document root.

use std::fmt;

use mtype_core::{KeyType, KeyTypeExpectationError};
use thiserror::Error;

use crate::fixture::FixtureFailure;
use crate::options::KeyPath;

fn join(keys: &[String]) -> String {
    if keys.is_empty() {
        return "(none)".to_string();
    }
    keys.join(", ")
}

/// A document failed validation.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// The container shape of a node does not match the expected type.
    #[error("{path}: expected {expected}, got {actual}")]
    OutputTypeMismatch {
        /// Path of the failing node.
        path: KeyPath,
        /// The expected type.
        expected: String,
        /// The kind of node actually found.
        actual: String,
    },

    /// A node is empty but emptiness is not permitted.
    #[error("{path}: expected contents but the output was empty; required keys are {}", join(.required))]
    EmptyOutput {
        /// Path of the failing node.
        path: KeyPath,
        /// Keys that were required at the node.
        required: Vec<String>,
    },

    /// A node is missing required keys.
    #[error("{path}: missing keys in output: {}", join(.missing))]
    ExhaustedOutput {
        /// Path of the failing node.
        path: KeyPath,
        /// Required keys that were not present.
        missing: Vec<String>,
    },

    /// A declared link, or a required key of a link object, is absent.
    ///
    /// Links are always checked exhaustively, so unlike
    /// [`ValidationError::ExhaustedOutput`] this never counts as valid.
    #[error("{path}: missing link keys: {}", join(.missing))]
    IncompleteLink {
        /// Path of the `_links` object or of the link object.
        path: KeyPath,
        /// Required links or link keys that were not present.
        missing: Vec<String>,
    },

    /// A key with no rule was found while strict mode is active.
    #[error("{path}: unknown key {key}; expected one of {}, found {}", join(.expected), join(.found))]
    StrictValidation {
        /// Path of the unknown key.
        path: KeyPath,
        /// The unknown key as it appeared in the document.
        key: String,
        /// Keys bound by the scheme at that node.
        expected: Vec<String>,
        /// Keys present in the document at that node.
        found: Vec<String>,
    },

    /// A scalar attribute does not satisfy its type.
    #[error("{path}: expected {expected}, got {actual}")]
    AttributeTypeMismatch {
        /// Path of the failing attribute.
        path: KeyPath,
        /// The expected type.
        expected: String,
        /// The rendered value actually found.
        actual: String,
    },

    /// A collection's container or item shape is wrong.
    #[error("{path}: expected collection of {expected}, got {actual}")]
    CollectionType {
        /// Path of the collection or of the failing item.
        path: KeyPath,
        /// The expected container or item type.
        expected: String,
        /// The rendered value actually found.
        actual: String,
    },

    /// A key's lexical form does not match the expected key type.
    #[error("{path}: key {key} is a {actual} key, expected a {expected} key")]
    KeyType {
        /// Path of the offending key.
        path: KeyPath,
        /// The key as it appeared in the document.
        key: String,
        /// The key type the scheme expects.
        expected: KeyType,
        /// The key type found in the document.
        actual: KeyType,
    },
}

impl ValidationError {
    /// Path of the node that failed.
    pub fn path(&self) -> &KeyPath {
        match self {
            ValidationError::OutputTypeMismatch { path, .. }
            | ValidationError::EmptyOutput { path, .. }
            | ValidationError::ExhaustedOutput { path, .. }
            | ValidationError::IncompleteLink { path, .. }
            | ValidationError::StrictValidation { path, .. }
            | ValidationError::AttributeTypeMismatch { path, .. }
            | ValidationError::CollectionType { path, .. }
            | ValidationError::KeyType { path, .. } => path,
        }
    }

    /// Whether this is a missing-required-keys failure.
    pub fn is_exhausted(&self) -> bool {
        matches!(self, ValidationError::ExhaustedOutput { .. })
    }
}

/// The shape of a duplicate key collision: earlier form, then later form.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DuplicateKeyKind {
    /// A symbol key declared twice.
    SymbolThenSymbol,
    /// A string key declared twice.
    TextThenText,
    /// A symbol key redeclared as a string.
    SymbolThenText,
    /// A string key redeclared as a symbol.
    TextThenSymbol,
}

impl DuplicateKeyKind {
    /// Classify a collision from the two lexical forms.
    pub fn of(existing: KeyType, added: KeyType) -> Self {
        match (existing, added) {
            (KeyType::Symbol, KeyType::Symbol) => DuplicateKeyKind::SymbolThenSymbol,
            (KeyType::Text, KeyType::Text) => DuplicateKeyKind::TextThenText,
            (KeyType::Symbol, KeyType::Text) => DuplicateKeyKind::SymbolThenText,
            (KeyType::Text, KeyType::Symbol) => DuplicateKeyKind::TextThenSymbol,
        }
    }
}

impl fmt::Display for DuplicateKeyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DuplicateKeyKind::SymbolThenSymbol => write!(f, "symbol key declared twice"),
            DuplicateKeyKind::TextThenText => write!(f, "string key declared twice"),
            DuplicateKeyKind::SymbolThenText => {
                write!(f, "string key collides with an existing symbol key")
            }
            DuplicateKeyKind::TextThenSymbol => {
                write!(f, "symbol key collides with an existing string key")
            }
        }
    }
}

/// The shape of a default-rule conflict: existing default, then new one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DefaultRuleConflict {
    /// `not_strict` declared twice.
    DuplicateNotStrict,
    /// `not_strict` declared after `any`.
    NotStrictOverwritingAny,
    /// `any` declared after `not_strict`.
    AnyOverwritingNotStrict,
    /// `any` declared twice.
    DuplicateAny,
}

impl fmt::Display for DefaultRuleConflict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DefaultRuleConflict::DuplicateNotStrict => write!(f, "not_strict was already declared"),
            DefaultRuleConflict::NotStrictOverwritingAny => {
                write!(f, "not_strict cannot overwrite an existing any rule")
            }
            DefaultRuleConflict::AnyOverwritingNotStrict => {
                write!(f, "any cannot overwrite an existing not_strict rule")
            }
            DefaultRuleConflict::DuplicateAny => write!(f, "any was already declared"),
        }
    }
}

/// A scheme was declared incorrectly.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SchemeError {
    /// A key was bound twice after normalization.
    #[error("duplicate key {key}: {kind}")]
    DuplicateKey {
        /// The later declaration, rendered with its lexical form.
        key: String,
        /// Which of the four collision shapes occurred.
        kind: DuplicateKeyKind,
    },

    /// A default rule conflicts with one already set.
    #[error("conflicting default rule: {0}")]
    ConflictingDefaultRule(DefaultRuleConflict),

    /// A block was combined with a non-map type, a scheme, or `allow_nil`.
    #[error("conflicting type definition for {key}: a block can only define a map; remove the type or the block")]
    ConflictingTypeDefinition {
        /// The key being declared.
        key: String,
    },

    /// A collection refers to a view that is not registered.
    #[error("collection definition not found: {current} refers to {target}, which is not registered")]
    CollectionDefinitionNotFound {
        /// The media type being declared.
        current: String,
        /// The media type that was referenced.
        target: String,
    },

    /// A key cannot be used.
    #[error("invalid key {key:?}: {reason}")]
    InvalidKey {
        /// The rejected key.
        key: String,
        /// Why it was rejected.
        reason: String,
    },

    /// Two registry entries share a canonical identity.
    #[error("validations for {0} are already registered")]
    DuplicateIdentity(String),

    /// A key-type expectation was declared incorrectly.
    #[error(transparent)]
    KeyTypeExpectation(#[from] KeyTypeExpectationError),
}

/// One or more fixtures did not behave as declared.
#[derive(Error, Debug)]
#[error("{} fixture(s) failed:\n{}", .failures.len(), render_failures(.failures))]
pub struct FixtureAssertionError {
    /// Every mismatch found in the walk.
    pub failures: Vec<FixtureFailure>,
}

fn render_failures(failures: &[FixtureFailure]) -> String {
    failures
        .iter()
        .map(|failure| format!("  - {failure}"))
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::options::Segment;

    #[test]
    fn test_error_messages_include_path() {
        let err = ValidationError::ExhaustedOutput {
            path: KeyPath::from(vec![Segment::key("foo"), Segment::Index(0)]),
            missing: vec!["bar".into()],
        };
        assert_eq!(err.to_string(), "foo[0]: missing keys in output: bar");
        assert!(err.is_exhausted());
    }

    #[test]
    fn test_root_path_renders_as_root() {
        let err = ValidationError::EmptyOutput {
            path: KeyPath::default(),
            required: vec![],
        };
        assert!(err.to_string().starts_with("(root):"));
    }

    #[test]
    fn test_validation_error_is_std_error() {
        let err: Box<dyn std::error::Error> = Box::new(ValidationError::IncompleteLink {
            path: KeyPath::from(vec![Segment::key("_links")]),
            missing: vec!["next".into()],
        });
        assert!(err.source().is_none());
        assert_eq!(err.to_string(), "_links: missing link keys: next");
    }

    #[test]
    fn test_incomplete_link_is_not_exhausted() {
        let err = ValidationError::IncompleteLink {
            path: KeyPath::default(),
            missing: vec!["href".into()],
        };
        assert!(!err.is_exhausted());
        assert!(err.path().is_root());
    }

    #[test]
    fn test_duplicate_key_kind_classification() {
        assert_eq!(
            DuplicateKeyKind::of(KeyType::Symbol, KeyType::Text),
            DuplicateKeyKind::SymbolThenText
        );
        assert_eq!(
            DuplicateKeyKind::of(KeyType::Text, KeyType::Text),
            DuplicateKeyKind::TextThenText
        );
    }
}
