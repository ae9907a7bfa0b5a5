//! # Key-Type Scopes
//!
//! Every namespace that defines schemes may declare, once, whether its
//! documents use symbolic or textual keys. Undeclared scopes inherit from
//! their parent; the root of a chain with no declaration resolves to
//! symbolic keys.
//!
//! ## Consulted-once
//!
//! The first call to [`KeyTypeScope::key_type`] on a level caches the
//! answer for that level and every ancestor it consulted. A later
//! [`KeyTypeScope::expect`] on any of those levels fails with
//! [`KeyTypeExpectationError::AlreadyUsed`], so fixtures checked before
//! and after the declaration cannot disagree.
//!
//! Scopes form an explicit parent chain (`Arc<KeyTypeScope>`); there is no
//! global registry of namespaces.

use std::sync::Arc;

use parking_lot::Mutex;

use crate::document::KeyType;
use crate::error::KeyTypeExpectationError;

#[derive(Debug, Default)]
struct ScopeState {
    declared: Option<KeyType>,
    resolved: Option<KeyType>,
}

/// One level in a key-type inheritance chain.
#[derive(Debug)]
pub struct KeyTypeScope {
    name: String,
    parent: Option<Arc<KeyTypeScope>>,
    state: Mutex<ScopeState>,
}

impl KeyTypeScope {
    /// Create a top-level scope.
    pub fn root(name: impl Into<String>) -> Arc<Self> {
        Arc::new(Self {
            name: name.into(),
            parent: None,
            state: Mutex::new(ScopeState::default()),
        })
    }

    /// Create a scope nested in this one. Its name is `parent::child`.
    pub fn child(self: &Arc<Self>, name: &str) -> Arc<Self> {
        Arc::new(Self {
            name: format!("{}::{name}", self.name),
            parent: Some(Arc::clone(self)),
            state: Mutex::new(ScopeState::default()),
        })
    }

    /// Fully qualified name of this scope.
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn parent(&self) -> Option<&Arc<KeyTypeScope>> {
        self.parent.as_ref()
    }

    /// Declare the key type of this level.
    pub fn expect(&self, key_type: KeyType) -> Result<(), KeyTypeExpectationError> {
        let mut state = self.state.lock();
        if state.declared.is_some() {
            return Err(KeyTypeExpectationError::AlreadySet {
                scope: self.name.clone(),
            });
        }
        if state.resolved.is_some() {
            return Err(KeyTypeExpectationError::AlreadyUsed {
                scope: self.name.clone(),
            });
        }
        state.declared = Some(key_type);
        Ok(())
    }

    pub fn expect_symbol_keys(&self) -> Result<(), KeyTypeExpectationError> {
        self.expect(KeyType::Symbol)
    }

    pub fn expect_text_keys(&self) -> Result<(), KeyTypeExpectationError> {
        self.expect(KeyType::Text)
    }

    /// Resolve the key type of this level and lock it.
    pub fn key_type(&self) -> KeyType {
        let mut state = self.state.lock();
        if let Some(resolved) = state.resolved {
            return resolved;
        }
        let resolved = match state.declared {
            Some(declared) => declared,
            None => self
                .parent
                .as_ref()
                .map_or(KeyType::Symbol, |parent| parent.key_type()),
        };
        state.resolved = Some(resolved);
        resolved
    }

    pub fn symbol_keys(&self) -> bool {
        self.key_type().is_symbol()
    }

    pub fn text_keys(&self) -> bool {
        self.key_type().is_text()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_to_symbol() {
        let scope = KeyTypeScope::root("Song");
        assert!(scope.symbol_keys());
    }

    #[test]
    fn test_declared_type_is_returned() {
        let scope = KeyTypeScope::root("Song");
        scope.expect_text_keys().unwrap();
        assert!(scope.text_keys());
    }

    #[test]
    fn test_second_declaration_is_rejected() {
        let scope = KeyTypeScope::root("Song");
        scope.expect_text_keys().unwrap();
        let err = scope.expect_symbol_keys().unwrap_err();
        assert_eq!(
            err,
            KeyTypeExpectationError::AlreadySet {
                scope: "Song".into()
            }
        );
    }

    #[test]
    fn test_declaration_after_use_is_rejected() {
        let scope = KeyTypeScope::root("Song");
        assert_eq!(scope.key_type(), KeyType::Symbol);
        let err = scope.expect_text_keys().unwrap_err();
        assert!(matches!(err, KeyTypeExpectationError::AlreadyUsed { .. }));
    }

    #[test]
    fn test_child_name_is_qualified() {
        let outer = KeyTypeScope::root("Outer");
        let inner = outer.child("Inner");
        assert_eq!(inner.name(), "Outer::Inner");
    }

    #[test]
    fn test_concurrent_resolution_agrees() {
        let outer = KeyTypeScope::root("Outer");
        outer.expect_text_keys().unwrap();
        let handles: Vec<_> = (0..8)
            .map(|i| {
                let scope = outer.child(&format!("Inner{i}"));
                std::thread::spawn(move || scope.key_type())
            })
            .collect();
        for handle in handles {
            assert_eq!(handle.join().unwrap(), KeyType::Text);
        }
        assert!(outer.expect_symbol_keys().is_err());
    }

    #[test]
    fn test_resolving_child_locks_ancestors() {
        let outer = KeyTypeScope::root("Outer");
        let inner = outer.child("Inner");
        assert!(inner.symbol_keys());
        assert!(matches!(
            outer.expect_text_keys(),
            Err(KeyTypeExpectationError::AlreadyUsed { .. })
        ));
    }
}
