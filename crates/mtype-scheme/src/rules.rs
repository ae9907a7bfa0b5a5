//! # Rules
//!
//! The key-to-rule bindings of one scheme node, plus the optional and
//! loose key sets and at most one default rule.
//!
//! Keys are unique after normalization: `Key::symbol("foo")` and
//! `Key::text("foo")` collide. The declared form is kept so collisions can
//! be reported precisely.

use std::collections::BTreeSet;
use std::fmt;

use mtype_core::Key;

use crate::error::{DefaultRuleConflict, DuplicateKeyKind, SchemeError};
use crate::rule::Rule;

static MISSING_VALIDATION: Rule = Rule::MissingValidation;

/// Whether a bound key has to be present.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Optionality {
    /// The key must be present.
    #[default]
    Required,
    /// The key may be absent.
    Optional,
    /// The key must be present, except in loose validation.
    Loose,
}

/// One key binding.
#[derive(Debug, Clone)]
pub struct RuleEntry {
    pub key: Key,
    pub rule: Rule,
}

#[derive(Debug, Clone, Default)]
pub struct Rules {
    entries: Vec<RuleEntry>,
    optional: BTreeSet<String>,
    loose: BTreeSet<String>,
    default: Option<Box<Rule>>,
}

impl Rules {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rules that bind nothing and accept any key.
    pub(crate) fn permissive() -> Self {
        Self {
            default: Some(Box::new(Rule::NotStrict)),
            ..Self::default()
        }
    }

    /// Bind `key` to `rule`.
    pub fn add(
        &mut self,
        key: Key,
        rule: Rule,
        optionality: Optionality,
    ) -> Result<&mut Self, SchemeError> {
        if key.name().is_empty() {
            return Err(SchemeError::InvalidKey {
                key: key.to_string(),
                reason: "keys must not be empty".to_string(),
            });
        }
        if let Some(existing) = self.entry(key.name()) {
            return Err(SchemeError::DuplicateKey {
                key: key.to_string(),
                kind: DuplicateKeyKind::of(existing.key.key_type(), key.key_type()),
            });
        }
        match optionality {
            Optionality::Required => {}
            Optionality::Optional => {
                self.optional.insert(key.name().to_string());
            }
            Optionality::Loose => {
                self.loose.insert(key.name().to_string());
            }
        }
        self.entries.push(RuleEntry { key, rule });
        Ok(self)
    }

    fn entry(&self, name: &str) -> Option<&RuleEntry> {
        self.entries.iter().find(|entry| entry.key.name() == name)
    }

    /// The explicit binding for `name`, in either key form.
    pub fn get(&self, name: &str) -> Option<&Rule> {
        self.entry(name).map(|entry| &entry.rule)
    }

    pub(crate) fn get_mut(&mut self, name: &str) -> Option<&mut Rule> {
        self.entries
            .iter_mut()
            .find(|entry| entry.key.name() == name)
            .map(|entry| &mut entry.rule)
    }

    /// The rule that applies to `name`: its binding, else the default rule,
    /// else the implicit missing-validation rule.
    pub fn resolve(&self, name: &str) -> &Rule {
        self.get(name)
            .or(self.default.as_deref())
            .unwrap_or(&MISSING_VALIDATION)
    }

    pub fn default_rule(&self) -> Option<&Rule> {
        self.default.as_deref()
    }

    /// Set the default rule. A default can be set once; `not_strict` and
    /// `any` exclude each other.
    pub fn set_default(&mut self, rule: Rule) -> Result<&mut Self, SchemeError> {
        if let Some(existing) = &self.default {
            let conflict = match (existing.is_not_strict(), rule.is_not_strict()) {
                (true, true) => DefaultRuleConflict::DuplicateNotStrict,
                (false, true) => DefaultRuleConflict::NotStrictOverwritingAny,
                (true, false) => DefaultRuleConflict::AnyOverwritingNotStrict,
                (false, false) => DefaultRuleConflict::DuplicateAny,
            };
            return Err(SchemeError::ConflictingDefaultRule(conflict));
        }
        self.default = Some(Box::new(rule));
        Ok(self)
    }

    /// Names of keys that must be present. Loose keys are excluded only in
    /// loose mode.
    pub fn required(&self, loose: bool) -> Vec<String> {
        self.entries
            .iter()
            .map(|entry| entry.key.name())
            .filter(|name| !self.optional.contains(*name))
            .filter(|name| !(loose && self.loose.contains(*name)))
            .map(str::to_string)
            .collect()
    }

    /// Bound keys in declaration order.
    pub fn keys(&self) -> impl Iterator<Item = &Key> {
        self.entries.iter().map(|entry| &entry.key)
    }

    pub fn iter(&self) -> impl Iterator<Item = &RuleEntry> {
        self.entries.iter()
    }

    pub fn optional_keys(&self) -> &BTreeSet<String> {
        &self.optional
    }

    pub fn loose_keys(&self) -> &BTreeSet<String> {
        &self.loose
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// A new `Rules` with `other` layered on top of `self`.
    ///
    /// Colliding keys take the binding from `other` in the position of the
    /// original. Optional and loose sets are unioned. `self`'s default
    /// rule wins; `other`'s is used when `self` has none.
    pub fn merge(&self, other: &Rules) -> Rules {
        let mut merged = self.clone();
        for entry in &other.entries {
            match merged
                .entries
                .iter_mut()
                .find(|existing| existing.key.name() == entry.key.name())
            {
                Some(existing) => *existing = entry.clone(),
                None => merged.entries.push(entry.clone()),
            }
        }
        merged.optional.extend(other.optional.iter().cloned());
        merged.loose.extend(other.loose.iter().cloned());
        if merged.default.is_none() {
            merged.default = other.default.clone();
        }
        merged
    }
}

impl fmt::Display for Rules {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{")?;
        for (i, entry) in self.entries.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            let marker = if self.optional.contains(entry.key.name()) {
                "?"
            } else if self.loose.contains(entry.key.name()) {
                "~"
            } else {
                ""
            };
            write!(f, "{}{marker}: {}", entry.key.name(), entry.rule)?;
        }
        if let Some(default) = &self.default {
            if !self.entries.is_empty() {
                write!(f, ", ")?;
            }
            write!(f, "*: {default}")?;
        }
        write!(f, "}}")
    }
}
