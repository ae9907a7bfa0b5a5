//! # mtype-scheme — Structural Validation for Media Types
//!
//! Declares the expected shape of a document as a tree of rules and checks
//! decoded documents against it.
//!
//! ## Pipeline
//!
//! Every node of a [`Scheme`] runs the same three guards: the node must
//! have the expected shape, must not be empty unless emptiness is allowed,
//! and must contain every required key. Each key is dispatched to the
//! [`Rule`] it is bound to, or to the default rule, or to the implicit
//! missing-validation rule that rejects unknown keys in strict mode.
//!
//! ## Declaring
//!
//! Schemes are declared through a [`SchemeBuilder`] and frozen into an
//! `Arc<Scheme>`. A [`Validations`] registry files schemes under media type
//! identities and derives versions and views from a shared base.
//!
//! ## Self-checking
//!
//! Fixtures recorded with `assert_pass` and `assert_fail` are checked by
//! [`Scheme::assert_sane`], which reports every mismatch in the tree at
//! once, each with the file and line it was declared on.
//!
//! ## Crate Policy
//!
//! - Depends only on `mtype-core` internally.
//! - Built schemes are immutable and can be shared across threads.
//! - Declaration mistakes are [`SchemeError`]s raised while building;
//!   validation only ever returns [`ValidationError`]s.

pub mod error;
pub mod fixture;
mod guards;
pub mod links;
pub mod options;
pub mod registry;
pub mod rule;
pub mod rules;
pub mod scheme;
pub mod value_type;

pub use error::{
    DefaultRuleConflict, DuplicateKeyKind, FixtureAssertionError, SchemeError, ValidationError,
};
pub use fixture::{Fixture, FixtureFailure, FixtureOutcome};
pub use links::Links;
pub use options::{KeyPath, Segment, ValidationOptions};
pub use registry::{RegistryLookup, Validations, ValidationsBuilder};
pub use rule::{Attribute, EnumerationContext, EnumerationOfType, ItemRule, Rule};
pub use rules::{Optionality, RuleEntry, Rules};
pub use scheme::{AnyDef, AttributeDef, Block, CollectionDef, LinkDef, Scheme, SchemeBuilder};
pub use value_type::{CustomType, ValueType};
