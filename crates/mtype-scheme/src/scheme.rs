//! # Schemes
//!
//! A [`Scheme`] is an immutable rule tree for one document node. It is
//! assembled by a [`SchemeBuilder`], whose methods mirror the declaration
//! vocabulary:
//!
//! | Method | Binds |
//! |---|---|
//! | `attribute` | a typed value, or a nested map scheme with a block |
//! | `collection` | a list of typed items, of a scheme, or of a block scheme |
//! | `any` | the default rule for every undeclared key |
//! | `not_strict` | a default that accepts any undeclared key |
//! | `link` | a named entry in `_links` requiring an `href` |
//! | `assert_pass` / `assert_fail` | a fixture checked by `assert_sane` |
//!
//! ## Declaration errors
//!
//! Builder methods return `Result<&mut Self, SchemeError>`. A declaration
//! error is a programming mistake in the scheme, so it surfaces when the
//! scheme is built, never when a document is validated.
//!
//! ## Example
//!
//! ```
//! use mtype_core::Document;
//! use mtype_scheme::{AttributeDef, Scheme, ValidationOptions, ValueType};
//! use serde_json::json;
//!
//! let scheme = Scheme::build(|s| {
//!     s.attribute("str", ValueType::Text)?
//!         .attribute("maybe_num", AttributeDef::of(ValueType::Number).allow_nil())?;
//!     Ok(())
//! })
//! .unwrap();
//!
//! let doc = Document::symbolic(json!({"str": "Haddaway", "maybe_num": null}));
//! assert!(scheme.validate(&doc, &ValidationOptions::default()).is_ok());
//! ```

use std::panic::Location;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use mtype_core::{Document, Key};

use crate::error::{SchemeError, ValidationError};
use crate::fixture::Fixture;
use crate::guards;
use crate::links::Links;
use crate::options::ValidationOptions;
use crate::registry::RegistryLookup;
use crate::rule::{Attribute, EnumerationOfType, ItemRule, Rule};
use crate::rules::{Optionality, Rules};
use crate::value_type::ValueType;

/// A nested declaration block.
pub type Block<'a> = Box<dyn FnOnce(&mut SchemeBuilder) -> Result<(), SchemeError> + 'a>;

/// An immutable rule tree for one document node.
#[derive(Debug)]
pub struct Scheme {
    rules: Rules,
    expected_type: ValueType,
    allow_empty: bool,
    fixtures: Vec<Fixture>,
    asserted_sane: AtomicBool,
}

impl Scheme {
    /// Build a top-level scheme. The root accepts any shape.
    pub fn build<F>(f: F) -> Result<Arc<Scheme>, SchemeError>
    where
        F: FnOnce(&mut SchemeBuilder) -> Result<(), SchemeError>,
    {
        let mut builder = Scheme::builder();
        f(&mut builder)?;
        Ok(builder.build())
    }

    pub fn builder() -> SchemeBuilder {
        SchemeBuilder::new(ValueType::Any, false)
    }

    /// A scheme that accepts every document, including empty ones.
    pub fn permissive() -> Arc<Scheme> {
        Arc::new(Scheme {
            rules: Rules::permissive(),
            expected_type: ValueType::Any,
            allow_empty: true,
            fixtures: Vec::new(),
            asserted_sane: AtomicBool::new(false),
        })
    }

    pub fn rules(&self) -> &Rules {
        &self.rules
    }

    pub fn expected_type(&self) -> &ValueType {
        &self.expected_type
    }

    pub fn allow_empty(&self) -> bool {
        self.allow_empty
    }

    pub fn fixtures(&self) -> &[Fixture] {
        &self.fixtures
    }

    /// Whether the last `assert_sane` over this scheme found no failures.
    pub fn asserted_sane(&self) -> bool {
        self.asserted_sane.load(Ordering::Acquire)
    }

    pub(crate) fn mark_sane(&self) {
        self.asserted_sane.store(true, Ordering::Release);
    }

    /// Validate a document.
    pub fn validate(
        &self,
        output: &Document,
        options: &ValidationOptions<'_>,
    ) -> Result<(), ValidationError> {
        let options = options.clone();
        let options = if options.context().is_some() {
            options
        } else {
            options.with_context(output)
        };

        let result = self.validate_node(output, &options);
        if let Err(err) = &result {
            let found = options
                .clone()
                .at_path(err.path().clone())
                .scoped_output()
                .map(Document::kind)
                .unwrap_or("nothing");
            tracing::debug!(path = %err.path(), found, error = %err, "document failed validation");
        }
        result
    }

    /// Whether a document is valid.
    ///
    /// A missing-keys failure counts as valid when the call is not
    /// exhaustive; every other failure is invalid.
    pub fn valid(&self, output: &Document, options: &ValidationOptions<'_>) -> bool {
        match self.validate(output, options) {
            Ok(()) => true,
            Err(err) if err.is_exhausted() => !options.is_exhaustive(),
            Err(_) => false,
        }
    }

    pub(crate) fn validate_node(
        &self,
        output: &Document,
        options: &ValidationOptions<'_>,
    ) -> Result<(), ValidationError> {
        guards::validate_node(
            output,
            options,
            &self.rules,
            &self.expected_type,
            self.allow_empty,
        )
    }
}

// ---------------------------------------------------------------------------
// Declarations
// ---------------------------------------------------------------------------

/// Declaration of an attribute.
///
/// `ValueType` and `Arc<Scheme>` convert directly, so the common cases read
/// `s.attribute("name", ValueType::Text)`.
#[derive(Default)]
pub struct AttributeDef<'a> {
    value_type: Option<ValueType>,
    scheme: Option<Arc<Scheme>>,
    allow_nil: bool,
    optionality: Optionality,
    allow_empty: bool,
    block: Option<Block<'a>>,
}

impl<'a> AttributeDef<'a> {
    /// An attribute of any type.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn of(value_type: ValueType) -> Self {
        Self {
            value_type: Some(value_type),
            ..Self::default()
        }
    }

    /// A nested map declared by `block`.
    pub fn nested(block: impl FnOnce(&mut SchemeBuilder) -> Result<(), SchemeError> + 'a) -> Self {
        Self::new().block(block)
    }

    pub fn scheme(mut self, scheme: Arc<Scheme>) -> Self {
        self.scheme = Some(scheme);
        self
    }

    /// Accept null as well as the declared type.
    pub fn allow_nil(mut self) -> Self {
        self.allow_nil = true;
        self
    }

    pub fn optional(self) -> Self {
        self.optionality(Optionality::Optional)
    }

    pub fn loose(self) -> Self {
        self.optionality(Optionality::Loose)
    }

    pub fn optionality(mut self, optionality: Optionality) -> Self {
        self.optionality = optionality;
        self
    }

    /// Let the nested map be empty.
    pub fn allow_empty(mut self) -> Self {
        self.allow_empty = true;
        self
    }

    pub fn block(mut self, block: impl FnOnce(&mut SchemeBuilder) -> Result<(), SchemeError> + 'a) -> Self {
        self.block = Some(Box::new(block));
        self
    }
}

impl From<ValueType> for AttributeDef<'_> {
    fn from(value_type: ValueType) -> Self {
        AttributeDef::of(value_type)
    }
}

impl From<Arc<Scheme>> for AttributeDef<'_> {
    fn from(scheme: Arc<Scheme>) -> Self {
        AttributeDef::new().scheme(scheme)
    }
}

enum CollectionItem {
    Type(ValueType),
    Scheme(Arc<Scheme>),
    View(Option<String>),
}

/// Declaration of a collection.
///
/// Without an item type, a scheme, or a block, the items are validated by
/// the registered scheme of the default view of the media type being
/// defined.
pub struct CollectionDef<'a> {
    item: Option<CollectionItem>,
    container: ValueType,
    allow_empty: bool,
    optionality: Optionality,
    block: Option<Block<'a>>,
}

impl Default for CollectionDef<'_> {
    fn default() -> Self {
        Self {
            item: None,
            container: ValueType::List,
            allow_empty: false,
            optionality: Optionality::Required,
            block: None,
        }
    }
}

impl<'a> CollectionDef<'a> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Items of `value_type`.
    pub fn of(value_type: ValueType) -> Self {
        Self {
            item: Some(CollectionItem::Type(value_type)),
            ..Self::default()
        }
    }

    /// Items validated by a registered view of the media type being defined.
    /// `None` refers to the default view.
    pub fn view(view: Option<&str>) -> Self {
        Self {
            item: Some(CollectionItem::View(view.map(str::to_string))),
            ..Self::default()
        }
    }

    /// Items of the map shape declared by `block`.
    pub fn nested(block: impl FnOnce(&mut SchemeBuilder) -> Result<(), SchemeError> + 'a) -> Self {
        Self::new().block(block)
    }

    pub fn scheme(mut self, scheme: Arc<Scheme>) -> Self {
        self.item = Some(CollectionItem::Scheme(scheme));
        self
    }

    /// The container shape. Defaults to `ValueType::List`.
    pub fn container(mut self, container: ValueType) -> Self {
        self.container = container;
        self
    }

    pub fn allow_empty(mut self) -> Self {
        self.allow_empty = true;
        self
    }

    pub fn optional(self) -> Self {
        self.optionality(Optionality::Optional)
    }

    pub fn loose(self) -> Self {
        self.optionality(Optionality::Loose)
    }

    pub fn optionality(mut self, optionality: Optionality) -> Self {
        self.optionality = optionality;
        self
    }

    pub fn block(mut self, block: impl FnOnce(&mut SchemeBuilder) -> Result<(), SchemeError> + 'a) -> Self {
        self.block = Some(Box::new(block));
        self
    }
}

impl From<ValueType> for CollectionDef<'_> {
    fn from(value_type: ValueType) -> Self {
        CollectionDef::of(value_type)
    }
}

impl From<Arc<Scheme>> for CollectionDef<'_> {
    fn from(scheme: Arc<Scheme>) -> Self {
        CollectionDef::new().scheme(scheme)
    }
}

/// Declaration of the default rule for undeclared keys.
pub struct AnyDef<'a> {
    item: Option<ItemRule>,
    container: ValueType,
    allow_empty: bool,
    block: Option<Block<'a>>,
}

impl Default for AnyDef<'_> {
    fn default() -> Self {
        Self {
            item: None,
            container: ValueType::Map,
            allow_empty: false,
            block: None,
        }
    }
}

impl<'a> AnyDef<'a> {
    /// Any value under any key.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn nested(block: impl FnOnce(&mut SchemeBuilder) -> Result<(), SchemeError> + 'a) -> Self {
        Self::new().block(block)
    }

    /// The shape of the values a block declares. Defaults to `ValueType::Map`.
    pub fn container(mut self, container: ValueType) -> Self {
        self.container = container;
        self
    }

    pub fn allow_empty(mut self) -> Self {
        self.allow_empty = true;
        self
    }

    pub fn block(mut self, block: impl FnOnce(&mut SchemeBuilder) -> Result<(), SchemeError> + 'a) -> Self {
        self.block = Some(Box::new(block));
        self
    }
}

impl From<ValueType> for AnyDef<'_> {
    fn from(value_type: ValueType) -> Self {
        Self {
            item: Some(ItemRule::Type(value_type)),
            ..Self::default()
        }
    }
}

impl From<Arc<Scheme>> for AnyDef<'_> {
    fn from(scheme: Arc<Scheme>) -> Self {
        Self {
            item: Some(ItemRule::Scheme(scheme)),
            ..Self::default()
        }
    }
}

/// Declaration of a link.
#[derive(Default)]
pub struct LinkDef<'a> {
    allow_nil: bool,
    optionality: Optionality,
    block: Option<Block<'a>>,
}

impl<'a> LinkDef<'a> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Accept a null `href`.
    pub fn allow_nil(mut self) -> Self {
        self.allow_nil = true;
        self
    }

    pub fn optional(self) -> Self {
        self.optionality(Optionality::Optional)
    }

    pub fn loose(self) -> Self {
        self.optionality(Optionality::Loose)
    }

    pub fn optionality(mut self, optionality: Optionality) -> Self {
        self.optionality = optionality;
        self
    }

    /// Extra attributes of the link object.
    pub fn block(mut self, block: impl FnOnce(&mut SchemeBuilder) -> Result<(), SchemeError> + 'a) -> Self {
        self.block = Some(Box::new(block));
        self
    }
}

// ---------------------------------------------------------------------------
// Builder
// ---------------------------------------------------------------------------

/// Mutable builder for a [`Scheme`].
#[derive(Debug, Clone)]
pub struct SchemeBuilder {
    rules: Rules,
    expected_type: ValueType,
    allow_empty: bool,
    fixtures: Vec<Fixture>,
    lookup: Option<Arc<RegistryLookup>>,
}

impl SchemeBuilder {
    pub fn new(expected_type: ValueType, allow_empty: bool) -> Self {
        Self {
            rules: Rules::new(),
            expected_type,
            allow_empty,
            fixtures: Vec::new(),
            lookup: None,
        }
    }

    fn nested(&self, expected_type: ValueType, allow_empty: bool) -> SchemeBuilder {
        SchemeBuilder {
            lookup: self.lookup.clone(),
            ..SchemeBuilder::new(expected_type, allow_empty)
        }
    }

    pub(crate) fn set_lookup(&mut self, lookup: Arc<RegistryLookup>) {
        self.lookup = Some(lookup);
    }

    pub(crate) fn clear_fixtures(&mut self) {
        self.fixtures.clear();
    }

    pub fn rules(&self) -> &Rules {
        &self.rules
    }

    /// Bind `key` to a typed value, a scheme, or a nested map.
    pub fn attribute<'a>(
        &mut self,
        key: impl Into<Key>,
        def: impl Into<AttributeDef<'a>>,
    ) -> Result<&mut Self, SchemeError> {
        let key = key.into();
        let def = def.into();

        let rule = match def.block {
            Some(block) => {
                let typed = def.value_type.as_ref().is_some_and(|t| !t.is_map());
                if typed || def.scheme.is_some() || def.allow_nil {
                    return Err(SchemeError::ConflictingTypeDefinition {
                        key: key.to_string(),
                    });
                }
                let mut nested = self.nested(ValueType::Map, def.allow_empty);
                block(&mut nested)?;
                Rule::Scheme(nested.build())
            }
            None => match def.scheme {
                Some(scheme) => {
                    if def.value_type.is_some() || def.allow_nil {
                        return Err(SchemeError::ConflictingTypeDefinition {
                            key: key.to_string(),
                        });
                    }
                    Rule::Scheme(scheme)
                }
                None => Rule::Attribute(Attribute::new(
                    def.value_type.unwrap_or(ValueType::Any),
                    def.allow_nil,
                )),
            },
        };

        self.rules.add(key, rule, def.optionality)?;
        Ok(self)
    }

    /// Bind `key` to a collection.
    pub fn collection<'a>(
        &mut self,
        key: impl Into<Key>,
        def: impl Into<CollectionDef<'a>>,
    ) -> Result<&mut Self, SchemeError> {
        let key = key.into();
        let def = def.into();

        let rule = match def.block {
            Some(block) => {
                let conflicting = match &def.item {
                    None => false,
                    Some(CollectionItem::Type(t)) => !t.is_map(),
                    Some(CollectionItem::Scheme(_)) | Some(CollectionItem::View(_)) => true,
                };
                if conflicting {
                    return Err(SchemeError::ConflictingTypeDefinition {
                        key: key.to_string(),
                    });
                }
                let mut nested = self.nested(def.container, def.allow_empty);
                block(&mut nested)?;
                Rule::Scheme(nested.build())
            }
            None => {
                let item = match def.item.unwrap_or(CollectionItem::View(None)) {
                    CollectionItem::Type(t) => ItemRule::Type(t),
                    CollectionItem::Scheme(scheme) => ItemRule::Scheme(scheme),
                    CollectionItem::View(view) => ItemRule::Scheme(self.find_view(view.as_deref())?),
                };
                Rule::Enumeration(EnumerationOfType::new(item, def.container, def.allow_empty))
            }
        };

        self.rules.add(key, rule, def.optionality)?;
        Ok(self)
    }

    fn find_view(&self, view: Option<&str>) -> Result<Arc<Scheme>, SchemeError> {
        match &self.lookup {
            Some(lookup) => lookup.find_view(view),
            None => Err(SchemeError::CollectionDefinitionNotFound {
                current: "(unregistered scheme)".to_string(),
                target: view.unwrap_or("(default view)").to_string(),
            }),
        }
    }

    /// Set the rule for every undeclared key. Undeclared keys are never
    /// required.
    pub fn any<'a>(&mut self, def: impl Into<AnyDef<'a>>) -> Result<&mut Self, SchemeError> {
        let def = def.into();

        let rule = match def.block {
            Some(block) => {
                let conflicting = match &def.item {
                    None => false,
                    Some(ItemRule::Type(t)) => !t.is_map(),
                    Some(ItemRule::Scheme(_)) => true,
                };
                if conflicting {
                    return Err(SchemeError::ConflictingTypeDefinition {
                        key: "*".to_string(),
                    });
                }
                let mut nested = self.nested(def.container, def.allow_empty);
                block(&mut nested)?;
                Rule::Scheme(nested.build())
            }
            None => match def.item {
                Some(ItemRule::Scheme(scheme)) => Rule::Scheme(scheme),
                Some(ItemRule::Type(t)) => Rule::Attribute(Attribute::new(t, false)),
                None => Rule::Attribute(Attribute::new(ValueType::Any, false)),
            },
        };

        self.rules.set_default(rule)?;
        Ok(self)
    }

    /// Accept undeclared keys, in any key form, with any value.
    pub fn not_strict(&mut self) -> Result<&mut Self, SchemeError> {
        self.rules.set_default(Rule::NotStrict)?;
        Ok(self)
    }

    /// Declare a link under `_links`.
    pub fn link<'a>(
        &mut self,
        name: impl Into<Key>,
        def: impl Into<LinkDef<'a>>,
    ) -> Result<&mut Self, SchemeError> {
        let name = name.into();
        let def = def.into();

        let mut nested = self.nested(ValueType::Map, false);
        nested.rules.add(
            Key::symbol("href"),
            Rule::Attribute(Attribute::new(ValueType::Text, def.allow_nil)),
            Optionality::Required,
        )?;
        if let Some(block) = def.block {
            block(&mut nested)?;
        }
        let scheme = nested.build();

        if self.rules.get("_links").is_none() {
            self.rules
                .add(Key::symbol("_links"), Rule::Links(Links::new()), Optionality::Required)?;
        }
        match self.rules.get_mut("_links") {
            Some(Rule::Links(links)) => {
                links.add(name, scheme, def.optionality)?;
                Ok(self)
            }
            _ => Err(SchemeError::ConflictingTypeDefinition {
                key: "_links".to_string(),
            }),
        }
    }

    /// Declare an index: a `_links` list whose items each link to `_self`.
    pub fn index(&mut self, optionality: Optionality) -> Result<&mut Self, SchemeError> {
        self.collection(
            "_links",
            CollectionDef::nested(|s| {
                s.link("_self", LinkDef::new())?;
                Ok(())
            })
            .optionality(optionality),
        )
    }

    /// Absorb the rules of `other`. `other` is not changed.
    pub fn merge(&mut self, other: &Scheme) -> &mut Self {
        self.rules = self.rules.merge(other.rules());
        self
    }

    /// Absorb the rules of `other`, then continue declaring.
    pub fn merge_with<F>(&mut self, other: &Scheme, block: F) -> Result<&mut Self, SchemeError>
    where
        F: FnOnce(&mut SchemeBuilder) -> Result<(), SchemeError>,
    {
        self.merge(other);
        block(self)?;
        Ok(self)
    }

    /// Mark the node as intentionally rule-free.
    pub fn empty(&mut self) -> &mut Self {
        self
    }

    /// Record a fixture that must validate.
    #[track_caller]
    pub fn assert_pass(&mut self, text: impl Into<String>) -> &mut Self {
        self.push_fixture(text.into(), true, false, Location::caller())
    }

    /// Record a fixture that must fail validation.
    #[track_caller]
    pub fn assert_fail(&mut self, text: impl Into<String>) -> &mut Self {
        self.push_fixture(text.into(), false, false, Location::caller())
    }

    /// Record a fixture that must validate in loose mode.
    #[track_caller]
    pub fn assert_pass_loose(&mut self, text: impl Into<String>) -> &mut Self {
        self.push_fixture(text.into(), true, true, Location::caller())
    }

    /// Record a fixture that must fail validation in loose mode.
    #[track_caller]
    pub fn assert_fail_loose(&mut self, text: impl Into<String>) -> &mut Self {
        self.push_fixture(text.into(), false, true, Location::caller())
    }

    fn push_fixture(
        &mut self,
        text: String,
        expect_to_pass: bool,
        loose: bool,
        location: &'static Location<'static>,
    ) -> &mut Self {
        self.fixtures
            .push(Fixture::new(text, expect_to_pass, loose, location));
        self
    }

    /// Freeze into an immutable scheme.
    pub fn build(self) -> Arc<Scheme> {
        Arc::new(Scheme {
            rules: self.rules,
            expected_type: self.expected_type,
            allow_empty: self.allow_empty,
            fixtures: self.fixtures,
            asserted_sane: AtomicBool::new(false),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{DefaultRuleConflict, DuplicateKeyKind};
    use serde_json::json;

    fn doc(value: serde_json::Value) -> Document {
        Document::symbolic(value)
    }

    fn defaults() -> ValidationOptions<'static> {
        ValidationOptions::default()
    }

    #[test]
    fn test_attribute_types() {
        let scheme = Scheme::build(|s| {
            s.attribute("str", ValueType::Text)?
                .attribute("maybe_num", AttributeDef::of(ValueType::Number).allow_nil())?;
            Ok(())
        })
        .unwrap();
        assert!(scheme.valid(&doc(json!({"str": "a", "maybe_num": null})), &defaults()));
        assert!(scheme.valid(&doc(json!({"str": "a", "maybe_num": 4})), &defaults()));
        assert!(!scheme.valid(&doc(json!({"str": 1, "maybe_num": 4})), &defaults()));
    }

    #[test]
    fn test_attribute_block_conflicts_with_type() {
        let err = Scheme::build(|s| {
            s.attribute("foo", AttributeDef::of(ValueType::Text).block(|_| Ok(())))?;
            Ok(())
        })
        .unwrap_err();
        assert_eq!(
            err,
            SchemeError::ConflictingTypeDefinition {
                key: ":foo".into()
            }
        );
    }

    #[test]
    fn test_attribute_block_accepts_map_type() {
        let scheme = Scheme::build(|s| {
            s.attribute(
                "foo",
                AttributeDef::of(ValueType::Map).block(|s| {
                    s.attribute("bar", ValueType::Number)?;
                    Ok(())
                }),
            )?;
            Ok(())
        })
        .unwrap();
        assert!(scheme.valid(&doc(json!({"foo": {"bar": 1}})), &defaults()));
        assert!(!scheme.valid(&doc(json!({"foo": [{"bar": 1}]})), &defaults()));
    }

    #[test]
    fn test_duplicate_attribute() {
        let err = Scheme::build(|s| {
            s.attribute(Key::text("foo"), ValueType::Any)?
                .attribute(Key::text("foo"), ValueType::Any)?;
            Ok(())
        })
        .unwrap_err();
        assert!(matches!(
            err,
            SchemeError::DuplicateKey {
                kind: DuplicateKeyKind::TextThenText,
                ..
            }
        ));
    }

    #[test]
    fn test_any_and_not_strict_conflict() {
        let err = Scheme::build(|s| {
            s.any(ValueType::Number)?.not_strict()?;
            Ok(())
        })
        .unwrap_err();
        assert_eq!(
            err,
            SchemeError::ConflictingDefaultRule(DefaultRuleConflict::NotStrictOverwritingAny)
        );
    }

    #[test]
    fn test_collection_without_lookup_is_not_found() {
        let err = Scheme::build(|s| {
            s.collection("items", CollectionDef::new())?;
            Ok(())
        })
        .unwrap_err();
        assert!(matches!(err, SchemeError::CollectionDefinitionNotFound { .. }));
    }

    #[test]
    fn test_link_requires_href() {
        let scheme = Scheme::build(|s| {
            s.link("self", LinkDef::new())?;
            Ok(())
        })
        .unwrap();
        assert!(scheme.valid(&doc(json!({"_links": {"self": {"href": "https://x"}}})), &defaults()));
        assert!(!scheme.valid(&doc(json!({"_links": {"self": {}}})), &defaults()));
        assert!(!scheme.valid(&doc(json!({"_links": {"self": {"href": null}}})), &defaults()));
    }

    #[test]
    fn test_link_conflicts_with_existing_links_attribute() {
        let err = Scheme::build(|s| {
            s.attribute("_links", ValueType::Map)?
                .link("self", LinkDef::new())?;
            Ok(())
        })
        .unwrap_err();
        assert_eq!(
            err,
            SchemeError::ConflictingTypeDefinition {
                key: "_links".into()
            }
        );
    }

    #[test]
    fn test_valid_maps_exhausted_to_exhaustive_flag() {
        let scheme = Scheme::build(|s| {
            s.attribute("a", ValueType::Number)?
                .attribute("b", ValueType::Number)?;
            Ok(())
        })
        .unwrap();
        let partial = doc(json!({"a": 1}));
        assert!(!scheme.valid(&partial, &defaults()));
        assert!(scheme.valid(&partial, &defaults().exhaustive(false)));
    }

    #[test]
    fn test_permissive_accepts_everything() {
        let scheme = Scheme::permissive();
        assert!(scheme.valid(&doc(json!({})), &defaults()));
        assert!(scheme.valid(&doc(json!({"a": {"b": 1}})), &defaults()));
        assert!(scheme.valid(&Document::textual(json!({"a": 1})), &defaults()));
        assert!(scheme.valid(&Document::Null, &defaults()));
    }

    #[test]
    fn test_fixtures_record_call_site() {
        let mut builder = Scheme::builder();
        builder.assert_pass("{}");
        let line = line!() - 1;
        let scheme = builder.build();
        assert_eq!(scheme.fixtures()[0].location().line(), line);
        assert_eq!(scheme.fixtures()[0].location().file(), file!());
    }

    #[test]
    fn test_rules_display() {
        let scheme = Scheme::build(|s| {
            s.attribute("a", ValueType::Text)?
                .collection("b", CollectionDef::of(ValueType::Number).optional())?;
            Ok(())
        })
        .unwrap();
        assert_eq!(scheme.rules().to_string(), "{a: string, b?: [list of number]}");
    }
}
