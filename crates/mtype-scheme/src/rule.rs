//! # Rule Variants
//!
//! A [`Rule`] is what a key is bound to. Validation dispatches on the
//! variant; each variant checks the value found under its key.

use std::fmt;
use std::sync::Arc;

use mtype_core::{Document, Key};

use crate::error::ValidationError;
use crate::guards;
use crate::links::Links;
use crate::options::ValidationOptions;
use crate::rules::Rules;
use crate::scheme::Scheme;
use crate::value_type::ValueType;

/// The parent node a rule is being applied within.
#[derive(Debug, Clone, Copy)]
pub struct EnumerationContext<'a> {
    /// Rules of the parent node.
    pub rules: &'a Rules,
    /// Key under which the value was found.
    pub key: &'a Key,
    /// The parent node.
    pub output: &'a Document,
}

/// A rule bound to a key.
#[derive(Debug, Clone)]
pub enum Rule {
    /// A scalar or opaque value checked against a type.
    Attribute(Attribute),
    /// A container whose every item satisfies an item rule.
    Enumeration(EnumerationOfType),
    /// A nested scheme.
    Scheme(Arc<Scheme>),
    /// Named link objects.
    Links(Links),
    /// Anything goes, in any key form.
    NotStrict,
    /// Implicit rule for keys with no binding.
    MissingValidation,
}

impl Rule {
    pub fn is_not_strict(&self) -> bool {
        matches!(self, Rule::NotStrict)
    }

    /// Check `output`, found under `context.key`. `options` already points
    /// at the value.
    pub fn validate(
        &self,
        output: &Document,
        options: &ValidationOptions<'_>,
        context: &EnumerationContext<'_>,
    ) -> Result<(), ValidationError> {
        match self {
            Rule::Attribute(attribute) => attribute.validate(output, options),
            Rule::Enumeration(enumeration) => enumeration.validate(output, options),
            Rule::Scheme(scheme) => scheme.validate_node(output, options),
            Rule::Links(links) => links.validate(output, options),
            Rule::NotStrict => Ok(()),
            Rule::MissingValidation => {
                if !options.is_strict() {
                    return Ok(());
                }
                Err(ValidationError::StrictValidation {
                    path: options.path().clone(),
                    key: context.key.to_string(),
                    expected: context.rules.keys().map(|k| k.name().to_string()).collect(),
                    found: context
                        .output
                        .as_map()
                        .map(|map| map.keys().map(|k| k.name().to_string()).collect())
                        .unwrap_or_default(),
                })
            }
        }
    }
}

impl fmt::Display for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Rule::Attribute(attribute) => write!(f, "{attribute}"),
            Rule::Enumeration(enumeration) => write!(f, "{enumeration}"),
            Rule::Scheme(scheme) => write!(f, "{}", scheme.rules()),
            Rule::Links(links) => write!(f, "links {}", links.rules()),
            Rule::NotStrict => write!(f, "((noop: not strict))"),
            Rule::MissingValidation => write!(f, "((raise when strict))"),
        }
    }
}

/// A value checked against a [`ValueType`].
#[derive(Debug, Clone)]
pub struct Attribute {
    value_type: ValueType,
    allow_nil: bool,
}

impl Attribute {
    pub fn new(value_type: ValueType, allow_nil: bool) -> Self {
        Self {
            value_type,
            allow_nil,
        }
    }

    pub fn value_type(&self) -> &ValueType {
        &self.value_type
    }

    fn validate(&self, output: &Document, options: &ValidationOptions<'_>) -> Result<(), ValidationError> {
        if output.is_null() && self.allow_nil {
            return Ok(());
        }
        if self.value_type.matches(output) {
            return Ok(());
        }
        Err(ValidationError::AttributeTypeMismatch {
            path: options.path().clone(),
            expected: self.to_string(),
            actual: output.to_string(),
        })
    }
}

impl fmt::Display for Attribute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.allow_nil {
            write!(f, "{} or null", self.value_type)
        } else {
            write!(f, "{}", self.value_type)
        }
    }
}

/// What each item of an enumeration must satisfy.
#[derive(Debug, Clone)]
pub enum ItemRule {
    Type(ValueType),
    Scheme(Arc<Scheme>),
}

impl fmt::Display for ItemRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ItemRule::Type(value_type) => write!(f, "{value_type}"),
            ItemRule::Scheme(scheme) => write!(f, "{}", scheme.rules()),
        }
    }
}

/// A list (or map) of items that all satisfy one item rule.
#[derive(Debug, Clone)]
pub struct EnumerationOfType {
    item: ItemRule,
    container: ValueType,
    allow_empty: bool,
}

impl EnumerationOfType {
    pub fn new(item: ItemRule, container: ValueType, allow_empty: bool) -> Self {
        Self {
            item,
            container,
            allow_empty,
        }
    }

    pub fn item(&self) -> &ItemRule {
        &self.item
    }

    fn validate(&self, output: &Document, options: &ValidationOptions<'_>) -> Result<(), ValidationError> {
        if !self.container.matches(output) {
            return Err(ValidationError::CollectionType {
                path: options.path().clone(),
                expected: self.container.to_string(),
                actual: output.kind().to_string(),
            });
        }

        if !self.allow_empty && output.is_empty() {
            return Err(ValidationError::EmptyOutput {
                path: options.path().clone(),
                required: Vec::new(),
            });
        }

        match output {
            Document::List(items) => {
                for (i, item) in items.iter().enumerate() {
                    self.validate_item(item, &options.trace(i))?;
                }
            }
            Document::Map(map) => {
                for (key, item) in map {
                    let item_options = options.trace(key);
                    if key.key_type() != options.expected_key_type() {
                        return Err(ValidationError::KeyType {
                            path: item_options.path().clone(),
                            key: key.to_string(),
                            expected: options.expected_key_type(),
                            actual: key.key_type(),
                        });
                    }
                    self.validate_item(item, &item_options)?;
                }
            }
            _ => {}
        }
        Ok(())
    }

    fn validate_item(&self, item: &Document, options: &ValidationOptions<'_>) -> Result<(), ValidationError> {
        match &self.item {
            ItemRule::Type(value_type) => {
                if value_type.matches(item) {
                    return Ok(());
                }
                Err(ValidationError::CollectionType {
                    path: options.path().clone(),
                    expected: value_type.to_string(),
                    actual: item.to_string(),
                })
            }
            ItemRule::Scheme(scheme) => {
                guards::output_type_guard(item, options, &ValueType::Map)?;
                scheme.validate_node(item, options)
            }
        }
    }
}

impl fmt::Display for EnumerationOfType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{} of {}", self.container, self.item)?;
        if self.allow_empty {
            write!(f, ", may be empty")?;
        }
        write!(f, "]")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mtype_core::KeyType;
    use serde_json::json;

    fn validate(rule: &Rule, value: serde_json::Value) -> Result<(), ValidationError> {
        let output = Document::symbolic(value);
        let rules = Rules::new();
        let key = Key::symbol("item");
        let parent = Document::empty_map();
        let context = EnumerationContext {
            rules: &rules,
            key: &key,
            output: &parent,
        };
        let options = ValidationOptions::default().trace(&key);
        rule.validate(&output, &options, &context)
    }

    #[test]
    fn test_attribute_nil_handling() {
        let strict = Rule::Attribute(Attribute::new(ValueType::Text, false));
        let nullable = Rule::Attribute(Attribute::new(ValueType::Text, true));
        assert!(validate(&strict, json!(null)).is_err());
        assert!(validate(&nullable, json!(null)).is_ok());
        assert!(validate(&nullable, json!("x")).is_ok());
    }

    #[test]
    fn test_attribute_mismatch_reports_path() {
        let rule = Rule::Attribute(Attribute::new(ValueType::Number, false));
        let err = validate(&rule, json!("1")).unwrap_err();
        assert_eq!(err.path().to_string(), "item");
        assert!(matches!(err, ValidationError::AttributeTypeMismatch { .. }));
    }

    #[test]
    fn test_enumeration_container_and_items() {
        let rule = Rule::Enumeration(EnumerationOfType::new(
            ItemRule::Type(ValueType::Text),
            ValueType::List,
            false,
        ));
        assert!(validate(&rule, json!(["a", "b"])).is_ok());
        assert!(matches!(
            validate(&rule, json!({"a": "b"})),
            Err(ValidationError::CollectionType { .. })
        ));
        let err = validate(&rule, json!(["a", 2])).unwrap_err();
        assert_eq!(err.path().to_string(), "item[1]");
    }

    #[test]
    fn test_enumeration_emptiness() {
        let strict = Rule::Enumeration(EnumerationOfType::new(
            ItemRule::Type(ValueType::Text),
            ValueType::List,
            false,
        ));
        let lenient = Rule::Enumeration(EnumerationOfType::new(
            ItemRule::Type(ValueType::Text),
            ValueType::List,
            true,
        ));
        assert!(matches!(
            validate(&strict, json!([])),
            Err(ValidationError::EmptyOutput { .. })
        ));
        assert!(validate(&lenient, json!([])).is_ok());
    }

    #[test]
    fn test_map_enumeration_traces_keys() {
        let rule = Rule::Enumeration(EnumerationOfType::new(
            ItemRule::Type(ValueType::Number),
            ValueType::Map,
            false,
        ));
        assert!(validate(&rule, json!({"a": 1, "b": 2})).is_ok());
        let err = validate(&rule, json!({"a": 1, "b": "2"})).unwrap_err();
        assert_eq!(err.path().to_string(), "item.b");
    }

    #[test]
    fn test_map_enumeration_enforces_key_type() {
        let rule = Rule::Enumeration(EnumerationOfType::new(
            ItemRule::Type(ValueType::Number),
            ValueType::Map,
            false,
        ));
        let rules = Rules::new();
        let key = Key::symbol("tags");
        let parent = Document::empty_map();
        let context = EnumerationContext {
            rules: &rules,
            key: &key,
            output: &parent,
        };
        let options = ValidationOptions::default().trace(&key);
        let textual = Document::textual(json!({"x": 1}));
        let err = rule.validate(&textual, &options, &context).unwrap_err();
        assert!(matches!(
            err,
            ValidationError::KeyType { expected: KeyType::Symbol, actual: KeyType::Text, .. }
        ));
        assert_eq!(err.path().to_string(), "tags.x");

        let text_options = ValidationOptions::default()
            .expect_key_type(KeyType::Text)
            .trace(&key);
        assert!(rule.validate(&textual, &text_options, &context).is_ok());
    }

    #[test]
    fn test_missing_validation_depends_on_strictness() {
        let rules = Rules::new();
        let key = Key::symbol("extra");
        let parent = Document::symbolic(json!({"extra": 1}));
        let context = EnumerationContext {
            rules: &rules,
            key: &key,
            output: &parent,
        };
        let value = Document::symbolic(json!(1));
        let strict = ValidationOptions::default();
        let lenient = ValidationOptions::default().strict(false);
        let err = Rule::MissingValidation
            .validate(&value, &strict, &context)
            .unwrap_err();
        match err {
            ValidationError::StrictValidation { key, found, .. } => {
                assert_eq!(key, ":extra");
                assert_eq!(found, vec!["extra"]);
            }
            other => panic!("unexpected error: {other}"),
        }
        assert!(Rule::MissingValidation
            .validate(&value, &lenient, &context)
            .is_ok());
    }

    #[test]
    fn test_not_strict_accepts_anything() {
        assert!(validate(&Rule::NotStrict, json!({"whatever": [1, 2]})).is_ok());
    }
}
