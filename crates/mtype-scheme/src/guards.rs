//! # Validation Guards
//!
//! The pipeline every scheme node runs, in order:
//!
//! 1. **Output type**: the node's shape must match the expected type.
//! 2. **Output empty**: an empty node passes if emptiness is allowed or
//!    nothing is required, and fails otherwise. A passing empty node stops
//!    here; the walk continues with its siblings.
//! 3. **Rules exhausted**: every entry is dispatched to its rule, then the
//!    required keys that were never seen are reported.
//!
//! Lists are walked element by element. Each element must be a map, and its
//! entries are dispatched like those of a map node. A required key counts as
//! present once any element carries it; the check runs after the walk.

use std::collections::BTreeSet;

use mtype_core::Document;

use crate::error::ValidationError;
use crate::options::ValidationOptions;
use crate::rule::EnumerationContext;
use crate::rules::Rules;
use crate::value_type::ValueType;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Flow {
    Continue,
    Done,
}

/// Run the full pipeline for one node.
pub(crate) fn validate_node(
    output: &Document,
    options: &ValidationOptions<'_>,
    rules: &Rules,
    expected_type: &ValueType,
    allow_empty: bool,
) -> Result<(), ValidationError> {
    output_type_guard(output, options, expected_type)?;
    if output_empty_guard(output, options, rules, allow_empty)? == Flow::Done {
        return Ok(());
    }
    rules_exhausted_guard(output, options, rules)
}

pub(crate) fn output_type_guard(
    output: &Document,
    options: &ValidationOptions<'_>,
    expected_type: &ValueType,
) -> Result<(), ValidationError> {
    if expected_type.matches(output) {
        return Ok(());
    }
    Err(ValidationError::OutputTypeMismatch {
        path: options.path().clone(),
        expected: expected_type.to_string(),
        actual: output.kind().to_string(),
    })
}

fn output_empty_guard(
    output: &Document,
    options: &ValidationOptions<'_>,
    rules: &Rules,
    allow_empty: bool,
) -> Result<Flow, ValidationError> {
    if !output.is_empty() {
        return Ok(Flow::Continue);
    }
    let required = rules.required(options.is_loose());
    if allow_empty || required.is_empty() {
        return Ok(Flow::Done);
    }
    Err(ValidationError::EmptyOutput {
        path: options.path().clone(),
        required,
    })
}

fn rules_exhausted_guard(
    output: &Document,
    options: &ValidationOptions<'_>,
    rules: &Rules,
) -> Result<(), ValidationError> {
    let mut seen = BTreeSet::new();
    match output {
        Document::List(items) => {
            for (i, item) in items.iter().enumerate() {
                let item_options = options.trace(i);
                output_type_guard(item, &item_options, &ValueType::Map)?;
                validate_entries(item, &item_options, rules, &mut seen)?;
            }
        }
        Document::Map(_) => validate_entries(output, options, rules, &mut seen)?,
        _ => {}
    }

    if !options.is_exhaustive() {
        return Ok(());
    }
    let missing: Vec<String> = rules
        .required(options.is_loose())
        .into_iter()
        .filter(|name| !seen.contains(name.as_str()))
        .collect();
    if missing.is_empty() {
        return Ok(());
    }
    Err(ValidationError::ExhaustedOutput {
        path: options.path().clone(),
        missing,
    })
}

/// Dispatch every entry of a map to its rule and mark its key as seen.
fn validate_entries<'o>(
    output: &'o Document,
    options: &ValidationOptions<'_>,
    rules: &Rules,
    seen: &mut BTreeSet<&'o str>,
) -> Result<(), ValidationError> {
    let Some(map) = output.as_map() else {
        return Ok(());
    };
    for (key, value) in map {
        let rule = rules.resolve(key.name());
        let child = options.trace(key);
        if !rule.is_not_strict() && key.key_type() != options.expected_key_type() {
            return Err(ValidationError::KeyType {
                path: child.path().clone(),
                key: key.to_string(),
                expected: options.expected_key_type(),
                actual: key.key_type(),
            });
        }
        seen.insert(key.name());
        let context = EnumerationContext { rules, key, output };
        rule.validate(value, &child, &context)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rule::{Attribute, Rule};
    use crate::rules::Optionality;
    use mtype_core::Key;
    use serde_json::json;

    fn rules() -> Rules {
        let mut rules = Rules::new();
        rules
            .add(
                Key::symbol("a"),
                Rule::Attribute(Attribute::new(ValueType::Number, false)),
                Optionality::Required,
            )
            .unwrap()
            .add(
                Key::symbol("b"),
                Rule::Attribute(Attribute::new(ValueType::Text, false)),
                Optionality::Optional,
            )
            .unwrap();
        rules
    }

    fn check(value: serde_json::Value, options: &ValidationOptions<'_>) -> Result<(), ValidationError> {
        validate_node(&Document::symbolic(value), options, &rules(), &ValueType::Any, false)
    }

    #[test]
    fn test_map_passes() {
        assert!(check(json!({"a": 1}), &ValidationOptions::default()).is_ok());
        assert!(check(json!({"a": 1, "b": "x"}), &ValidationOptions::default()).is_ok());
    }

    #[test]
    fn test_missing_required_key() {
        let err = check(json!({"b": "x"}), &ValidationOptions::default()).unwrap_err();
        assert_eq!(
            err,
            ValidationError::ExhaustedOutput {
                path: Default::default(),
                missing: vec!["a".into()]
            }
        );
        assert!(check(json!({"b": "x"}), &ValidationOptions::default().exhaustive(false)).is_ok());
    }

    #[test]
    fn test_empty_output() {
        assert!(matches!(
            check(json!({}), &ValidationOptions::default()),
            Err(ValidationError::EmptyOutput { .. })
        ));
        let lenient = validate_node(
            &Document::empty_map(),
            &ValidationOptions::default(),
            &rules(),
            &ValueType::Map,
            true,
        );
        assert!(lenient.is_ok());
    }

    #[test]
    fn test_key_type_enforced() {
        let doc = Document::textual(json!({"a": 1}));
        let err = validate_node(&doc, &ValidationOptions::default(), &rules(), &ValueType::Any, false)
            .unwrap_err();
        assert!(matches!(err, ValidationError::KeyType { .. }));
        assert_eq!(err.path().to_string(), "a");
    }

    #[test]
    fn test_list_required_keys_are_seen_across_elements() {
        assert!(check(json!([{"a": 1}, {"b": "x"}]), &ValidationOptions::default()).is_ok());

        let err = check(json!([{"b": "x"}, {"b": "y"}]), &ValidationOptions::default()).unwrap_err();
        assert!(err.is_exhausted());
        assert!(err.path().is_root());
    }

    #[test]
    fn test_list_elements_are_type_checked() {
        let err = check(json!([{"a": 1}, 4]), &ValidationOptions::default()).unwrap_err();
        assert!(matches!(err, ValidationError::OutputTypeMismatch { .. }));
        assert_eq!(err.path().to_string(), "[1]");

        let err = check(json!([{"a": 1}, {"a": "x"}]), &ValidationOptions::default()).unwrap_err();
        assert_eq!(err.path().to_string(), "[1].a");
    }

    #[test]
    fn test_type_guard() {
        let err = validate_node(
            &Document::symbolic(json!([])),
            &ValidationOptions::default(),
            &rules(),
            &ValueType::Map,
            false,
        )
        .unwrap_err();
        assert_eq!(
            err,
            ValidationError::OutputTypeMismatch {
                path: Default::default(),
                expected: "map".into(),
                actual: "list".into()
            }
        );
    }
}
