//! # Value Types
//!
//! Predicates over document nodes. A `ValueType` is both the type of a
//! scalar attribute and the container shape a scheme expects
//! (`ValueType::Map` for objects, `ValueType::List` for collections).

use std::fmt;
use std::sync::Arc;

use mtype_core::Document;

type Predicate = dyn Fn(&Document) -> bool + Send + Sync;

/// A named, caller-supplied predicate.
#[derive(Clone)]
pub struct CustomType {
    name: String,
    predicate: Arc<Predicate>,
}

impl fmt::Debug for CustomType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CustomType").field("name", &self.name).finish()
    }
}

/// A predicate over document nodes.
#[derive(Debug, Clone)]
pub enum ValueType {
    /// Anything, including null.
    Any,
    /// A string scalar.
    Text,
    /// Any number.
    Number,
    /// A number without a fractional representation.
    Integer,
    /// A number stored as a float.
    Float,
    /// `true` or `false`.
    Boolean,
    /// Exactly `true`.
    True,
    /// Exactly `false`.
    False,
    /// Exactly null.
    Null,
    /// A keyed map.
    Map,
    /// A list.
    List,
    /// Matches when any member matches.
    AnyOf(Vec<ValueType>),
    /// A caller-supplied predicate.
    Custom(CustomType),
}

impl ValueType {
    pub fn any_of(types: impl IntoIterator<Item = ValueType>) -> Self {
        ValueType::AnyOf(types.into_iter().collect())
    }

    /// `inner`, or null.
    pub fn nullable(inner: ValueType) -> Self {
        ValueType::AnyOf(vec![ValueType::Null, inner])
    }

    pub fn custom(
        name: impl Into<String>,
        predicate: impl Fn(&Document) -> bool + Send + Sync + 'static,
    ) -> Self {
        ValueType::Custom(CustomType {
            name: name.into(),
            predicate: Arc::new(predicate),
        })
    }

    /// Whether `value` satisfies this type.
    pub fn matches(&self, value: &Document) -> bool {
        match self {
            ValueType::Any => true,
            ValueType::Text => matches!(value, Document::Text(_)),
            ValueType::Number => matches!(value, Document::Number(_)),
            ValueType::Integer => {
                matches!(value, Document::Number(n) if n.is_i64() || n.is_u64())
            }
            ValueType::Float => matches!(value, Document::Number(n) if n.is_f64()),
            ValueType::Boolean => matches!(value, Document::Bool(_)),
            ValueType::True => matches!(value, Document::Bool(true)),
            ValueType::False => matches!(value, Document::Bool(false)),
            ValueType::Null => value.is_null(),
            ValueType::Map => matches!(value, Document::Map(_)),
            ValueType::List => matches!(value, Document::List(_)),
            ValueType::AnyOf(types) => types.iter().any(|t| t.matches(value)),
            ValueType::Custom(custom) => (custom.predicate)(value),
        }
    }

    /// Whether this is the `Map` shape.
    pub fn is_map(&self) -> bool {
        matches!(self, ValueType::Map)
    }
}

impl fmt::Display for ValueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValueType::Any => write!(f, "any"),
            ValueType::Text => write!(f, "string"),
            ValueType::Number => write!(f, "number"),
            ValueType::Integer => write!(f, "integer"),
            ValueType::Float => write!(f, "float"),
            ValueType::Boolean => write!(f, "boolean"),
            ValueType::True => write!(f, "true"),
            ValueType::False => write!(f, "false"),
            ValueType::Null => write!(f, "null"),
            ValueType::Map => write!(f, "map"),
            ValueType::List => write!(f, "list"),
            ValueType::AnyOf(types) => {
                let names: Vec<String> = types.iter().map(ToString::to_string).collect();
                write!(f, "any of [{}]", names.join(", "))
            }
            ValueType::Custom(custom) => write!(f, "{}", custom.name),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn doc(value: serde_json::Value) -> Document {
        Document::symbolic(value)
    }

    #[test]
    fn test_scalar_types() {
        assert!(ValueType::Text.matches(&doc(json!("a"))));
        assert!(!ValueType::Text.matches(&doc(json!(1))));
        assert!(ValueType::Number.matches(&doc(json!(1.5))));
        assert!(ValueType::Integer.matches(&doc(json!(-3))));
        assert!(!ValueType::Integer.matches(&doc(json!(1.5))));
        assert!(ValueType::Float.matches(&doc(json!(1.5))));
        assert!(ValueType::Boolean.matches(&doc(json!(false))));
        assert!(ValueType::True.matches(&doc(json!(true))));
        assert!(!ValueType::True.matches(&doc(json!(false))));
        assert!(ValueType::Null.matches(&Document::Null));
    }

    #[test]
    fn test_any_accepts_null() {
        assert!(ValueType::Any.matches(&Document::Null));
        assert!(ValueType::Any.matches(&doc(json!({"a": 1}))));
    }

    #[test]
    fn test_nullable() {
        let t = ValueType::nullable(ValueType::Number);
        assert!(t.matches(&Document::Null));
        assert!(t.matches(&doc(json!(4))));
        assert!(!t.matches(&doc(json!("4"))));
        assert_eq!(t.to_string(), "any of [null, number]");
    }

    #[test]
    fn test_custom_predicate() {
        let url = ValueType::custom("url", |d| {
            matches!(d, Document::Text(s) if s.starts_with("https://"))
        });
        assert!(url.matches(&doc(json!("https://example.com"))));
        assert!(!url.matches(&doc(json!("ftp://example.com"))));
        assert_eq!(url.to_string(), "url");
    }

    #[test]
    fn test_shapes() {
        assert!(ValueType::Map.matches(&doc(json!({}))));
        assert!(!ValueType::Map.matches(&doc(json!([]))));
        assert!(ValueType::List.matches(&doc(json!([]))));
    }
}
