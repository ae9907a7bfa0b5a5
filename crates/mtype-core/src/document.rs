//! # Document Model
//!
//! The untyped tree that schemes validate: maps, lists, and scalars.
//!
//! Map keys keep the lexical form they were decoded with. A symbolic key
//! (`Key::Symbol("foo")`) and a textual key (`Key::Text("foo")`) name the
//! same attribute, and rule lookup treats them as one, but the engine
//! rejects a key whose form does not match the expectation of the scheme.
//!
//! Maps are stored in a `BTreeMap`. Key order carries no meaning for
//! validation; the sorted order only makes diagnostics deterministic.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Number, Value};

/// The lexical form of a map key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum KeyType {
    /// Identifier-like keys (`:foo`).
    Symbol,
    /// String keys (`"foo"`).
    Text,
}

impl KeyType {
    /// Whether this is the symbolic form.
    pub fn is_symbol(self) -> bool {
        matches!(self, KeyType::Symbol)
    }

    /// Whether this is the textual form.
    pub fn is_text(self) -> bool {
        matches!(self, KeyType::Text)
    }
}

impl Default for KeyType {
    fn default() -> Self {
        KeyType::Symbol
    }
}

impl fmt::Display for KeyType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            KeyType::Symbol => write!(f, "symbol"),
            KeyType::Text => write!(f, "string"),
        }
    }
}

/// A map key together with its lexical form.
///
/// `From<&str>` and `From<String>` produce symbolic keys, the default
/// convention. Use [`Key::text`] for string keys.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(tag = "form", content = "name", rename_all = "snake_case")]
pub enum Key {
    /// A symbolic key.
    Symbol(String),
    /// A textual key.
    Text(String),
}

impl Key {
    /// Create a symbolic key.
    pub fn symbol(name: impl Into<String>) -> Self {
        Key::Symbol(name.into())
    }

    /// Create a textual key.
    pub fn text(name: impl Into<String>) -> Self {
        Key::Text(name.into())
    }

    /// Create a key of the given form.
    pub fn new(name: impl Into<String>, key_type: KeyType) -> Self {
        match key_type {
            KeyType::Symbol => Key::Symbol(name.into()),
            KeyType::Text => Key::Text(name.into()),
        }
    }

    /// The normalized name, shared by both forms.
    pub fn name(&self) -> &str {
        match self {
            Key::Symbol(name) | Key::Text(name) => name,
        }
    }

    /// The lexical form of this key.
    pub fn key_type(&self) -> KeyType {
        match self {
            Key::Symbol(_) => KeyType::Symbol,
            Key::Text(_) => KeyType::Text,
        }
    }
}

impl From<&str> for Key {
    fn from(name: &str) -> Self {
        Key::Symbol(name.to_string())
    }
}

impl From<String> for Key {
    fn from(name: String) -> Self {
        Key::Symbol(name)
    }
}

impl From<&Key> for Key {
    fn from(key: &Key) -> Self {
        key.clone()
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Key::Symbol(name) => write!(f, ":{name}"),
            Key::Text(name) => write!(f, "{name:?}"),
        }
    }
}

/// A decoded document node.
#[derive(Debug, Clone, PartialEq)]
pub enum Document {
    /// The absent value.
    Null,
    /// `true` or `false`.
    Bool(bool),
    /// Any JSON-representable number.
    Number(Number),
    /// A string scalar.
    Text(String),
    /// An ordered list.
    List(Vec<Document>),
    /// A keyed map.
    Map(BTreeMap<Key, Document>),
}

impl Document {
    /// Convert a JSON value, giving every map key the form `key_type`.
    pub fn from_json(value: &Value, key_type: KeyType) -> Self {
        match value {
            Value::Null => Document::Null,
            Value::Bool(b) => Document::Bool(*b),
            Value::Number(n) => Document::Number(n.clone()),
            Value::String(s) => Document::Text(s.clone()),
            Value::Array(items) => Document::List(
                items
                    .iter()
                    .map(|item| Document::from_json(item, key_type))
                    .collect(),
            ),
            Value::Object(map) => Document::Map(
                map.iter()
                    .map(|(k, v)| (Key::new(k.as_str(), key_type), Document::from_json(v, key_type)))
                    .collect(),
            ),
        }
    }

    /// Convert a JSON value using symbolic keys.
    pub fn symbolic(value: Value) -> Self {
        Document::from_json(&value, KeyType::Symbol)
    }

    /// Convert a JSON value using textual keys.
    pub fn textual(value: Value) -> Self {
        Document::from_json(&value, KeyType::Text)
    }

    /// An empty map.
    pub fn empty_map() -> Self {
        Document::Map(BTreeMap::new())
    }

    /// Short name of the node kind, used in diagnostics.
    pub fn kind(&self) -> &'static str {
        match self {
            Document::Null => "null",
            Document::Bool(_) => "boolean",
            Document::Number(_) => "number",
            Document::Text(_) => "string",
            Document::List(_) => "list",
            Document::Map(_) => "map",
        }
    }

    /// Whether the node counts as empty.
    ///
    /// Null, the empty string, and empty containers are empty. Every other
    /// scalar has contents.
    pub fn is_empty(&self) -> bool {
        match self {
            Document::Null => true,
            Document::Text(s) => s.is_empty(),
            Document::List(items) => items.is_empty(),
            Document::Map(map) => map.is_empty(),
            Document::Bool(_) | Document::Number(_) => false,
        }
    }

    /// Number of entries for containers.
    pub fn len(&self) -> Option<usize> {
        match self {
            Document::List(items) => Some(items.len()),
            Document::Map(map) => Some(map.len()),
            _ => None,
        }
    }

    /// Whether this node is `Null`.
    pub fn is_null(&self) -> bool {
        matches!(self, Document::Null)
    }

    /// Borrow the entries of a map node.
    pub fn as_map(&self) -> Option<&BTreeMap<Key, Document>> {
        match self {
            Document::Map(map) => Some(map),
            _ => None,
        }
    }

    /// Borrow the items of a list node.
    pub fn as_list(&self) -> Option<&[Document]> {
        match self {
            Document::List(items) => Some(items),
            _ => None,
        }
    }

    /// Look up a map entry by normalized name, in either key form.
    pub fn get(&self, name: &str) -> Option<&Document> {
        let map = self.as_map()?;
        map.get(&Key::symbol(name))
            .or_else(|| map.get(&Key::text(name)))
    }

    /// Look up a list item by position.
    pub fn index(&self, index: usize) -> Option<&Document> {
        self.as_list()?.get(index)
    }
}

impl fmt::Display for Document {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Document::Null => write!(f, "null"),
            Document::Bool(b) => write!(f, "{b}"),
            Document::Number(n) => write!(f, "{n}"),
            Document::Text(s) => write!(f, "{s:?}"),
            Document::List(items) => {
                write!(f, "[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{item}")?;
                }
                write!(f, "]")
            }
            Document::Map(map) => {
                write!(f, "{{")?;
                for (i, (key, value)) in map.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    match key {
                        Key::Symbol(name) => write!(f, "{name}: {value}")?,
                        Key::Text(name) => write!(f, "{name:?}: {value}")?,
                    }
                }
                write!(f, "}}")
            }
        }
    }
}
