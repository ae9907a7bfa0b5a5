//! # Document Decoding
//!
//! Turns JSON or YAML text into a [`Document`]. The caller chooses the
//! lexical form of every map key in the decoded tree, which is how
//! fixtures are checked against schemes that expect symbolic or textual
//! keys.
//!
//! ## YAML
//!
//! YAML tags are ignored and the inner value is decoded. Scalar map keys
//! (strings, numbers, booleans) become key names; sequence or mapping keys
//! are rejected.

use serde_json::{Number, Value};

use crate::document::{Document, Key, KeyType};
use crate::error::DecodeError;

/// A pluggable text decoder.
///
/// Fixture self-checks accept any decoder, so fixtures can be written in
/// whichever format a media type is usually exchanged in.
pub trait DocumentDecoder {
    /// Decode `text`, giving every map key the form `key_type`.
    fn decode(&self, text: &str, key_type: KeyType) -> Result<Document, DecodeError>;
}

/// Decodes JSON text.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonDecoder;

impl DocumentDecoder for JsonDecoder {
    fn decode(&self, text: &str, key_type: KeyType) -> Result<Document, DecodeError> {
        decode_json(text, key_type)
    }
}

/// Decodes YAML text. JSON is valid YAML, so this also reads JSON fixtures.
#[derive(Debug, Clone, Copy, Default)]
pub struct YamlDecoder;

impl DocumentDecoder for YamlDecoder {
    fn decode(&self, text: &str, key_type: KeyType) -> Result<Document, DecodeError> {
        decode_yaml(text, key_type)
    }
}

/// Decode JSON text into a document.
pub fn decode_json(text: &str, key_type: KeyType) -> Result<Document, DecodeError> {
    let value: Value = serde_json::from_str(text)?;
    Ok(Document::from_json(&value, key_type))
}

/// Decode YAML text into a document.
pub fn decode_yaml(text: &str, key_type: KeyType) -> Result<Document, DecodeError> {
    let value: serde_yaml::Value = serde_yaml::from_str(text)?;
    yaml_to_document(&value, key_type)
}

fn yaml_to_document(yaml: &serde_yaml::Value, key_type: KeyType) -> Result<Document, DecodeError> {
    match yaml {
        serde_yaml::Value::Null => Ok(Document::Null),
        serde_yaml::Value::Bool(b) => Ok(Document::Bool(*b)),
        serde_yaml::Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                Ok(Document::Number(Number::from(i)))
            } else if let Some(u) = n.as_u64() {
                Ok(Document::Number(Number::from(u)))
            } else {
                let f = n.as_f64().unwrap_or(f64::NAN);
                Number::from_f64(f)
                    .map(Document::Number)
                    .ok_or(DecodeError::UnrepresentableNumber(f))
            }
        }
        serde_yaml::Value::String(s) => Ok(Document::Text(s.clone())),
        serde_yaml::Value::Sequence(seq) => {
            let items = seq
                .iter()
                .map(|item| yaml_to_document(item, key_type))
                .collect::<Result<Vec<_>, _>>()?;
            Ok(Document::List(items))
        }
        serde_yaml::Value::Mapping(map) => {
            let mut entries = std::collections::BTreeMap::new();
            for (k, v) in map {
                let name = match k {
                    serde_yaml::Value::String(s) => s.clone(),
                    serde_yaml::Value::Number(n) => n.to_string(),
                    serde_yaml::Value::Bool(b) => b.to_string(),
                    other => return Err(DecodeError::UnsupportedKey(format!("{other:?}"))),
                };
                entries.insert(Key::new(name, key_type), yaml_to_document(v, key_type)?);
            }
            Ok(Document::Map(entries))
        }
        serde_yaml::Value::Tagged(tagged) => yaml_to_document(&tagged.value, key_type),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_json_symbol_keys() {
        let doc = decode_json(r#"{"foo": {"bar": 1}}"#, KeyType::Symbol).unwrap();
        let map = doc.as_map().unwrap();
        assert!(map.contains_key(&Key::symbol("foo")));
    }

    #[test]
    fn test_decode_json_text_keys() {
        let doc = decode_json(r#"{"foo": [1, 2]}"#, KeyType::Text).unwrap();
        let map = doc.as_map().unwrap();
        assert!(map.contains_key(&Key::text("foo")));
        assert_eq!(doc.get("foo").and_then(Document::len), Some(2));
    }

    #[test]
    fn test_decode_json_rejects_garbage() {
        let err = decode_json("{not json", KeyType::Symbol).unwrap_err();
        assert!(matches!(err, DecodeError::Json(_)));
    }

    #[test]
    fn test_decode_yaml_matches_json() {
        let yaml = "foo:\n  bar: 1\n  baz: [true, null]\n";
        let json = r#"{"foo": {"bar": 1, "baz": [true, null]}}"#;
        assert_eq!(
            decode_yaml(yaml, KeyType::Text).unwrap(),
            decode_json(json, KeyType::Text).unwrap()
        );
    }

    #[test]
    fn test_decode_yaml_scalar_keys() {
        let doc = decode_yaml("1: one\ntrue: yes\n", KeyType::Symbol).unwrap();
        assert!(doc.get("1").is_some());
        assert!(doc.get("true").is_some());
    }

    #[test]
    fn test_decode_yaml_rejects_sequence_key() {
        let err = decode_yaml("? [a, b]\n: 1\n", KeyType::Symbol).unwrap_err();
        assert!(matches!(err, DecodeError::UnsupportedKey(_)));
    }

    #[test]
    fn test_decoders_are_interchangeable() {
        let decoders: Vec<Box<dyn DocumentDecoder>> = vec![Box::new(JsonDecoder), Box::new(YamlDecoder)];
        for decoder in decoders {
            let doc = decoder.decode(r#"{"a": "b"}"#, KeyType::Symbol).unwrap();
            assert_eq!(doc.get("a"), Some(&Document::Text("b".into())));
        }
    }
}

#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    /// JSON values without floats, which YAML and JSON agree on exactly.
    fn json_value_no_floats() -> impl Strategy<Value = Value> {
        let leaf = prop_oneof![
            Just(Value::Null),
            any::<bool>().prop_map(Value::Bool),
            any::<i64>().prop_map(|n| serde_json::json!(n)),
            "[a-zA-Z0-9_ ]{0,30}".prop_map(Value::String),
        ];
        leaf.prop_recursive(4, 48, 6, |inner| {
            prop_oneof![
                prop::collection::vec(inner.clone(), 0..6).prop_map(Value::Array),
                prop::collection::btree_map("[a-z]{1,10}", inner, 0..6)
                    .prop_map(|m| Value::Object(m.into_iter().collect())),
            ]
        })
    }

    proptest! {
        /// JSON text decodes to the same tree through either decoder.
        #[test]
        fn yaml_decoder_reads_json_text(value in json_value_no_floats()) {
            let text = serde_json::to_string(&value).unwrap();
            let from_json = decode_json(&text, KeyType::Text).unwrap();
            let from_yaml = decode_yaml(&text, KeyType::Text).unwrap();
            prop_assert_eq!(from_json, from_yaml);
        }

        /// Decoding applies the requested key form to every map key.
        #[test]
        fn decoded_keys_have_requested_form(value in json_value_no_floats()) {
            fn all_keys_are(doc: &Document, key_type: KeyType) -> bool {
                match doc {
                    Document::Map(map) => map
                        .iter()
                        .all(|(k, v)| k.key_type() == key_type && all_keys_are(v, key_type)),
                    Document::List(items) => items.iter().all(|v| all_keys_are(v, key_type)),
                    _ => true,
                }
            }
            let text = serde_json::to_string(&value).unwrap();
            let doc = decode_json(&text, KeyType::Symbol).unwrap();
            prop_assert!(all_keys_are(&doc, KeyType::Symbol));
        }
    }
}
