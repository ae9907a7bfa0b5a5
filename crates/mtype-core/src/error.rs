//! # Error Types
//!
//! Errors raised by the document layer. All errors use `thiserror` for
//! derive-based `Display` and `Error` implementations.
//!
//! ## Design
//!
//! - Decoding errors wrap the underlying parser error so the position
//!   reported by `serde_json` or `serde_yaml` survives.
//! - Key-type expectation errors name the scope they were raised on.

use thiserror::Error;

/// Error while decoding fixture or document text.
#[derive(Error, Debug)]
pub enum DecodeError {
    /// The text is not valid JSON.
    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// The text is not valid YAML.
    #[error("invalid YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// A YAML mapping used a key that cannot be a document key.
    #[error("unsupported map key: {0}")]
    UnsupportedKey(String),

    /// A YAML float that has no JSON number representation (NaN, infinity).
    #[error("number is not representable: {0}")]
    UnrepresentableNumber(f64),
}

/// Error when declaring the key-type expectation of a scope.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum KeyTypeExpectationError {
    /// The scope already carries an explicit expectation.
    #[error("key type expectation for {scope} is already set")]
    AlreadySet {
        /// Name of the scope.
        scope: String,
    },

    /// The expectation was already consulted, so changing it now would
    /// make earlier validations inconsistent with later ones.
    #[error("key type expectation for {scope} was already used and can no longer change")]
    AlreadyUsed {
        /// Name of the scope.
        scope: String,
    },
}
