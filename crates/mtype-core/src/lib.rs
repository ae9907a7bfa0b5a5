//! # mtype-core — Foundational Types for Media Type Schemes
//!
//! This crate is the leaf of the workspace. It defines the values that the
//! validation engine in `mtype-scheme` walks and the identities it files
//! schemes under. It depends on nothing internal.
//!
//! ## Key Design Principles
//!
//! 1. **Keys keep their lexical form.** A decoded map key is either a
//!    [`Key::Symbol`] or a [`Key::Text`]. Both spell the same logical name,
//!    but a scheme pins which form a document must use.
//!
//! 2. **Documents are read-only trees.** [`Document`] is built once by a
//!    decoder and never mutated by validation.
//!
//! 3. **Key-type inheritance is an explicit chain.** [`KeyTypeScope`] holds
//!    a parent pointer instead of a process-wide lookup table. The first read
//!    of a scope locks its answer.
//!
//! 4. **Identities compare by tuple, not by string.** [`MediaTypeId`] renders
//!    a display string for diagnostics, but registries key on
//!    [`IdentityKey`].
//!
//! ## Crate Policy
//!
//! - No dependencies on other `mtype-*` crates.
//! - No `unsafe` code.
//! - No `panic!()` or `.unwrap()` outside tests.

pub mod decode;
pub mod document;
pub mod error;
pub mod identity;
pub mod key_type;

pub use decode::{decode_json, decode_yaml, DocumentDecoder, JsonDecoder, YamlDecoder};
pub use document::{Document, Key, KeyType};
pub use error::{DecodeError, KeyTypeExpectationError};
pub use identity::{IdentityKey, MediaTypeId};
pub use key_type::KeyTypeScope;
