//! # Links
//!
//! The `_links` object of a hypermedia document. Each declared link name
//! maps to a scheme that requires an `href` plus whatever the declaration
//! block adds.

use std::sync::Arc;

use mtype_core::{Document, Key};

use crate::error::{SchemeError, ValidationError};
use crate::guards;
use crate::options::ValidationOptions;
use crate::rule::Rule;
use crate::rules::{Optionality, Rules};
use crate::scheme::Scheme;
use crate::value_type::ValueType;

#[derive(Debug, Clone, Default)]
pub struct Links {
    rules: Rules,
}

impl Links {
    pub fn new() -> Self {
        Self::default()
    }

    /// Declared links, each bound to a [`Rule::Scheme`].
    pub fn rules(&self) -> &Rules {
        &self.rules
    }

    pub(crate) fn add(
        &mut self,
        name: Key,
        scheme: Arc<Scheme>,
        optionality: Optionality,
    ) -> Result<&mut Self, SchemeError> {
        self.rules.add(name, Rule::Scheme(scheme), optionality)?;
        Ok(self)
    }

    /// Every required link must be present, whatever the caller asked for.
    /// Missing links and link keys are reported as
    /// [`ValidationError::IncompleteLink`].
    pub(crate) fn validate(
        &self,
        output: &Document,
        options: &ValidationOptions<'_>,
    ) -> Result<(), ValidationError> {
        guards::validate_node(
            output,
            &options.force_exhaustive(),
            &self.rules,
            &ValueType::Map,
            false,
        )
        .map_err(|err| match err {
            ValidationError::ExhaustedOutput { path, missing } => {
                ValidationError::IncompleteLink { path, missing }
            }
            other => other,
        })
    }
}
