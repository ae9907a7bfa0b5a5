//! # Fixtures
//!
//! Example documents recorded next to the rules they exercise, each with
//! the outcome it must produce. [`Scheme::assert_sane`] decodes and
//! validates every fixture in the tree and reports every mismatch at once.
//!
//! ## Walk order
//!
//! 1. The scheme's own fixtures.
//! 2. Every nested scheme bound to a key, with the path extended by the key.
//! 3. Every link scheme, with the path extended by `_links` and the link.
//! 4. The default rule, when it is a scheme, under the path segment `*`.
//!
//! A scheme is marked sane when nothing under it failed.

use std::fmt;
use std::panic::Location;

use mtype_core::{DecodeError, DocumentDecoder, JsonDecoder, KeyType};

use crate::error::{FixtureAssertionError, ValidationError};
use crate::options::{KeyPath, Segment, ValidationOptions};
use crate::rule::Rule;
use crate::scheme::Scheme;

/// An example document and the outcome it must produce.
#[derive(Debug, Clone)]
pub struct Fixture {
    text: String,
    expect_to_pass: bool,
    loose: bool,
    location: &'static Location<'static>,
}

impl Fixture {
    pub(crate) fn new(
        text: String,
        expect_to_pass: bool,
        loose: bool,
        location: &'static Location<'static>,
    ) -> Self {
        Self {
            text,
            expect_to_pass,
            loose,
            location,
        }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn expect_to_pass(&self) -> bool {
        self.expect_to_pass
    }

    pub fn is_loose(&self) -> bool {
        self.loose
    }

    /// Where the fixture was declared.
    pub fn location(&self) -> &'static Location<'static> {
        self.location
    }

    fn check(
        &self,
        scheme: &Scheme,
        key_type: KeyType,
        decoder: &dyn DocumentDecoder,
        path: &KeyPath,
    ) -> Option<FixtureFailure> {
        let failure = |outcome| FixtureFailure {
            location: self.location,
            path: path.clone(),
            expected_pass: self.expect_to_pass,
            outcome,
        };

        let document = match decoder.decode(&self.text, key_type) {
            Ok(document) => document,
            Err(err) => return Some(failure(FixtureOutcome::Undecodable(err))),
        };
        let options = ValidationOptions::default()
            .expect_key_type(key_type)
            .loose(self.loose);

        match (scheme.validate(&document, &options), self.expect_to_pass) {
            (Ok(()), true) | (Err(_), false) => None,
            (Ok(()), false) => Some(failure(FixtureOutcome::UnexpectedPass)),
            (Err(err), true) => Some(failure(FixtureOutcome::UnexpectedFailure(err))),
        }
    }
}

/// What went wrong with a fixture.
#[derive(Debug)]
pub enum FixtureOutcome {
    /// A fixture expected to fail passed.
    UnexpectedPass,
    /// A fixture expected to pass failed.
    UnexpectedFailure(ValidationError),
    /// The fixture text could not be decoded.
    Undecodable(DecodeError),
}

/// One fixture that did not behave as declared.
#[derive(Debug)]
pub struct FixtureFailure {
    /// Where the fixture was declared.
    pub location: &'static Location<'static>,
    /// Path of the scheme the fixture belongs to.
    pub path: KeyPath,
    /// Whether the fixture was declared with `assert_pass`.
    pub expected_pass: bool,
    /// What happened instead.
    pub outcome: FixtureOutcome,
}

impl fmt::Display for FixtureFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}:{}: fixture for {} ",
            self.location.file(),
            self.location.line(),
            self.path
        )?;
        match &self.outcome {
            FixtureOutcome::UnexpectedPass => write!(f, "was expected to fail but passed"),
            FixtureOutcome::UnexpectedFailure(err) => {
                write!(f, "was expected to pass but failed: {err}")
            }
            FixtureOutcome::Undecodable(err) => write!(f, "could not be decoded: {err}"),
        }
    }
}

impl Scheme {
    /// Check every fixture in this scheme tree, decoding fixture text as JSON.
    pub fn assert_sane(&self, key_type: KeyType) -> Result<(), FixtureAssertionError> {
        self.assert_sane_with(key_type, &JsonDecoder)
    }

    /// Check every fixture in this scheme tree with a custom decoder.
    pub fn assert_sane_with(
        &self,
        key_type: KeyType,
        decoder: &dyn DocumentDecoder,
    ) -> Result<(), FixtureAssertionError> {
        let mut failures = Vec::new();
        self.collect_fixture_failures(key_type, decoder, &KeyPath::default(), &mut failures);
        if failures.is_empty() {
            tracing::info!(fixtures = self.fixture_count(), "all fixtures behaved as declared");
            return Ok(());
        }
        Err(FixtureAssertionError { failures })
    }

    pub(crate) fn collect_fixture_failures(
        &self,
        key_type: KeyType,
        decoder: &dyn DocumentDecoder,
        path: &KeyPath,
        failures: &mut Vec<FixtureFailure>,
    ) {
        let before = failures.len();

        for fixture in self.fixtures() {
            if let Some(failure) = fixture.check(self, key_type, decoder, path) {
                tracing::warn!(
                    file = failure.location.file(),
                    line = failure.location.line(),
                    path = %failure.path,
                    expected_pass = failure.expected_pass,
                    "fixture did not behave as declared"
                );
                failures.push(failure);
            }
        }

        for entry in self.rules().iter() {
            match &entry.rule {
                Rule::Scheme(scheme) => {
                    let child = path.join(&entry.key);
                    scheme.collect_fixture_failures(key_type, decoder, &child, failures);
                }
                Rule::Links(links) => {
                    for link in links.rules().iter() {
                        if let Rule::Scheme(scheme) = &link.rule {
                            let child = path.join(&entry.key).join(&link.key);
                            scheme.collect_fixture_failures(key_type, decoder, &child, failures);
                        }
                    }
                }
                _ => {}
            }
        }

        if let Some(Rule::Scheme(scheme)) = self.rules().default_rule() {
            let child = path.join(Segment::key("*"));
            scheme.collect_fixture_failures(key_type, decoder, &child, failures);
        }

        if failures.len() == before {
            self.mark_sane();
        }
    }

    /// Number of fixtures in this scheme tree.
    pub fn fixture_count(&self) -> usize {
        let nested: usize = self
            .rules()
            .iter()
            .map(|entry| match &entry.rule {
                Rule::Scheme(scheme) => scheme.fixture_count(),
                Rule::Links(links) => links
                    .rules()
                    .iter()
                    .map(|link| match &link.rule {
                        Rule::Scheme(scheme) => scheme.fixture_count(),
                        _ => 0,
                    })
                    .sum(),
                _ => 0,
            })
            .sum();
        let default = match self.rules().default_rule() {
            Some(Rule::Scheme(scheme)) => scheme.fixture_count(),
            _ => 0,
        };
        self.fixtures().len() + nested + default
    }
}
