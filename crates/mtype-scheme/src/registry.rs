//! # Validations Registry
//!
//! Maps media type identities to schemes. One `define` call registers a
//! root scheme and, through `version` and `view` blocks, any number of
//! derived schemes.
//!
//! ## Forking
//!
//! A `version` or `view` block starts from a copy of the enclosing
//! builder's rules as they stand at the point of the call, then adds its
//! own. Later declarations in the enclosing block are not inherited.
//! Fixtures are not copied: a fork declares its own.
//!
//! Forks run after the enclosing block has been registered, in the order
//! they were declared, so a fork can refer to the root scheme and to every
//! view declared before it through `CollectionDef::view`.
//!
//! ## Lookup
//!
//! Lookup is by [`IdentityKey`], never by the rendered media type string.
//! An identity with no registered scheme resolves to a permissive scheme
//! instead of an error.

use std::collections::BTreeMap;
use std::ops::{Deref, DerefMut};
use std::rc::Rc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use mtype_core::{Document, DocumentDecoder, IdentityKey, JsonDecoder, KeyType, KeyTypeScope, MediaTypeId};

use crate::error::{FixtureAssertionError, SchemeError, ValidationError};
use crate::options::{KeyPath, ValidationOptions};
use crate::scheme::{Scheme, SchemeBuilder};

type ForkBlock<'a> = Box<dyn FnOnce(&mut ValidationsBuilder<'a>) -> Result<(), SchemeError> + 'a>;

struct Fork<'a> {
    media_type: MediaTypeId,
    base: SchemeBuilder,
    block: ForkBlock<'a>,
}

/// Read-only view of the entries registered so far, used to resolve
/// collections that refer to another view of the media type being defined.
#[derive(Debug)]
pub struct RegistryLookup {
    current: MediaTypeId,
    entries: BTreeMap<IdentityKey, Arc<Scheme>>,
}

impl RegistryLookup {
    pub(crate) fn find_view(&self, view: Option<&str>) -> Result<Arc<Scheme>, SchemeError> {
        let target = self.current.with_view(view);
        self.entries
            .get(&target.key())
            .cloned()
            .ok_or_else(|| SchemeError::CollectionDefinitionNotFound {
                current: self.current.with_suffix("json").to_string(),
                target: target.with_suffix("json").to_string(),
            })
    }
}

/// Builder handed to `Validations::define` blocks. Dereferences to the
/// [`SchemeBuilder`] of the media type being defined.
pub struct ValidationsBuilder<'a> {
    media_type: MediaTypeId,
    scheme: SchemeBuilder,
    forks: Vec<Fork<'a>>,
}

impl<'a> ValidationsBuilder<'a> {
    /// The media type this block defines.
    pub fn media_type(&self) -> &MediaTypeId {
        &self.media_type
    }

    /// Register a version of the current media type.
    pub fn version<F>(&mut self, version: u32, block: F) -> &mut Self
    where
        F: FnOnce(&mut ValidationsBuilder<'a>) -> Result<(), SchemeError> + 'a,
    {
        let media_type = self.media_type.with_version(version);
        self.fork(media_type, Box::new(block))
    }

    /// Register a view of the current media type.
    pub fn view<F>(&mut self, view: &str, block: F) -> &mut Self
    where
        F: FnOnce(&mut ValidationsBuilder<'a>) -> Result<(), SchemeError> + 'a,
    {
        let media_type = self.media_type.with_view(Some(view));
        self.fork(media_type, Box::new(block))
    }

    /// Register one version per entry of `versions`, each built by `block`.
    pub fn versions<I, F>(&mut self, versions: I, block: F) -> &mut Self
    where
        I: IntoIterator<Item = u32>,
        F: Fn(u32, &mut ValidationsBuilder<'a>) -> Result<(), SchemeError> + 'a,
    {
        let block = Rc::new(block);
        for version in versions {
            let block = Rc::clone(&block);
            self.version(version, move |v| (*block)(version, v));
        }
        self
    }

    fn fork(&mut self, media_type: MediaTypeId, block: ForkBlock<'a>) -> &mut Self {
        let mut base = self.scheme.clone();
        base.clear_fixtures();
        self.forks.push(Fork {
            media_type,
            base,
            block,
        });
        self
    }
}

impl Deref for ValidationsBuilder<'_> {
    type Target = SchemeBuilder;

    fn deref(&self) -> &SchemeBuilder {
        &self.scheme
    }
}

impl DerefMut for ValidationsBuilder<'_> {
    fn deref_mut(&mut self) -> &mut SchemeBuilder {
        &mut self.scheme
    }
}

/// The schemes registered for one media type and its versions and views.
#[derive(Debug)]
pub struct Validations {
    media_type: MediaTypeId,
    scope: Arc<KeyTypeScope>,
    entries: BTreeMap<IdentityKey, Arc<Scheme>>,
    order: Vec<MediaTypeId>,
    asserted_sane: AtomicBool,
}

impl Validations {
    /// Run `block` for `media_type` and register everything it declares.
    ///
    /// `scope` supplies the key-type convention for fixtures and for
    /// [`Validations::options`].
    pub fn define<'a, F>(
        media_type: MediaTypeId,
        scope: Arc<KeyTypeScope>,
        block: F,
    ) -> Result<Self, SchemeError>
    where
        F: FnOnce(&mut ValidationsBuilder<'a>) -> Result<(), SchemeError> + 'a,
    {
        let mut validations = Self {
            media_type: media_type.clone(),
            scope,
            entries: BTreeMap::new(),
            order: Vec::new(),
            asserted_sane: AtomicBool::new(false),
        };
        validations.run(media_type, Scheme::builder(), Box::new(block))?;
        Ok(validations)
    }

    fn run<'a>(
        &mut self,
        media_type: MediaTypeId,
        mut base: SchemeBuilder,
        block: ForkBlock<'a>,
    ) -> Result<(), SchemeError> {
        base.set_lookup(Arc::new(RegistryLookup {
            current: media_type.clone(),
            entries: self.entries.clone(),
        }));
        let mut builder = ValidationsBuilder {
            media_type,
            scheme: base,
            forks: Vec::new(),
        };
        block(&mut builder)?;

        let ValidationsBuilder {
            media_type,
            scheme,
            forks,
        } = builder;
        self.register(media_type, scheme.build())?;

        for fork in forks {
            tracing::debug!(root = %self.media_type, fork = %fork.media_type, "forking validations");
            self.run(fork.media_type, fork.base, fork.block)?;
        }
        Ok(())
    }

    fn register(&mut self, media_type: MediaTypeId, scheme: Arc<Scheme>) -> Result<(), SchemeError> {
        let key = media_type.key();
        if self.entries.contains_key(&key) {
            return Err(SchemeError::DuplicateIdentity(media_type.to_string()));
        }
        tracing::debug!(media_type = %media_type, rules = scheme.rules().len(), "registered validations");
        self.entries.insert(key, scheme);
        self.order.push(media_type);
        Ok(())
    }

    /// The root media type.
    pub fn media_type(&self) -> &MediaTypeId {
        &self.media_type
    }

    /// The registered scheme for `media_type`, or a permissive scheme.
    pub fn find(&self, media_type: &MediaTypeId) -> Arc<Scheme> {
        self.find_or_else(media_type, || {
            tracing::warn!(media_type = %media_type, "no validations registered; accepting any document");
            Scheme::permissive()
        })
    }

    /// The registered scheme for `media_type`, or the result of `default`.
    pub fn find_or_else<F>(&self, media_type: &MediaTypeId, default: F) -> Arc<Scheme>
    where
        F: FnOnce() -> Arc<Scheme>,
    {
        self.get(media_type).cloned().unwrap_or_else(default)
    }

    pub fn get(&self, media_type: &MediaTypeId) -> Option<&Arc<Scheme>> {
        self.entries.get(&media_type.key())
    }

    /// Whether a scheme is registered for `media_type`.
    pub fn validatable(&self, media_type: &MediaTypeId) -> bool {
        self.entries.contains_key(&media_type.key())
    }

    /// Every registered media type, in the order it was registered.
    pub fn available_validations(&self) -> &[MediaTypeId] {
        &self.order
    }

    pub fn scope(&self) -> &Arc<KeyTypeScope> {
        &self.scope
    }

    /// Key type documents of this media type use.
    pub fn key_type(&self) -> KeyType {
        self.scope.key_type()
    }

    pub fn symbol_keys(&self) -> bool {
        self.key_type().is_symbol()
    }

    pub fn text_keys(&self) -> bool {
        self.key_type().is_text()
    }

    /// Default options with this media type's key type.
    pub fn options(&self) -> ValidationOptions<'static> {
        ValidationOptions::default().expect_key_type(self.key_type())
    }

    /// Validate `output` against the scheme for `media_type`.
    pub fn validate(&self, media_type: &MediaTypeId, output: &Document) -> Result<(), ValidationError> {
        self.find(media_type).validate(output, &self.options())
    }

    pub fn valid(&self, media_type: &MediaTypeId, output: &Document) -> bool {
        self.find(media_type).valid(output, &self.options())
    }

    /// Check the fixtures of every registered scheme, decoding as JSON.
    pub fn assert_sane(&self) -> Result<(), FixtureAssertionError> {
        self.assert_sane_with(&JsonDecoder)
    }

    /// Check the fixtures of every registered scheme with `decoder`.
    pub fn assert_sane_with(&self, decoder: &dyn DocumentDecoder) -> Result<(), FixtureAssertionError> {
        let key_type = self.key_type();
        let mut failures = Vec::new();
        for media_type in &self.order {
            if let Some(scheme) = self.entries.get(&media_type.key()) {
                scheme.collect_fixture_failures(key_type, decoder, &KeyPath::default(), &mut failures);
            }
        }
        if !failures.is_empty() {
            return Err(FixtureAssertionError { failures });
        }
        tracing::info!(media_type = %self.media_type, schemes = self.order.len(), "all fixtures behaved as declared");
        self.asserted_sane.store(true, Ordering::Release);
        Ok(())
    }

    /// Whether `assert_sane` has succeeded.
    pub fn asserted_sane(&self) -> bool {
        self.asserted_sane.load(Ordering::Acquire)
    }
}
