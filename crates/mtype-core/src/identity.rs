//! # Media Type Identity
//!
//! The identity of a registered scheme: an organisation, a type name, and
//! optional version, view, and suffix.
//!
//! ## Canonical key
//!
//! Registries key their entries on [`IdentityKey`], the comparable
//! (name, view, version, suffix) tuple, not on the rendered string. The
//! `Display` form (`application/vnd.acme.song.v2.index+json`) exists for
//! diagnostics only and is never parsed back.

use std::fmt;

use serde::{Deserialize, Serialize};

/// A media type identity.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MediaTypeId {
    organisation: String,
    name: String,
    version: Option<u32>,
    view: Option<String>,
    suffix: Option<String>,
}

/// The canonical comparable tuple used as a registry key.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct IdentityKey {
    /// Type name.
    pub name: String,
    /// View name, if any.
    pub view: Option<String>,
    /// Version number, if any.
    pub version: Option<u32>,
    /// Structured syntax suffix, if any.
    pub suffix: Option<String>,
}

impl MediaTypeId {
    /// Create an unversioned, viewless identity.
    pub fn new(organisation: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            organisation: organisation.into(),
            name: name.into(),
            version: None,
            view: None,
            suffix: None,
        }
    }

    /// Return a copy with the version replaced.
    pub fn with_version(&self, version: u32) -> Self {
        Self {
            version: Some(version),
            ..self.clone()
        }
    }

    /// Return a copy with the view replaced. `None` clears the view.
    pub fn with_view(&self, view: Option<&str>) -> Self {
        Self {
            view: view.map(str::to_string),
            ..self.clone()
        }
    }

    /// Return a copy with the suffix replaced.
    pub fn with_suffix(&self, suffix: impl Into<String>) -> Self {
        Self {
            suffix: Some(suffix.into()),
            ..self.clone()
        }
    }

    pub fn organisation(&self) -> &str {
        &self.organisation
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn version(&self) -> Option<u32> {
        self.version
    }

    pub fn view(&self) -> Option<&str> {
        self.view.as_deref()
    }

    pub fn suffix(&self) -> Option<&str> {
        self.suffix.as_deref()
    }

    /// The canonical registry key for this identity.
    pub fn key(&self) -> IdentityKey {
        IdentityKey {
            name: self.name.clone(),
            view: self.view.clone(),
            version: self.version,
            suffix: self.suffix.clone(),
        }
    }
}

impl fmt::Display for MediaTypeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "application/vnd.{}.{}", self.organisation, self.name)?;
        if let Some(version) = self.version {
            write!(f, ".v{version}")?;
        }
        if let Some(view) = &self.view {
            write!(f, ".{view}")?;
        }
        if let Some(suffix) = &self.suffix {
            write!(f, "+{suffix}")?;
        }
        Ok(())
    }
}

impl fmt::Display for IdentityKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)?;
        if let Some(version) = self.version {
            write!(f, ".v{version}")?;
        }
        if let Some(view) = &self.view {
            write!(f, ".{view}")?;
        }
        if let Some(suffix) = &self.suffix {
            write!(f, "+{suffix}")?;
        }
        Ok(())
    }
}
