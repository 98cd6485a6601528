//! Representative (referrer) directory and URL path resolution.
//!
//! The signup page is served at `/<representative id>`. The id selects the
//! representative credited with the registration.
//!
//! # Resolution rules
//!
//! | path (slashes trimmed) | outcome |
//! |---|---|
//! | empty | default representative |
//! | known id | that representative |
//! | unknown, all digits | [`ResolveError::NotFound`] |
//! | unknown, anything else | default representative |
//!
//! The last rule keeps preview and staging deployments working: they serve
//! the page under extra path segments like `/en-US/preview`.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// Id of the built-in default representative.
pub const DEFAULT_REFERRER_ID: &str = "110956";

/// A representative who can be credited with a registration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Referrer {
    /// Identifier used in the URL and sent as `representative_id`.
    pub id: String,
    /// Display name shown on the form.
    pub name: String,
    /// Optional contact handle (`WhatsApp` number).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub contact: Option<String>,
}

/// Errors that can occur when resolving or building a directory.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum ResolveError {
    /// A numeric id that is not in the directory.
    #[error("representative not found: {0}")]
    NotFound(String),

    /// The configured default id is missing from the directory.
    #[error("default representative {0} is not in the directory")]
    MissingDefault(String),
}

/// Read-only lookup table of representatives.
///
/// Built once at startup and shared by every request.
#[derive(Debug, Clone)]
pub struct ReferrerDirectory {
    referrers: HashMap<String, Referrer>,
    default: Referrer,
}

impl ReferrerDirectory {
    /// Build a directory from a list of representatives.
    ///
    /// Later entries with a duplicate id replace earlier ones.
    ///
    /// # Errors
    ///
    /// Returns [`ResolveError::MissingDefault`] if `default_id` is not one of
    /// the given representatives.
    pub fn new(
        referrers: impl IntoIterator<Item = Referrer>,
        default_id: impl Into<String>,
    ) -> Result<Self, ResolveError> {
        let referrers: HashMap<String, Referrer> = referrers
            .into_iter()
            .map(|r| (r.id.clone(), r))
            .collect();
        let default_id = default_id.into();
        let default = referrers
            .get(&default_id)
            .cloned()
            .ok_or(ResolveError::MissingDefault(default_id))?;

        Ok(Self { referrers, default })
    }

    /// The compiled-in directory.
    #[must_use]
    pub fn builtin() -> Self {
        let francisco = Referrer {
            id: DEFAULT_REFERRER_ID.to_owned(),
            name: "Francisco".to_owned(),
            contact: None,
        };
        Self {
            referrers: HashMap::from([(francisco.id.clone(), francisco.clone())]),
            default: francisco,
        }
    }

    /// The representative used when the path does not name one.
    #[must_use]
    pub const fn default_referrer(&self) -> &Referrer {
        &self.default
    }

    /// Look up a representative by exact id.
    #[must_use]
    pub fn get(&self, id: &str) -> Option<&Referrer> {
        self.referrers.get(id)
    }

    /// Number of representatives in the directory.
    #[must_use]
    pub fn len(&self) -> usize {
        self.referrers.len()
    }

    /// Whether the directory is empty (never true for a built directory).
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.referrers.is_empty()
    }

    /// Resolve the representative for a request path.
    ///
    /// # Errors
    ///
    /// Returns [`ResolveError::NotFound`] for an all-digit path that is not a
    /// known id.
    pub fn resolve(&self, path: &str) -> Result<&Referrer, ResolveError> {
        let segment = path.trim_matches('/');

        if segment.is_empty() {
            return Ok(self.default_referrer());
        }

        if let Some(referrer) = self.referrers.get(segment) {
            return Ok(referrer);
        }

        if segment.chars().all(|c| c.is_ascii_digit()) {
            return Err(ResolveError::NotFound(segment.to_owned()));
        }

        Ok(self.default_referrer())
    }
}

impl Default for ReferrerDirectory {
    fn default() -> Self {
        Self::builtin()
    }
}
