//! Substring search terms
//!
//! Every listing endpoint takes one optional free-text parameter that
//! narrows the list to rows whose designated field contains the term as a
//! case-insensitive substring. An absent parameter behaves exactly like an
//! empty one: no filtering. The term is matched literally, whitespace
//! included; there is no trimming, tokenization or fuzzy matching.
//!
//! Both storage backends share this type so the in-memory predicate and the
//! SQL `ILIKE` translation cannot drift apart.

use serde::{Deserialize, Serialize};

/// An optional case-insensitive substring filter over a single field.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SearchTerm {
    raw: String,
}

impl SearchTerm {
    /// Build a term from a raw query string.
    pub fn new(raw: impl Into<String>) -> Self {
        Self { raw: raw.into() }
    }

    /// Build a term from an optional query parameter; `None` means no filter.
    pub fn from_param(param: Option<String>) -> Self {
        Self {
            raw: param.unwrap_or_default(),
        }
    }

    /// The raw text as supplied by the client.
    pub fn as_str(&self) -> &str {
        &self.raw
    }

    /// True when the term does not constrain the listing.
    pub fn is_empty(&self) -> bool {
        self.raw.is_empty()
    }

    /// Case-insensitive substring containment over `field`.
    ///
    /// An empty term matches every row.
    pub fn matches(&self, field: &str) -> bool {
        if self.raw.is_empty() {
            return true;
        }
        field.to_lowercase().contains(&self.raw.to_lowercase())
    }
}

impl From<Option<String>> for SearchTerm {
    fn from(param: Option<String>) -> Self {
        Self::from_param(param)
    }
}
