//! Commodity identifiers and name normalization.

use serde::{Deserialize, Serialize};

/// Canonical commodity identifier (a normalized slug).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CommodityId(String);

impl CommodityId {
    /// Build an id from free text.
    pub fn from_name(name: &str) -> Self {
        CommodityId(slugify(name))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for CommodityId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Normalize a free-text commodity name into a slug.
///
/// Lowercases and trims, drops characters outside `[a-z0-9\s-]`, then
/// collapses runs of whitespace and hyphens into a single hyphen. Hyphens
/// left at either end are dropped.
pub fn slugify(name: &str) -> String {
    let lowered = name.trim().to_lowercase();
    let mut slug = String::with_capacity(lowered.len());
    let mut pending_sep = false;

    for c in lowered.chars() {
        if c.is_ascii_lowercase() || c.is_ascii_digit() {
            if pending_sep && !slug.is_empty() {
                slug.push('-');
            }
            pending_sep = false;
            slug.push(c);
        } else if c.is_whitespace() || c == '-' {
            pending_sep = true;
        }
    }

    slug
}
