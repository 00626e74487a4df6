//! Commodity name resolution.

use fairprice_core::{slugify, CommodityId};
use serde::Serialize;
use std::collections::HashMap;

/// A resolved commodity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Commodity {
    pub id: CommodityId,
    /// Display name.
    pub name: String,
}

/// Resolves free-text names to known commodities.
pub trait CommodityCatalog: Send + Sync {
    fn resolve(&self, name: &str) -> Option<Commodity>;
}

/// In-memory catalog. Names and aliases are matched by slug.
#[derive(Debug, Clone, Default)]
pub struct StaticCatalog {
    entries: HashMap<CommodityId, String>,
    aliases: HashMap<String, CommodityId>,
}

impl StaticCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a commodity under its display name.
    pub fn insert(&mut self, name: &str) -> CommodityId {
        let id = CommodityId::from_name(name);
        self.entries.insert(id.clone(), name.trim().to_string());
        id
    }

    /// Map `alias` onto an existing commodity. Unknown targets are ignored.
    pub fn insert_alias(&mut self, alias: &str, target: &CommodityId) {
        if self.entries.contains_key(target) {
            self.aliases.insert(slugify(alias), target.clone());
        }
    }

    pub fn with_commodity(mut self, name: &str) -> Self {
        self.insert(name);
        self
    }

    pub fn with_alias(mut self, alias: &str, canonical_name: &str) -> Self {
        let target = CommodityId::from_name(canonical_name);
        self.insert_alias(alias, &target);
        self
    }

    /// Common staples traded in Indian mandis, with Hindi aliases.
    pub fn indian_staples() -> Self {
        [
            ("Wheat", &["gehun", "gehu"][..]),
            ("Basmati Rice", &["basmati", "chawal"][..]),
            ("Onion", &["pyaz", "pyaaz"][..]),
            ("Potato", &["aloo", "alu"][..]),
            ("Tomato", &["tamatar"][..]),
            ("Soyabean", &["soybean", "soya"][..]),
            ("Mustard", &["sarson"][..]),
            ("Chana", &["chickpea", "gram"][..]),
        ]
        .into_iter()
        .fold(Self::new(), |catalog, (name, aliases)| {
            aliases
                .iter()
                .fold(catalog.with_commodity(name), |c, alias| c.with_alias(alias, name))
        })
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl CommodityCatalog for StaticCatalog {
    fn resolve(&self, name: &str) -> Option<Commodity> {
        let slug = CommodityId::from_name(name);
        let id = if self.entries.contains_key(&slug) {
            slug
        } else {
            self.aliases.get(slug.as_str())?.clone()
        };
        let name = self.entries.get(&id)?.clone();
        Some(Commodity { id, name })
    }
}
