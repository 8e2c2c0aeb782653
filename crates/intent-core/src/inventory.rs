//! Resource inventory accumulator
//!
//! [`Inventory`] maps a kind to the set of identifiers known under it. It is
//! threaded through `list` and `validate` traversals and handed to `delete`.
//! Entries are only ever added; there is no removal API.

use crate::key::ResourceKey;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// Kind -> identifiers accumulator
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Inventory {
    entries: BTreeMap<String, BTreeSet<String>>,
}

impl Inventory {
    /// Create empty inventory
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `id` under `kind`
    ///
    /// Returns `true` if the identifier was not already present.
    pub fn insert(&mut self, kind: impl Into<String>, id: impl Into<String>) -> bool {
        self.entries.entry(kind.into()).or_default().insert(id.into())
    }

    /// Record a managed object
    pub fn insert_key(&mut self, key: &ResourceKey) -> bool {
        self.insert(key.kind.as_str(), key.name.as_str())
    }

    /// Check if `id` is recorded under `kind`
    #[must_use]
    pub fn contains(&self, kind: &str, id: &str) -> bool {
        self.entries.get(kind).is_some_and(|ids| ids.contains(id))
    }

    /// Check if a managed object is recorded
    #[inline]
    #[must_use]
    pub fn contains_key(&self, key: &ResourceKey) -> bool {
        self.contains(&key.kind, &key.name)
    }

    /// Identifiers recorded under `kind`
    #[must_use]
    pub fn ids(&self, kind: &str) -> Option<&BTreeSet<String>> {
        self.entries.get(kind)
    }

    /// Kinds with at least one identifier
    pub fn kinds(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    /// Iterate over `(kind, identifiers)`
    pub fn iter(&self) -> impl Iterator<Item = (&str, &BTreeSet<String>)> {
        self.entries.iter().map(|(k, ids)| (k.as_str(), ids))
    }

    /// Total number of identifiers across all kinds
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.values().map(BTreeSet::len).sum()
    }

    /// Check if no identifier is recorded
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Add every entry of `other`
    pub fn extend(&mut self, other: Inventory) {
        for (kind, ids) in other.entries {
            self.entries.entry(kind).or_default().extend(ids);
        }
    }
}

impl<K, I> FromIterator<(K, I)> for Inventory
where
    K: Into<String>,
    I: Into<String>,
{
    fn from_iter<T: IntoIterator<Item = (K, I)>>(iter: T) -> Self {
        let mut inventory = Self::new();
        for (kind, id) in iter {
            inventory.insert(kind, id);
        }
        inventory
    }
}
