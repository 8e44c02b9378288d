//! Index key entries and multikey bookkeeping

use std::collections::BTreeSet;

use serde::Serialize;

use crate::document::Value;

/// One wildcard index key: the dotted path and the value found there.
///
/// Ordering is by path, then by value in canonical type order.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub struct IndexKeyEntry {
    path: String,
    value: Value,
}

impl IndexKeyEntry {
    pub fn new(path: impl Into<String>, value: Value) -> Self {
        Self {
            path: path.into(),
            value,
        }
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn value(&self) -> &Value {
        &self.value
    }

    /// The key as stored: a path segment followed by a value segment
    pub fn segments(&self) -> [Value; 2] {
        [Value::String(self.path.clone()), self.value.clone()]
    }

    pub fn into_parts(self) -> (String, Value) {
        (self.path, self.value)
    }
}

/// Paths whose array contents produced more than one key
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct MultikeyPaths {
    paths: BTreeSet<String>,
}

impl MultikeyPaths {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns true if the path was not already recorded
    pub fn insert(&mut self, path: impl Into<String>) -> bool {
        self.paths.insert(path.into())
    }

    pub fn contains(&self, path: &str) -> bool {
        self.paths.contains(path)
    }

    pub fn len(&self) -> usize {
        self.paths.len()
    }

    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.paths.iter().map(String::as_str)
    }

    /// Merges `other` into this set and returns the newly added paths.
    pub fn absorb(&mut self, other: &MultikeyPaths) -> Vec<String> {
        other
            .paths
            .iter()
            .filter(|p| self.paths.insert((*p).clone()))
            .cloned()
            .collect()
    }
}

/// Output of key generation for one document
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct GeneratedKeys {
    /// Distinct keys in traversal order
    pub keys: Vec<IndexKeyEntry>,
    pub multikey_paths: MultikeyPaths,
}

impl GeneratedKeys {
    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }
}
