//! BTreeMap-backed wildcard index session
//!
//! Keys map to sorted record id lists, so lookups are deterministic.
//! The multikey path set only grows for the lifetime of the session.

use std::collections::BTreeMap;

use tracing::info;

use crate::context::ExecutionContext;
use crate::document::{Document, Value};
use crate::observability::Event;

use super::entry::{IndexKeyEntry, MultikeyPaths};
use super::errors::KeyGenResult;
use super::keygen::WildcardKeyGenerator;

/// Identifier of an indexed document
pub type RecordId = u64;

/// One wildcard index and its multikey bookkeeping
#[derive(Debug)]
pub struct WildcardIndex {
    generator: WildcardKeyGenerator,
    tree: BTreeMap<IndexKeyEntry, Vec<RecordId>>,
    multikey: MultikeyPaths,
}

impl WildcardIndex {
    pub fn new(generator: WildcardKeyGenerator) -> Self {
        Self {
            generator,
            tree: BTreeMap::new(),
            multikey: MultikeyPaths::new(),
        }
    }

    pub fn generator(&self) -> &WildcardKeyGenerator {
        &self.generator
    }

    /// Indexes a document under `record`.
    ///
    /// Keys are generated before anything is written, so a rejected
    /// document leaves the index unchanged. Returns the number of keys.
    pub fn insert(
        &mut self,
        record: RecordId,
        doc: &Document,
        ctx: &ExecutionContext,
    ) -> KeyGenResult<usize> {
        let generated = self.generator.generate(doc, ctx)?;
        let count = generated.len();

        for key in generated.keys {
            let records = self.tree.entry(key).or_default();
            match records.binary_search(&record) {
                Ok(_) => {}
                Err(pos) => records.insert(pos, record),
            }
        }

        for path in self.multikey.absorb(&generated.multikey_paths) {
            info!(event = %Event::MultikeyPathAdded, op_id = %ctx.op_id(), path = %path);
        }

        Ok(count)
    }

    /// Removes the keys `doc` produced for `record`.
    ///
    /// Multikey paths are kept. Returns the number of keys removed.
    pub fn remove(
        &mut self,
        record: RecordId,
        doc: &Document,
        ctx: &ExecutionContext,
    ) -> KeyGenResult<usize> {
        let generated = self.generator.generate(doc, ctx)?;
        let mut removed = 0;

        for key in &generated.keys {
            if let Some(records) = self.tree.get_mut(key) {
                if let Ok(pos) = records.binary_search(&record) {
                    records.remove(pos);
                    removed += 1;
                }
                if records.is_empty() {
                    self.tree.remove(key);
                }
            }
        }

        Ok(removed)
    }

    /// Records holding exactly `value` at `path`, sorted ascending.
    pub fn lookup_eq(&self, path: &str, value: &Value) -> Vec<RecordId> {
        self.tree
            .get(&IndexKeyEntry::new(path, value.clone()))
            .cloned()
            .unwrap_or_default()
    }

    /// Records holding any value at `path`, sorted ascending and deduplicated.
    pub fn lookup_path(&self, path: &str) -> Vec<RecordId> {
        let low = IndexKeyEntry::new(path, Value::MinKey);
        let high = IndexKeyEntry::new(path, Value::MaxKey);

        let mut result: Vec<RecordId> = self
            .tree
            .range(low..=high)
            .flat_map(|(_, records)| records.iter().copied())
            .collect();
        result.sort_unstable();
        result.dedup();
        result
    }

    pub fn multikey_paths(&self) -> &MultikeyPaths {
        &self.multikey
    }

    pub fn is_multikey(&self, path: &str) -> bool {
        self.multikey.contains(path)
    }

    /// Number of distinct keys
    pub fn key_count(&self) -> usize {
        self.tree.len()
    }

    /// Number of (key, record) pairs
    pub fn entry_count(&self) -> usize {
        self.tree.values().map(Vec::len).sum()
    }

    /// Keys in index order
    pub fn keys(&self) -> impl Iterator<Item = &IndexKeyEntry> {
        self.tree.keys()
    }

    pub fn is_empty(&self) -> bool {
        self.tree.is_empty()
    }
}
