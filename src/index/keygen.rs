//! Wildcard key generation
//!
//! Walks a document in field order and emits one key per distinct
//! (path, scalar) pair reachable under the pattern.
//!
//! # Traversal rules
//!
//! - Objects add a path segment per field; fields whose names contain `.`
//!   are not addressable by a dotted path and are skipped
//! - Arrays do not add a segment; an array nested directly in an array is
//!   flattened once, deeper nesting is indexed as a whole-array value
//! - Empty arrays and empty objects produce nothing
//! - `MinKey`/`MaxKey` produce nothing; `Undefined` rejects the document
//! - An array whose elements yield more than one key marks its own path
//!   multikey, whatever paths those keys sit on
//!
//! Generation is all-or-nothing: on any error no keys are returned.

use std::collections::BTreeSet;

use tracing::{debug, warn};

use crate::config::EngineConfig;
use crate::context::ExecutionContext;
use crate::document::{Document, FieldPath, Value};
use crate::observability::{self, Event};

use super::entry::{GeneratedKeys, IndexKeyEntry, MultikeyPaths};
use super::errors::{KeyGenError, KeyGenResult};
use super::pattern::{PathScope, WildcardPattern};

/// Arrays nested this many levels inside other arrays are indexed whole.
const FLATTEN_LIMIT: usize = 2;

/// Stateless key generator for one wildcard pattern
#[derive(Debug, Clone)]
pub struct WildcardKeyGenerator {
    pattern: WildcardPattern,
    max_depth: usize,
    max_key_bytes: usize,
}

impl WildcardKeyGenerator {
    pub fn new(pattern: WildcardPattern, config: &EngineConfig) -> Self {
        Self {
            pattern,
            max_depth: config.max_depth,
            max_key_bytes: config.max_key_bytes,
        }
    }

    pub fn pattern(&self) -> &WildcardPattern {
        &self.pattern
    }

    /// Generates the key set and multikey paths for one document.
    ///
    /// Identical documents always produce identical output.
    pub fn generate(&self, doc: &Document, ctx: &ExecutionContext) -> KeyGenResult<GeneratedKeys> {
        let mut walker = KeyWalker {
            generator: self,
            ctx,
            path: FieldPath::root(),
            keys: Vec::new(),
            seen: BTreeSet::new(),
            multikey: MultikeyPaths::new(),
        };

        match walker.walk_document(doc, 0) {
            Ok(()) => {
                debug!(
                    event = %Event::KeygenComplete,
                    op_id = %ctx.op_id(),
                    pattern = %self.pattern,
                    keys = walker.keys.len(),
                    multikey_paths = walker.multikey.len(),
                );
                observability::metrics().record_document_indexed(walker.keys.len() as u64);
                Ok(GeneratedKeys {
                    keys: walker.keys,
                    multikey_paths: walker.multikey,
                })
            }
            Err(err) => {
                warn!(
                    event = %Event::KeygenFailed,
                    op_id = %ctx.op_id(),
                    pattern = %self.pattern,
                    code = err.code(),
                    error = %err,
                );
                observability::metrics().increment_keygen_failures();
                Err(err)
            }
        }
    }
}

struct KeyWalker<'a> {
    generator: &'a WildcardKeyGenerator,
    ctx: &'a ExecutionContext,
    path: FieldPath,
    keys: Vec<IndexKeyEntry>,
    seen: BTreeSet<IndexKeyEntry>,
    multikey: MultikeyPaths,
}

impl KeyWalker<'_> {
    fn walk_document(&mut self, doc: &Document, depth: usize) -> KeyGenResult<()> {
        for (name, value) in doc.iter() {
            if name.contains('.') {
                continue;
            }
            self.path.push(name);
            let result = match self.generator.pattern.scope(&self.path) {
                PathScope::Skip => Ok(()),
                PathScope::Index => self.walk_value(value, 0, true, depth + 1),
                PathScope::Descend { index_scalars } => {
                    self.walk_value(value, 0, index_scalars, depth + 1)
                }
            };
            self.path.pop();
            result?;
        }
        Ok(())
    }

    fn walk_value(
        &mut self,
        value: &Value,
        array_depth: usize,
        index_scalars: bool,
        depth: usize,
    ) -> KeyGenResult<()> {
        if depth > self.generator.max_depth {
            return Err(KeyGenError::NestingTooDeep {
                path: self.path.dotted(),
                max: self.generator.max_depth,
            });
        }

        match value {
            Value::Object(doc) => self.walk_document(doc, depth),
            Value::Array(items) if items.is_empty() => Ok(()),
            Value::Array(_) if array_depth >= FLATTEN_LIMIT => self.emit(value, index_scalars),
            Value::Array(items) => {
                let start = self.keys.len();
                for item in items {
                    self.ctx.check_for_interrupt()?;
                    self.walk_value(item, array_depth + 1, index_scalars, depth + 1)?;
                }
                if self.keys.len() - start > 1 && self.multikey.insert(self.path.dotted()) {
                    debug!(path = %self.path, "array fanned out to multiple keys");
                }
                Ok(())
            }
            Value::MinKey | Value::MaxKey => Ok(()),
            Value::Undefined if index_scalars => Err(KeyGenError::UnindexableType {
                path: self.path.dotted(),
                type_name: value.type_name(),
            }),
            Value::Undefined => Ok(()),
            scalar => self.emit(scalar, index_scalars),
        }
    }

    fn emit(&mut self, value: &Value, index_scalars: bool) -> KeyGenResult<()> {
        if !index_scalars {
            return Ok(());
        }

        let path = self.path.dotted();
        let size = path.len() + value.encoded_size();
        if size > self.generator.max_key_bytes {
            return Err(KeyGenError::KeyTooLarge {
                path,
                size,
                max: self.generator.max_key_bytes,
            });
        }

        let entry = IndexKeyEntry::new(path, value.clone());
        if self.seen.insert(entry.clone()) {
            self.keys.push(entry);
        }
        Ok(())
    }
}
