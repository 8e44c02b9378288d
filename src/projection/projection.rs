use tracing::{debug, warn};

use crate::document::Document;
use crate::observability::{self, Event};

use super::errors::ProjectionResult;
use super::node::ProjectionNode;
use super::parse::parse_spec;

/// A parsed projection, reusable across any number of documents
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Projection {
    root: ProjectionNode,
    inclusion: bool,
    include_id: bool,
    id_explicit: bool,
}

impl Projection {
    /// Builds a projection from a spec document.
    ///
    /// Every malformed spec is rejected here; `transform` cannot fail.
    pub fn parse(spec: &Document) -> ProjectionResult<Self> {
        match parse_spec(spec) {
            Ok(parsed) => {
                debug!(
                    event = %Event::ProjectionBuilt,
                    inclusion = parsed.inclusion,
                    include_id = parsed.include_id,
                    fields = parsed.root.children.len(),
                );
                Ok(Self {
                    root: parsed.root,
                    inclusion: parsed.inclusion,
                    include_id: parsed.include_id,
                    id_explicit: parsed.id_explicit,
                })
            }
            Err(err) => {
                warn!(event = %Event::ProjectionRejected, code = err.code(), error = %err);
                Err(err)
            }
        }
    }

    /// Projects one document. Absent fields are never fabricated.
    pub fn transform(&self, doc: &Document) -> Document {
        observability::metrics().increment_documents_projected();
        self.root.project_document(doc, Some(self.include_id))
    }

    /// True when the fields of an index key pattern alone satisfy this
    /// projection, so the full document need not be fetched.
    ///
    /// Requires an inclusion projection of bare top-level fields, all in
    /// the key pattern. `_id` must be in the pattern only when the spec
    /// names it explicitly.
    pub fn key_enough(&self, key_pattern: &[&str]) -> bool {
        if !self.inclusion {
            return false;
        }
        if self.id_explicit && self.include_id && !key_pattern.contains(&"_id") {
            return false;
        }
        self.root.children.iter().all(|(name, node)| {
            !node.special && node.include && key_pattern.contains(&name.as_str())
        })
    }

    pub fn is_inclusion(&self) -> bool {
        self.inclusion
    }

    pub fn include_id(&self) -> bool {
        self.include_id
    }
}
