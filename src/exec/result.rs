//! Results flowing between stages

use serde::Serialize;

use crate::document::Document;

/// Where a result came from and how it sorts when merged
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResultMetadata {
    pub shard_id: String,
    pub sort_key: Option<Document>,
}

/// One result passed up the stage chain
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ClusterQueryResult {
    document: Document,
    #[serde(skip_serializing_if = "Option::is_none")]
    metadata: Option<ResultMetadata>,
}

impl ClusterQueryResult {
    pub fn new(document: Document) -> Self {
        Self {
            document,
            metadata: None,
        }
    }

    pub fn with_metadata(mut self, metadata: ResultMetadata) -> Self {
        self.metadata = Some(metadata);
        self
    }

    pub fn document(&self) -> &Document {
        &self.document
    }

    pub fn metadata(&self) -> Option<&ResultMetadata> {
        self.metadata.as_ref()
    }

    pub fn into_document(self) -> Document {
        self.document
    }

    /// Replaces the document, keeping the metadata
    pub fn map_document(self, f: impl FnOnce(Document) -> Document) -> Self {
        Self {
            document: f(self.document),
            metadata: self.metadata,
        }
    }
}

impl From<Document> for ClusterQueryResult {
    fn from(document: Document) -> Self {
        Self::new(document)
    }
}
