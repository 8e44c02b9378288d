//! Metrics registry
//!
//! - Counters only
//! - Monotonic increase
//! - Relaxed atomics; exactness across threads is not required

use std::sync::atomic::{AtomicU64, Ordering};

use serde::Serialize;

static GLOBAL: MetricsRegistry = MetricsRegistry::new();

/// Process-wide registry used by the engine components
pub fn global() -> &'static MetricsRegistry {
    &GLOBAL
}

/// Operational counters for the query core
#[derive(Debug, Default)]
pub struct MetricsRegistry {
    /// Documents whose keys were generated
    documents_indexed: AtomicU64,
    /// Index keys emitted
    keys_generated: AtomicU64,
    /// Documents rejected by key generation
    keygen_failures: AtomicU64,
    /// Documents passed through a projection
    documents_projected: AtomicU64,
    /// Results returned by stages
    stage_results: AtomicU64,
    /// Results discarded by skip stages
    results_skipped: AtomicU64,
    /// Groups finalized by group stages
    groups_finalized: AtomicU64,
}

impl MetricsRegistry {
    /// Create a new metrics registry with all counters at zero
    pub const fn new() -> Self {
        Self {
            documents_indexed: AtomicU64::new(0),
            keys_generated: AtomicU64::new(0),
            keygen_failures: AtomicU64::new(0),
            documents_projected: AtomicU64::new(0),
            stage_results: AtomicU64::new(0),
            results_skipped: AtomicU64::new(0),
            groups_finalized: AtomicU64::new(0),
        }
    }

    // Key generation

    /// Record one successfully indexed document and its key count
    pub fn record_document_indexed(&self, keys: u64) {
        self.documents_indexed.fetch_add(1, Ordering::Relaxed);
        self.keys_generated.fetch_add(keys, Ordering::Relaxed);
    }

    pub fn increment_keygen_failures(&self) {
        self.keygen_failures.fetch_add(1, Ordering::Relaxed);
    }

    // Projection

    pub fn increment_documents_projected(&self) {
        self.documents_projected.fetch_add(1, Ordering::Relaxed);
    }

    // Stages

    pub fn increment_stage_results(&self) {
        self.stage_results.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_results_skipped(&self) {
        self.results_skipped.fetch_add(1, Ordering::Relaxed);
    }

    pub fn add_groups_finalized(&self, groups: u64) {
        self.groups_finalized.fetch_add(groups, Ordering::Relaxed);
    }

    /// Point-in-time copy of every counter
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            documents_indexed: self.documents_indexed.load(Ordering::Relaxed),
            keys_generated: self.keys_generated.load(Ordering::Relaxed),
            keygen_failures: self.keygen_failures.load(Ordering::Relaxed),
            documents_projected: self.documents_projected.load(Ordering::Relaxed),
            stage_results: self.stage_results.load(Ordering::Relaxed),
            results_skipped: self.results_skipped.load(Ordering::Relaxed),
            groups_finalized: self.groups_finalized.load(Ordering::Relaxed),
        }
    }
}

/// Serializable snapshot of the registry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct MetricsSnapshot {
    pub documents_indexed: u64,
    pub keys_generated: u64,
    pub keygen_failures: u64,
    pub documents_projected: u64,
    pub stage_results: u64,
    pub results_skipped: u64,
    pub groups_finalized: u64,
}
