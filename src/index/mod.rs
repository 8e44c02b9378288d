//! Wildcard index subsystem
//!
//! Produces index keys for every path under a wildcard pattern and keeps
//! them in an in-memory session.
//!
//! # Design Principles
//!
//! - Deterministic: field order traversal, BTreeMap storage, sorted record ids
//! - All-or-nothing: a rejected document contributes no keys
//! - Cooperative: traversal checks the execution context per array element
//!
//! # Invariants
//!
//! - Each (path, value) pair appears at most once per document
//! - Multikey paths never shrink within a session

mod btree;
mod entry;
mod errors;
mod keygen;
mod pattern;

pub use btree::{RecordId, WildcardIndex};
pub use entry::{GeneratedKeys, IndexKeyEntry, MultikeyPaths};
pub use errors::{KeyGenError, KeyGenResult};
pub use keygen::WildcardKeyGenerator;
pub use pattern::{WildcardPattern, WILDCARD};
