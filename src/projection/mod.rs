//! Projection engine
//!
//! A projection spec is parsed once into a tree and then applied to any
//! number of documents.
//!
//! # Modes
//!
//! - Inclusion: only named fields survive, plus `_id` unless `_id: 0`
//! - Exclusion: named fields are dropped, everything else survives
//!
//! Mixing the two (other than the root `_id`) is rejected at parse time.
//! `$slice` bounds arrays without affecting the mode.

mod errors;
mod node;
mod parse;
#[allow(clippy::module_inception)]
mod projection;

pub use errors::{ProjectionError, ProjectionResult};
pub use node::ArraySlice;
pub use projection::Projection;
