//! docquery - query and indexing core for document databases
//!
//! Four pieces, each usable on its own:
//!
//! - `index`: wildcard index key generation with multikey tracking
//! - `projection`: inclusion/exclusion projections with `$slice`
//! - `accumulator`: per-group reducers with partial merge
//! - `exec`: pull-based stage chain (skip, limit, projection, group)
//!
//! `document` holds the value model they share; `context` carries
//! cancellation and deadlines through long traversals.

pub mod accumulator;
pub mod cli;
pub mod config;
pub mod context;
pub mod document;
pub mod error;
pub mod exec;
pub mod index;
pub mod observability;
pub mod projection;

pub use error::{Error, ErrorClass, Result};
