//! Observability for the query core
//!
//! - Structured logging through `tracing`, one typed `Event` per line
//! - Process-wide counters in `MetricsRegistry`
//!
//! Observability is read-only: nothing here changes execution results.
//!
//! # Usage
//!
//! ```ignore
//! use docquery::observability::{self, Event};
//!
//! tracing::debug!(event = %Event::KeygenComplete, keys = 3);
//! observability::metrics().record_document_indexed(3);
//! ```

mod events;
mod metrics;

pub use events::Event;
pub use metrics::{global as metrics, MetricsRegistry, MetricsSnapshot};
