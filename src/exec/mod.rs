//! Execution stage chain
//!
//! Pull-based stages composed into a linear chain. Each stage owns its
//! child and is driven only by `next` calls; there is no open or close
//! step.
//!
//! # Stages
//!
//! - `QueuedDataStage`: leaf replaying queued results and errors
//! - `SkipStage`: discards the first N results
//! - `LimitStage`: returns at most N results
//! - `ProjectionStage`: reshapes each document
//! - `GroupStage`: folds all input into one document per group
//!
//! # Invariants
//!
//! - Child errors are returned unchanged on the same call
//! - End of stream is terminal and repeatable
//! - Skip and limit parameters are validated at construction

mod errors;
mod group;
mod limit;
mod project;
mod queued;
mod result;
mod skip;
mod stage;
#[cfg(test)]
mod testing;

pub use errors::{StageError, StageResult, UpstreamError};
pub use group::{AccumulatorArg, GroupField, GroupSpec, GroupStage};
pub use limit::LimitStage;
pub use project::ProjectionStage;
pub use queued::QueuedDataStage;
pub use result::{ClusterQueryResult, ResultMetadata};
pub use skip::SkipStage;
pub use stage::{BoxedStage, RouterStage};
