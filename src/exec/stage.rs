//! The stage contract

use super::errors::StageResult;
use super::result::ClusterQueryResult;

/// A pull-based operator in a linear chain.
///
/// Each stage owns at most one child. `Ok(None)` is end of stream and is
/// terminal: once returned, every later call returns it too.
pub trait RouterStage {
    /// Next result, end of stream, or the child's error unchanged
    fn next(&mut self) -> StageResult<Option<ClusterQueryResult>>;

    /// Stops the chain. Later `next` calls return end of stream without
    /// touching the child.
    fn kill(&mut self);

    /// True once every remote source feeding the chain is drained
    fn remotes_exhausted(&self) -> bool;
}

pub type BoxedStage = Box<dyn RouterStage>;
