//! Limit stage
//!
//! `Counting -> Exhausted`. Once `limit` results have been returned the
//! child is never pulled again.

use tracing::{debug, warn};

use crate::context::ExecutionContext;
use crate::observability::{self, Event};

use super::errors::{StageError, StageResult};
use super::result::ClusterQueryResult;
use super::stage::{BoxedStage, RouterStage};

const STAGE: &str = "limit";

pub struct LimitStage {
    ctx: ExecutionContext,
    child: BoxedStage,
    limit: u64,
    returned: u64,
    exhausted: bool,
}

impl LimitStage {
    /// Fails unless `limit > 0`.
    pub fn new(ctx: ExecutionContext, child: BoxedStage, limit: i64) -> StageResult<Self> {
        if limit <= 0 {
            warn!(event = %Event::StageRejected, stage = STAGE, limit = limit);
            return Err(StageError::invalid(STAGE, format!("limit must be positive, got {limit}")));
        }
        debug!(event = %Event::StageBuilt, stage = STAGE, op_id = %ctx.op_id(), limit = limit);
        Ok(Self {
            ctx,
            child,
            limit: limit as u64,
            returned: 0,
            exhausted: false,
        })
    }

    /// Results returned so far
    pub fn returned(&self) -> u64 {
        self.returned
    }

    fn exhaust(&mut self) -> StageResult<Option<ClusterQueryResult>> {
        if !self.exhausted {
            debug!(
                event = %Event::StageExhausted,
                stage = STAGE,
                op_id = %self.ctx.op_id(),
                returned = self.returned,
            );
        }
        self.exhausted = true;
        Ok(None)
    }
}

impl RouterStage for LimitStage {
    fn next(&mut self) -> StageResult<Option<ClusterQueryResult>> {
        if self.exhausted || self.returned >= self.limit {
            return self.exhaust();
        }
        match self.child.next()? {
            Some(result) => {
                self.returned += 1;
                observability::metrics().increment_stage_results();
                Ok(Some(result))
            }
            None => self.exhaust(),
        }
    }

    fn kill(&mut self) {
        debug!(event = %Event::StageKilled, stage = STAGE, op_id = %self.ctx.op_id());
        self.exhausted = true;
        self.child.kill();
    }

    fn remotes_exhausted(&self) -> bool {
        self.child.remotes_exhausted()
    }
}
