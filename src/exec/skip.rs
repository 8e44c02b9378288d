//! Skip stage
//!
//! `Priming -> Passthrough -> Exhausted`. The first `next` discards
//! `skip` results, then every call passes through to the child.

use tracing::{debug, trace, warn};

use crate::context::ExecutionContext;
use crate::observability::{self, Event};

use super::errors::{StageError, StageResult};
use super::result::ClusterQueryResult;
use super::stage::{BoxedStage, RouterStage};

const STAGE: &str = "skip";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SkipState {
    Priming,
    Passthrough,
    Exhausted,
}

pub struct SkipStage {
    ctx: ExecutionContext,
    child: BoxedStage,
    skip: u64,
    skipped: u64,
    state: SkipState,
}

impl SkipStage {
    /// Fails unless `skip > 0`.
    pub fn new(ctx: ExecutionContext, child: BoxedStage, skip: i64) -> StageResult<Self> {
        if skip <= 0 {
            warn!(event = %Event::StageRejected, stage = STAGE, skip = skip);
            return Err(StageError::invalid(STAGE, format!("skip must be positive, got {skip}")));
        }
        debug!(event = %Event::StageBuilt, stage = STAGE, op_id = %ctx.op_id(), skip = skip);
        Ok(Self {
            ctx,
            child,
            skip: skip as u64,
            skipped: 0,
            state: SkipState::Priming,
        })
    }

    /// Results discarded so far
    pub fn skipped(&self) -> u64 {
        self.skipped
    }

    fn exhaust(&mut self) -> StageResult<Option<ClusterQueryResult>> {
        if self.state != SkipState::Exhausted {
            debug!(event = %Event::StageExhausted, stage = STAGE, skipped = self.skipped);
        }
        self.state = SkipState::Exhausted;
        Ok(None)
    }
}

impl RouterStage for SkipStage {
    fn next(&mut self) -> StageResult<Option<ClusterQueryResult>> {
        if self.state == SkipState::Exhausted {
            return Ok(None);
        }

        while self.state == SkipState::Priming && self.skipped < self.skip {
            if let Err(interrupt) = self.ctx.check_for_interrupt() {
                warn!(
                    event = %Event::StageInterrupted,
                    stage = STAGE,
                    op_id = %self.ctx.op_id(),
                    skipped = self.skipped,
                    code = interrupt.code(),
                );
                return Err(interrupt.into());
            }
            match self.child.next()? {
                Some(_) => {
                    self.skipped += 1;
                    observability::metrics().increment_results_skipped();
                    trace!(stage = STAGE, skipped = self.skipped, "discarded result");
                }
                None => return self.exhaust(),
            }
        }
        self.state = SkipState::Passthrough;

        match self.child.next()? {
            Some(result) => {
                observability::metrics().increment_stage_results();
                Ok(Some(result))
            }
            None => self.exhaust(),
        }
    }

    fn kill(&mut self) {
        debug!(event = %Event::StageKilled, stage = STAGE, op_id = %self.ctx.op_id());
        self.state = SkipState::Exhausted;
        self.child.kill();
    }

    fn remotes_exhausted(&self) -> bool {
        self.child.remotes_exhausted()
    }
}
