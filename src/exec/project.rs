//! Projection stage

use tracing::debug;

use crate::context::ExecutionContext;
use crate::observability::Event;
use crate::projection::Projection;

use super::errors::StageResult;
use super::result::ClusterQueryResult;
use super::stage::{BoxedStage, RouterStage};

const STAGE: &str = "projection";

/// Applies a parsed projection to every result; metadata is kept.
pub struct ProjectionStage {
    ctx: ExecutionContext,
    child: BoxedStage,
    projection: Projection,
    exhausted: bool,
    killed: bool,
}

impl ProjectionStage {
    pub fn new(ctx: ExecutionContext, child: BoxedStage, projection: Projection) -> Self {
        debug!(
            event = %Event::StageBuilt,
            stage = STAGE,
            op_id = %ctx.op_id(),
            inclusion = projection.is_inclusion(),
        );
        Self {
            ctx,
            child,
            projection,
            exhausted: false,
            killed: false,
        }
    }
}

impl RouterStage for ProjectionStage {
    fn next(&mut self) -> StageResult<Option<ClusterQueryResult>> {
        if self.killed || self.exhausted {
            return Ok(None);
        }
        match self.child.next()? {
            Some(result) => {
                let projection = &self.projection;
                Ok(Some(result.map_document(|doc| projection.transform(&doc))))
            }
            None => {
                debug!(
                    event = %Event::StageExhausted,
                    stage = STAGE,
                    op_id = %self.ctx.op_id(),
                );
                self.exhausted = true;
                Ok(None)
            }
        }
    }

    fn kill(&mut self) {
        debug!(event = %Event::StageKilled, stage = STAGE, op_id = %self.ctx.op_id());
        self.killed = true;
        self.child.kill();
    }

    fn remotes_exhausted(&self) -> bool {
        self.child.remotes_exhausted()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::Document;
    use crate::exec::testing::CountingStage;
    use crate::exec::{QueuedDataStage, ResultMetadata};
    use serde_json::json;

    fn project(json: serde_json::Value) -> Projection {
        Projection::parse(&Document::try_from(json).unwrap()).unwrap()
    }

    #[test]
    fn test_projects_and_keeps_metadata() {
        let doc = Document::try_from(json!({"_id": 1, "a": 2, "b": 3})).unwrap();
        let metadata = ResultMetadata {
            shard_id: "shard-a".into(),
            sort_key: None,
        };
        let mut child = QueuedDataStage::new();
        child.queue_result(ClusterQueryResult::new(doc).with_metadata(metadata.clone()));

        let mut stage = ProjectionStage::new(
            ExecutionContext::new(),
            Box::new(child),
            project(json!({"a": 1})),
        );

        let result = stage.next().unwrap().unwrap();
        assert_eq!(result.document().to_json(), json!({"_id": 1, "a": 2}));
        assert_eq!(result.metadata(), Some(&metadata));
        assert!(stage.next().unwrap().is_none());
    }

    #[test]
    fn test_end_of_stream_is_terminal() {
        let mut child = QueuedDataStage::new();
        child.queue_result(Document::try_from(json!({"a": 1, "b": 1})).unwrap().into());
        child.queue_eof();
        child.queue_result(Document::try_from(json!({"a": 2})).unwrap().into());
        let (counting, calls) = CountingStage::wrap(child);
        let mut stage = ProjectionStage::new(
            ExecutionContext::new(),
            Box::new(counting),
            project(json!({"a": 1})),
        );

        let first = stage.next().unwrap().unwrap();
        assert_eq!(first.document().to_json(), json!({"a": 1}));
        assert!(stage.next().unwrap().is_none());
        assert!(stage.next().unwrap().is_none());
        assert_eq!(calls.get(), 2);
    }
}
