//! Leaf stage fed from a queue
//!
//! Stands in for the transport that delivers remote results: the owner
//! queues results, errors and end-of-stream markers, and `next` replays
//! them in order. An end-of-stream marker or an empty queue ends the
//! stream for good; anything queued behind it is never handed out.

use std::collections::VecDeque;

use crate::document::Document;

use super::errors::{StageError, StageResult};
use super::result::ClusterQueryResult;
use super::stage::RouterStage;

#[derive(Debug)]
enum Queued {
    Result(ClusterQueryResult),
    Error(StageError),
    EndOfStream,
}

#[derive(Debug, Default)]
pub struct QueuedDataStage {
    queue: VecDeque<Queued>,
    remotes_exhausted: bool,
    exhausted: bool,
    killed: bool,
}

impl QueuedDataStage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stage holding every document, with remotes already exhausted
    pub fn from_documents(documents: impl IntoIterator<Item = Document>) -> Self {
        let mut stage = Self::new();
        for document in documents {
            stage.queue_result(ClusterQueryResult::new(document));
        }
        stage.mark_remotes_exhausted();
        stage
    }

    pub fn queue_result(&mut self, result: ClusterQueryResult) {
        self.queue.push_back(Queued::Result(result));
    }

    pub fn queue_error(&mut self, error: impl Into<StageError>) {
        self.queue.push_back(Queued::Error(error.into()));
    }

    pub fn queue_eof(&mut self) {
        self.queue.push_back(Queued::EndOfStream);
    }

    pub fn mark_remotes_exhausted(&mut self) {
        self.remotes_exhausted = true;
    }

    /// Entries not yet handed out
    pub fn pending(&self) -> usize {
        self.queue.len()
    }
}

impl RouterStage for QueuedDataStage {
    fn next(&mut self) -> StageResult<Option<ClusterQueryResult>> {
        if self.killed || self.exhausted {
            return Ok(None);
        }
        match self.queue.pop_front() {
            Some(Queued::Result(result)) => Ok(Some(result)),
            Some(Queued::Error(error)) => Err(error),
            Some(Queued::EndOfStream) | None => {
                self.exhausted = true;
                self.queue.clear();
                Ok(None)
            }
        }
    }

    fn kill(&mut self) {
        self.killed = true;
        self.queue.clear();
    }

    fn remotes_exhausted(&self) -> bool {
        self.remotes_exhausted
    }
}
