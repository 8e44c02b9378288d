//! Helpers shared by the stage tests

use std::cell::Cell;
use std::rc::Rc;

use crate::document::{Document, Value};

use super::errors::StageResult;
use super::result::ClusterQueryResult;
use super::stage::RouterStage;

/// One document `{"v": label}` per label
pub(crate) fn docs(values: &[&str]) -> Vec<Document> {
    values
        .iter()
        .map(|v| {
            let mut doc = Document::new();
            doc.insert("v", *v);
            doc
        })
        .collect()
}

/// Drains a stage and returns each result's `v` field
pub(crate) fn labels(stage: &mut dyn RouterStage) -> Vec<String> {
    let mut out = Vec::new();
    while let Some(result) = stage.next().unwrap() {
        match result.document().get("v") {
            Some(Value::String(s)) => out.push(s.clone()),
            other => panic!("unexpected v: {other:?}"),
        }
    }
    out
}

/// Counts how often the wrapped stage is pulled
pub(crate) struct CountingStage<S> {
    inner: S,
    calls: Rc<Cell<usize>>,
}

impl<S: RouterStage> CountingStage<S> {
    pub(crate) fn wrap(inner: S) -> (Self, Rc<Cell<usize>>) {
        let calls = Rc::new(Cell::new(0));
        (
            Self {
                inner,
                calls: Rc::clone(&calls),
            },
            calls,
        )
    }
}

impl<S: RouterStage> RouterStage for CountingStage<S> {
    fn next(&mut self) -> StageResult<Option<ClusterQueryResult>> {
        self.calls.set(self.calls.get() + 1);
        self.inner.next()
    }

    fn kill(&mut self) {
        self.inner.kill();
    }

    fn remotes_exhausted(&self) -> bool {
        self.inner.remotes_exhausted()
    }
}
