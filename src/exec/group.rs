//! Group stage
//!
//! Drains its child on the first `next`, folds each document into the
//! accumulators of its group, then emits one document per group in order
//! of first appearance: `{"_id": <key>, <field>: <result>, ...}`.

use std::collections::{BTreeMap, VecDeque};

use tracing::{debug, info, warn};

use crate::accumulator::{Accumulator, AccumulatorOptions};
use crate::context::ExecutionContext;
use crate::document::{Document, FieldPath, Value};
use crate::observability::{self, Event};

use super::errors::{StageError, StageResult};
use super::result::ClusterQueryResult;
use super::stage::{BoxedStage, RouterStage};

const STAGE: &str = "group";

/// Input fed to one accumulator
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AccumulatorArg {
    /// `"$a.b"`: the value at that path, missing if absent
    Field(FieldPath),
    /// Any other value, fed as-is for every document
    Constant(Value),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroupField {
    pub name: String,
    pub operator: &'static str,
    pub arg: AccumulatorArg,
}

/// Parsed `by` path and output fields
#[derive(Debug, Clone)]
pub struct GroupSpec {
    by: FieldPath,
    fields: Vec<GroupField>,
    options: AccumulatorOptions,
}

impl GroupSpec {
    /// Parses a group key path (`"a.b"` or `"$a.b"`) and an accumulator
    /// spec such as `{"total": {"$sum": "$qty"}, "n": {"$count": {}}}`.
    pub fn parse(
        by: &str,
        accumulators: &Document,
        options: AccumulatorOptions,
    ) -> StageResult<Self> {
        let by = FieldPath::parse(by.strip_prefix('$').unwrap_or(by))
            .map_err(|e| StageError::invalid(STAGE, e.to_string()))?;

        let mut fields = Vec::with_capacity(accumulators.len());
        for (name, spec) in accumulators.iter() {
            if name.is_empty() || name == "_id" || name.contains('.') {
                return Err(StageError::invalid(
                    STAGE,
                    format!("invalid output field name '{name}'"),
                ));
            }
            let Some(spec) = spec.as_document().filter(|d| d.len() == 1) else {
                return Err(StageError::invalid(
                    STAGE,
                    format!("'{name}' must be an object with exactly one accumulator"),
                ));
            };
            let Some((operator, arg)) = spec.iter().next() else {
                return Err(StageError::invalid(STAGE, format!("'{name}' is empty")));
            };

            let operator = Accumulator::create(operator, &options)?.name();
            let arg = match arg {
                Value::String(s) if s.starts_with('$') => AccumulatorArg::Field(
                    FieldPath::parse(&s[1..])
                        .map_err(|e| StageError::invalid(STAGE, e.to_string()))?,
                ),
                other => AccumulatorArg::Constant(other.clone()),
            };
            fields.push(GroupField {
                name: name.to_string(),
                operator,
                arg,
            });
        }

        Ok(Self {
            by,
            fields,
            options,
        })
    }

    pub fn by(&self) -> &FieldPath {
        &self.by
    }

    pub fn fields(&self) -> &[GroupField] {
        &self.fields
    }

    fn new_accumulators(&self) -> StageResult<Vec<Accumulator>> {
        self.fields
            .iter()
            .map(|f| Accumulator::create(f.operator, &self.options).map_err(StageError::from))
            .collect()
    }
}

pub struct GroupStage {
    ctx: ExecutionContext,
    child: BoxedStage,
    spec: GroupSpec,
    groups: Vec<(Value, Vec<Accumulator>)>,
    index: BTreeMap<Value, usize>,
    output: VecDeque<ClusterQueryResult>,
    drained: bool,
    killed: bool,
}

impl GroupStage {
    pub fn new(ctx: ExecutionContext, child: BoxedStage, spec: GroupSpec) -> Self {
        debug!(
            event = %Event::StageBuilt,
            stage = STAGE,
            op_id = %ctx.op_id(),
            by = %spec.by,
            fields = spec.fields.len(),
        );
        Self {
            ctx,
            child,
            spec,
            groups: Vec::new(),
            index: BTreeMap::new(),
            output: VecDeque::new(),
            drained: false,
            killed: false,
        }
    }

    /// Pulls until end of stream. Resumable: an error leaves the groups
    /// built so far in place.
    fn drain(&mut self) -> StageResult<()> {
        loop {
            if let Err(interrupt) = self.ctx.check_for_interrupt() {
                warn!(
                    event = %Event::StageInterrupted,
                    stage = STAGE,
                    op_id = %self.ctx.op_id(),
                    code = interrupt.code(),
                );
                return Err(interrupt.into());
            }
            match self.child.next()? {
                Some(result) => self.accumulate(result.document())?,
                None => break,
            }
        }

        let groups = std::mem::take(&mut self.groups);
        self.index.clear();
        let count = groups.len();
        for (key, mut accumulators) in groups {
            let mut doc = Document::with_capacity(self.spec.fields.len() + 1);
            doc.insert("_id", key);
            for (field, acc) in self.spec.fields.iter().zip(accumulators.iter_mut()) {
                doc.insert(field.name.as_str(), acc.get_value());
            }
            self.output.push_back(ClusterQueryResult::new(doc));
        }

        observability::metrics().add_groups_finalized(count as u64);
        info!(event = %Event::GroupFinalized, op_id = %self.ctx.op_id(), groups = count);
        Ok(())
    }

    /// Folds `doc` into its group. A rejected document leaves every
    /// accumulator, and the set of groups, as it was.
    fn accumulate(&mut self, doc: &Document) -> StageResult<()> {
        let key = self.spec.by.extract(doc).unwrap_or(Value::Null);
        let inputs: Vec<Option<Value>> = self
            .spec
            .fields
            .iter()
            .map(|field| match &field.arg {
                AccumulatorArg::Field(path) => path.extract(doc),
                AccumulatorArg::Constant(value) => Some(value.clone()),
            })
            .collect();

        match self.index.get(&key) {
            Some(&slot) => fold(&mut self.groups[slot].1, &inputs),
            None => {
                let mut accumulators = self.spec.new_accumulators()?;
                fold(&mut accumulators, &inputs)?;
                self.groups.push((key.clone(), accumulators));
                self.index.insert(key, self.groups.len() - 1);
                Ok(())
            }
        }
    }
}

/// All-or-nothing: every accumulator admits its input before any is folded.
fn fold(accumulators: &mut [Accumulator], inputs: &[Option<Value>]) -> StageResult<()> {
    for (acc, input) in accumulators.iter().zip(inputs) {
        acc.admit(input.as_ref())?;
    }
    for (acc, input) in accumulators.iter_mut().zip(inputs) {
        acc.process(input.as_ref())?;
    }
    Ok(())
}

impl RouterStage for GroupStage {
    fn next(&mut self) -> StageResult<Option<ClusterQueryResult>> {
        if self.killed {
            return Ok(None);
        }
        if !self.drained {
            self.drain()?;
            self.drained = true;
        }
        match self.output.pop_front() {
            Some(result) => {
                observability::metrics().increment_stage_results();
                Ok(Some(result))
            }
            None => Ok(None),
        }
    }

    fn kill(&mut self) {
        debug!(event = %Event::StageKilled, stage = STAGE, op_id = %self.ctx.op_id());
        self.killed = true;
        self.output.clear();
        self.child.kill();
    }

    fn remotes_exhausted(&self) -> bool {
        self.child.remotes_exhausted()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::exec::{QueuedDataStage, UpstreamError};
    use serde_json::{json, Value as Json};

    fn doc(value: Json) -> Document {
        Document::try_from(value).unwrap()
    }

    fn spec(by: &str, acc: Json) -> StageResult<GroupSpec> {
        GroupSpec::parse(by, &doc(acc), AccumulatorOptions::default())
    }

    fn run(by: &str, acc: Json, input: Vec<Json>) -> Vec<Json> {
        let child = QueuedDataStage::from_documents(input.into_iter().map(doc));
        let mut stage = GroupStage::new(
            ExecutionContext::new(),
            Box::new(child),
            spec(by, acc).unwrap(),
        );
        let mut out = Vec::new();
        while let Some(result) = stage.next().unwrap() {
            out.push(result.document().to_json());
        }
        out
    }

    #[test]
    fn test_groups_in_first_appearance_order() {
        let out = run(
            "$k",
            json!({"total": {"$sum": "$n"}, "last": {"$last": "$n"}, "count": {"$count": {}}}),
            vec![
                json!({"k": "b", "n": 1}),
                json!({"k": "a", "n": 2}),
                json!({"k": "b", "n": 3}),
                json!({"n": 4}),
            ],
        );
        assert_eq!(
            out,
            vec![
                json!({"_id": "b", "total": 4, "last": 3, "count": 2}),
                json!({"_id": "a", "total": 2, "last": 2, "count": 1}),
                json!({"_id": null, "total": 4, "last": 4, "count": 1}),
            ]
        );
    }

    #[test]
    fn test_missing_field_and_constant_args() {
        let out = run(
            "k",
            json!({"vals": {"$push": "$v"}, "ones": {"$sum": 1}}),
            vec![json!({"k": 1, "v": "x"}), json!({"k": 1})],
        );
        assert_eq!(out, vec![json!({"_id": 1, "vals": ["x"], "ones": 2})]);
    }

    #[test]
    fn test_numeric_keys_group_across_types() {
        let out = run(
            "k",
            json!({"n": {"$count": {}}}),
            vec![json!({"k": 1}), json!({"k": 1.0})],
        );
        assert_eq!(out, vec![json!({"_id": 1, "n": 2})]);
    }

    #[test]
    fn test_invalid_specs() {
        assert_eq!(
            spec("k", json!({"x": {"$median": "$v"}})).unwrap_err().code(),
            "DQ_UNKNOWN_ACCUMULATOR"
        );
        for bad in [
            json!({"_id": {"$sum": 1}}),
            json!({"a.b": {"$sum": 1}}),
            json!({"x": 1}),
            json!({"x": {"$sum": 1, "$avg": 1}}),
            json!({"x": {"$sum": "$"}}),
        ] {
            assert_eq!(
                spec("k", bad).unwrap_err().code(),
                "DQ_INVALID_STAGE_PARAMETER"
            );
        }
        assert!(spec("", json!({})).is_err());
    }

    #[test]
    fn test_rejected_document_leaves_group_untouched() {
        let options = AccumulatorOptions {
            record_missing: false,
            max_memory_bytes: 30,
        };
        let acc = doc(json!({"n": {"$count": {}}, "all": {"$push": "$v"}}));
        let child = QueuedDataStage::from_documents(vec![
            doc(json!({"k": 1, "v": "x"})),
            doc(json!({"k": 1, "v": "y".repeat(100)})),
            doc(json!({"k": 2, "v": "z".repeat(100)})),
            doc(json!({"k": 1, "v": "z"})),
        ]);
        let mut stage = GroupStage::new(
            ExecutionContext::new(),
            Box::new(child),
            GroupSpec::parse("k", &acc, options).unwrap(),
        );

        for _ in 0..2 {
            let err = stage.next().unwrap_err();
            assert_eq!(err.code(), "DQ_MEMORY_LIMIT_EXCEEDED");
            assert!(err.class().is_recoverable());
        }

        let result = stage.next().unwrap().unwrap();
        assert_eq!(
            result.document().to_json(),
            json!({"_id": 1, "n": 2, "all": ["x", "z"]})
        );
        assert!(stage.next().unwrap().is_none());
    }

    #[test]
    fn test_upstream_error_then_resume() {
        let mut child = QueuedDataStage::new();
        child.queue_result(doc(json!({"k": 1})).into());
        child.queue_error(UpstreamError::new("shard-a", "retry later"));
        child.queue_result(doc(json!({"k": 1})).into());
        let mut stage = GroupStage::new(
            ExecutionContext::new(),
            Box::new(child),
            spec("k", json!({"n": {"$count": {}}})).unwrap(),
        );

        assert_eq!(stage.next().unwrap_err().code(), "DQ_UPSTREAM");
        let result = stage.next().unwrap().unwrap();
        assert_eq!(result.document().to_json(), json!({"_id": 1, "n": 2}));
        assert!(stage.next().unwrap().is_none());
    }
}
