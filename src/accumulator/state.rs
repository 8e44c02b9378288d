//! Per-operator running state
//!
//! Each variant owns its state outright. `partial` produces a value that
//! another instance of the same operator can `merge`; merging partials in
//! partition order gives the same result as processing every input in one
//! instance.

use std::collections::BTreeSet;

use crate::document::{Document, Value};

use super::errors::{AccumulatorError, AccumulatorResult};

/// Stand-in recorded for a missing input when `record_missing` is set
static MISSING: Value = Value::Null;

/// Ceiling and missing-input policy shared by all operators
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Limits {
    pub(crate) record_missing: bool,
    pub(crate) max_memory_bytes: usize,
}

/// Integer sum that widens to a double on overflow or on a double input
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) enum NumericSum {
    Int(i64),
    Double(f64),
}

impl NumericSum {
    pub(crate) fn add(&mut self, value: &Value) {
        *self = match (*self, value) {
            (NumericSum::Int(a), Value::Int(b)) => match a.checked_add(*b) {
                Some(sum) => NumericSum::Int(sum),
                None => NumericSum::Double(a as f64 + *b as f64),
            },
            (NumericSum::Int(a), Value::Double(b)) => NumericSum::Double(a as f64 + b),
            (NumericSum::Double(a), other) => match other.as_f64() {
                Some(b) => NumericSum::Double(a + b),
                None => NumericSum::Double(a),
            },
            (current, _) => current,
        };
    }

    pub(crate) fn as_f64(&self) -> f64 {
        match *self {
            NumericSum::Int(i) => i as f64,
            NumericSum::Double(d) => d,
        }
    }

    pub(crate) fn to_value(self) -> Value {
        match self {
            NumericSum::Int(i) => Value::Int(i),
            NumericSum::Double(d) => Value::Double(d),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum AccumulatorState {
    First(Option<Value>),
    Last(Option<Value>),
    Sum(NumericSum),
    Avg { sum: NumericSum, count: i64 },
    Min(Option<Value>),
    Max(Option<Value>),
    Push { items: Vec<Value>, bytes: usize },
    AddToSet { items: BTreeSet<Value>, bytes: usize },
    Count(i64),
}

impl AccumulatorState {
    pub(crate) fn first() -> Self {
        AccumulatorState::First(None)
    }

    pub(crate) fn last() -> Self {
        AccumulatorState::Last(None)
    }

    pub(crate) fn sum() -> Self {
        AccumulatorState::Sum(NumericSum::Int(0))
    }

    pub(crate) fn avg() -> Self {
        AccumulatorState::Avg {
            sum: NumericSum::Int(0),
            count: 0,
        }
    }

    pub(crate) fn min() -> Self {
        AccumulatorState::Min(None)
    }

    pub(crate) fn max() -> Self {
        AccumulatorState::Max(None)
    }

    pub(crate) fn push() -> Self {
        AccumulatorState::Push {
            items: Vec::new(),
            bytes: 0,
        }
    }

    pub(crate) fn add_to_set() -> Self {
        AccumulatorState::AddToSet {
            items: BTreeSet::new(),
            bytes: 0,
        }
    }

    pub(crate) fn count() -> Self {
        AccumulatorState::Count(0)
    }

    /// Folds one input. `None` is a missing field.
    pub(crate) fn process(
        &mut self,
        operator: &'static str,
        input: Option<&Value>,
        limits: &Limits,
    ) -> AccumulatorResult<()> {
        if let AccumulatorState::Count(n) = self {
            *n += 1;
            return Ok(());
        }

        let Some(value) = self.resolve(input, limits) else {
            return Ok(());
        };

        match self {
            AccumulatorState::First(slot) => {
                if slot.is_none() {
                    *slot = Some(value.clone());
                }
            }
            AccumulatorState::Last(slot) => *slot = Some(value.clone()),
            AccumulatorState::Sum(sum) => {
                if value.is_number() {
                    sum.add(value);
                }
            }
            AccumulatorState::Avg { sum, count } => {
                if value.is_number() {
                    sum.add(value);
                    *count += 1;
                }
            }
            AccumulatorState::Min(slot) => keep_extreme(slot, value, |new, old| new < old),
            AccumulatorState::Max(slot) => keep_extreme(slot, value, |new, old| new > old),
            AccumulatorState::Push { items, bytes } => {
                *bytes = charge(operator, *bytes, value, limits)?;
                items.push(value.clone());
            }
            AccumulatorState::AddToSet { items, bytes } => {
                if !items.contains(value) {
                    *bytes = charge(operator, *bytes, value, limits)?;
                    items.insert(value.clone());
                }
            }
            AccumulatorState::Count(_) => {}
        }
        Ok(())
    }

    /// Fails exactly when `process` would for this input, without
    /// changing the state.
    pub(crate) fn admit(
        &self,
        operator: &'static str,
        input: Option<&Value>,
        limits: &Limits,
    ) -> AccumulatorResult<()> {
        let Some(value) = self.resolve(input, limits) else {
            return Ok(());
        };
        match self {
            AccumulatorState::Push { bytes, .. } => {
                charge(operator, *bytes, value, limits).map(drop)
            }
            AccumulatorState::AddToSet { items, bytes } if !items.contains(value) => {
                charge(operator, *bytes, value, limits).map(drop)
            }
            _ => Ok(()),
        }
    }

    /// The value `process` folds, or `None` when the input is ignored
    fn resolve<'a>(&self, input: Option<&'a Value>, limits: &Limits) -> Option<&'a Value> {
        match input {
            Some(value) => Some(value),
            None if limits.record_missing && self.collects() => Some(&MISSING),
            None => None,
        }
    }

    /// Final result. Does not change the state.
    pub(crate) fn value(&self) -> Value {
        match self {
            AccumulatorState::First(slot) | AccumulatorState::Last(slot) => {
                slot.clone().unwrap_or(Value::Null)
            }
            AccumulatorState::Sum(sum) => sum.to_value(),
            AccumulatorState::Avg { sum, count } => {
                if *count == 0 {
                    Value::Null
                } else {
                    Value::Double(sum.as_f64() / *count as f64)
                }
            }
            AccumulatorState::Min(slot) | AccumulatorState::Max(slot) => {
                slot.clone().unwrap_or(Value::Null)
            }
            AccumulatorState::Push { items, .. } => Value::Array(items.clone()),
            AccumulatorState::AddToSet { items, .. } => {
                Value::Array(items.iter().cloned().collect())
            }
            AccumulatorState::Count(n) => Value::Int(*n),
        }
    }

    /// Shippable partial state
    pub(crate) fn partial(&self) -> Value {
        match self {
            AccumulatorState::First(slot) | AccumulatorState::Last(slot) => {
                Value::Array(slot.iter().cloned().collect())
            }
            AccumulatorState::Avg { sum, count } => {
                let mut doc = Document::with_capacity(2);
                doc.insert("sum", sum.to_value());
                doc.insert("count", Value::Int(*count));
                Value::Object(doc)
            }
            other => other.value(),
        }
    }

    /// Folds a partial produced by another instance of the same operator.
    pub(crate) fn merge(
        &mut self,
        operator: &'static str,
        partial: &Value,
        limits: &Limits,
    ) -> AccumulatorResult<()> {
        let shape = |reason: &str| AccumulatorError::MergeShape {
            operator,
            reason: reason.to_string(),
        };

        match self {
            AccumulatorState::First(slot) => {
                let incoming =
                    single_or_empty(partial).ok_or_else(|| shape("expected [] or [value]"))?;
                if slot.is_none() {
                    *slot = incoming.cloned();
                }
            }
            AccumulatorState::Last(slot) => {
                let incoming =
                    single_or_empty(partial).ok_or_else(|| shape("expected [] or [value]"))?;
                if let Some(value) = incoming {
                    *slot = Some(value.clone());
                }
            }
            AccumulatorState::Sum(sum) => {
                if !partial.is_number() {
                    return Err(shape("expected a number"));
                }
                sum.add(partial);
            }
            AccumulatorState::Avg { sum, count } => {
                let doc = partial
                    .as_document()
                    .ok_or_else(|| shape("expected {sum, count}"))?;
                let partial_sum = doc
                    .get("sum")
                    .filter(|v| v.is_number())
                    .ok_or_else(|| shape("missing numeric 'sum'"))?;
                let partial_count = doc
                    .get("count")
                    .and_then(Value::as_i64)
                    .ok_or_else(|| shape("missing integer 'count'"))?;
                if partial_count < 0 {
                    return Err(shape("'count' must not be negative"));
                }
                sum.add(partial_sum);
                *count += partial_count;
            }
            AccumulatorState::Min(_) | AccumulatorState::Max(_) => {
                self.process(operator, Some(partial), limits)?;
            }
            AccumulatorState::Push { .. } | AccumulatorState::AddToSet { .. } => {
                let items = partial.as_array().ok_or_else(|| shape("expected an array"))?;
                for item in items {
                    self.process(operator, Some(item), limits)?;
                }
            }
            AccumulatorState::Count(n) => {
                let partial_count = partial
                    .as_i64()
                    .ok_or_else(|| shape("expected an integer"))?;
                *n += partial_count;
            }
        }
        Ok(())
    }

    fn collects(&self) -> bool {
        matches!(
            self,
            AccumulatorState::Push { .. } | AccumulatorState::AddToSet { .. }
        )
    }
}

fn keep_extreme(slot: &mut Option<Value>, value: &Value, better: impl Fn(&Value, &Value) -> bool) {
    if matches!(value, Value::Null | Value::Undefined) {
        return;
    }
    match slot {
        Some(current) if !better(value, current) => {}
        _ => *slot = Some(value.clone()),
    }
}

fn charge(
    operator: &'static str,
    used: usize,
    value: &Value,
    limits: &Limits,
) -> AccumulatorResult<usize> {
    let total = used.saturating_add(value.encoded_size());
    if total > limits.max_memory_bytes {
        return Err(AccumulatorError::MemoryLimitExceeded {
            operator,
            limit: limits.max_memory_bytes,
        });
    }
    Ok(total)
}

/// `[]` -> Some(None), `[v]` -> Some(Some(v)), anything else -> None
fn single_or_empty(partial: &Value) -> Option<Option<&Value>> {
    match partial.as_array()? {
        [] => Some(None),
        [value] => Some(Some(value)),
        _ => None,
    }
}
