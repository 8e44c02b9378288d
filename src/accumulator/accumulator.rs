use tracing::warn;

use crate::config::EngineConfig;
use crate::document::Value;
use crate::observability::Event;

use super::errors::{AccumulatorError, AccumulatorResult};
use super::registry;
use super::state::{AccumulatorState, Limits};

/// Policy knobs applied to every accumulator of a pipeline
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AccumulatorOptions {
    /// Record a missing input as null in `$push`/`$addToSet`
    pub record_missing: bool,
    /// Ceiling on values held by `$push`/`$addToSet`
    pub max_memory_bytes: usize,
}

impl From<&EngineConfig> for AccumulatorOptions {
    fn from(config: &EngineConfig) -> Self {
        Self {
            record_missing: config.record_missing,
            max_memory_bytes: config.accumulator_max_memory_bytes,
        }
    }
}

impl Default for AccumulatorOptions {
    fn default() -> Self {
        Self::from(&EngineConfig::default())
    }
}

/// One running reducer for one group.
///
/// Lifecycle: `create`, any number of `process`/`merge_partial` calls,
/// then `get_value`. Input after `get_value` is rejected.
#[derive(Debug, Clone)]
pub struct Accumulator {
    name: &'static str,
    state: AccumulatorState,
    limits: Limits,
    finalized: Option<Value>,
}

impl Accumulator {
    /// Fresh accumulator for a registered operator such as `"$sum"`.
    pub fn create(name: &str, options: &AccumulatorOptions) -> AccumulatorResult<Self> {
        let Some((name, factory)) = registry::lookup(name) else {
            warn!(event = %Event::AccumulatorUnknown, name = name);
            return Err(AccumulatorError::UnknownOperator {
                name: name.to_string(),
            });
        };
        Ok(Self {
            name,
            state: factory(),
            limits: Limits {
                record_missing: options.record_missing,
                max_memory_bytes: options.max_memory_bytes,
            },
            finalized: None,
        })
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Folds one input; `None` means the field was missing.
    pub fn process(&mut self, input: Option<&Value>) -> AccumulatorResult<()> {
        self.ensure_open()?;
        self.state.process(self.name, input, &self.limits)
    }

    /// Checks that `process(input)` would succeed, without folding it.
    pub fn admit(&self, input: Option<&Value>) -> AccumulatorResult<()> {
        self.ensure_open()?;
        self.state.admit(self.name, input, &self.limits)
    }

    /// Folds the partial state of another accumulator of the same operator.
    pub fn merge_partial(&mut self, partial: &Value) -> AccumulatorResult<()> {
        self.ensure_open()?;
        self.state.merge(self.name, partial, &self.limits)
    }

    /// State to ship to a merging accumulator. Does not finalize.
    pub fn partial_value(&self) -> Value {
        self.state.partial()
    }

    /// Finalizes and returns the result; later calls return the same value.
    pub fn get_value(&mut self) -> Value {
        self.finalized
            .get_or_insert_with(|| self.state.value())
            .clone()
    }

    pub fn is_finalized(&self) -> bool {
        self.finalized.is_some()
    }

    fn ensure_open(&self) -> AccumulatorResult<()> {
        if self.finalized.is_some() {
            return Err(AccumulatorError::ProcessAfterFinalize {
                operator: self.name,
            });
        }
        Ok(())
    }
}
