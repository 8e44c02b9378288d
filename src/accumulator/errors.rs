//! Accumulator error types

use thiserror::Error;

use crate::error::ErrorClass;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AccumulatorError {
    /// Operator name not in the registry
    #[error("unknown accumulator '{name}'")]
    UnknownOperator { name: String },

    /// `process` or `merge_partial` after `get_value`
    #[error("{operator} received input after it was finalized")]
    ProcessAfterFinalize { operator: &'static str },

    /// Partial state of the wrong shape
    #[error("{operator} cannot merge partial state: {reason}")]
    MergeShape {
        operator: &'static str,
        reason: String,
    },

    /// Collected values outgrew the memory ceiling
    #[error("{operator} exceeded its memory limit of {limit} bytes")]
    MemoryLimitExceeded { operator: &'static str, limit: usize },
}

impl AccumulatorError {
    pub fn code(&self) -> &'static str {
        match self {
            AccumulatorError::UnknownOperator { .. } => "DQ_UNKNOWN_ACCUMULATOR",
            AccumulatorError::ProcessAfterFinalize { .. } => "DQ_PROCESS_AFTER_FINALIZE",
            AccumulatorError::MergeShape { .. } => "DQ_MERGE_SHAPE",
            AccumulatorError::MemoryLimitExceeded { .. } => "DQ_MEMORY_LIMIT_EXCEEDED",
        }
    }

    pub fn class(&self) -> ErrorClass {
        match self {
            AccumulatorError::UnknownOperator { .. } => ErrorClass::Configuration,
            AccumulatorError::MemoryLimitExceeded { .. } => ErrorClass::PerDocument,
            AccumulatorError::ProcessAfterFinalize { .. } | AccumulatorError::MergeShape { .. } => {
                ErrorClass::Contract
            }
        }
    }
}

pub type AccumulatorResult<T> = Result<T, AccumulatorError>;
