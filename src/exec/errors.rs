//! Stage error types
//!
//! Errors from a child stage reach the parent unchanged; no stage retries.

use thiserror::Error;

use crate::accumulator::AccumulatorError;
use crate::context::Interrupted;
use crate::error::ErrorClass;

/// Opaque failure produced below the leaf stage, such as a remote shard
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{origin}: {message}")]
pub struct UpstreamError {
    pub origin: String,
    pub message: String,
}

impl UpstreamError {
    pub fn new(origin: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            origin: origin.into(),
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StageError {
    /// Stage parameter rejected at construction
    #[error("invalid {stage} stage parameter: {reason}")]
    InvalidParameter { stage: &'static str, reason: String },

    #[error(transparent)]
    Upstream(#[from] UpstreamError),

    #[error(transparent)]
    Interrupted(#[from] Interrupted),

    #[error(transparent)]
    Accumulator(#[from] AccumulatorError),
}

impl StageError {
    pub(crate) fn invalid(stage: &'static str, reason: impl Into<String>) -> Self {
        StageError::InvalidParameter {
            stage,
            reason: reason.into(),
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            StageError::InvalidParameter { .. } => "DQ_INVALID_STAGE_PARAMETER",
            StageError::Upstream(_) => "DQ_UPSTREAM",
            StageError::Interrupted(i) => i.code(),
            StageError::Accumulator(e) => e.code(),
        }
    }

    pub fn class(&self) -> ErrorClass {
        match self {
            StageError::InvalidParameter { .. } => ErrorClass::Configuration,
            StageError::Upstream(_) => ErrorClass::Upstream,
            StageError::Interrupted(_) => ErrorClass::Interrupted,
            StageError::Accumulator(e) => e.class(),
        }
    }
}

pub type StageResult<T> = Result<T, StageError>;
