//! Crate-wide error type
//!
//! Every subsystem defines its own error enum with a stable `DQ_*` code.
//! `Error` wraps them for callers that drive more than one subsystem,
//! and `ErrorClass` tells them what to do about a failure:
//!
//! | Class           | Meaning                                         |
//! |-----------------|-------------------------------------------------|
//! | `Configuration` | Bad pattern, spec or parameter; fix the request |
//! | `PerDocument`   | One document rejected; the rest can proceed     |
//! | `Interrupted`   | Cancelled or past its deadline                  |
//! | `Upstream`      | A child stage or shard reported a failure       |
//! | `Contract`      | The caller misused an API                       |

use std::fmt;

use thiserror::Error;

use crate::accumulator::AccumulatorError;
use crate::config::ConfigError;
use crate::context::Interrupted;
use crate::document::DocumentError;
use crate::exec::StageError;
use crate::index::KeyGenError;
use crate::projection::ProjectionError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorClass {
    Configuration,
    PerDocument,
    Interrupted,
    Upstream,
    Contract,
}

impl ErrorClass {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorClass::Configuration => "configuration",
            ErrorClass::PerDocument => "per_document",
            ErrorClass::Interrupted => "interrupted",
            ErrorClass::Upstream => "upstream",
            ErrorClass::Contract => "contract",
        }
    }

    /// Whether processing of other documents may continue
    pub fn is_recoverable(&self) -> bool {
        matches!(self, ErrorClass::PerDocument | ErrorClass::Upstream)
    }
}

impl fmt::Display for ErrorClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Document(#[from] DocumentError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    KeyGen(#[from] KeyGenError),

    #[error(transparent)]
    Projection(#[from] ProjectionError),

    #[error(transparent)]
    Accumulator(#[from] AccumulatorError),

    #[error(transparent)]
    Stage(#[from] StageError),

    #[error(transparent)]
    Interrupted(#[from] Interrupted),
}

impl Error {
    pub fn code(&self) -> &'static str {
        match self {
            Error::Document(e) => e.code(),
            Error::Config(e) => e.code(),
            Error::KeyGen(e) => e.code(),
            Error::Projection(e) => e.code(),
            Error::Accumulator(e) => e.code(),
            Error::Stage(e) => e.code(),
            Error::Interrupted(e) => e.code(),
        }
    }

    pub fn class(&self) -> ErrorClass {
        match self {
            Error::Document(e) => e.class(),
            Error::Config(e) => e.class(),
            Error::KeyGen(e) => e.class(),
            Error::Projection(e) => e.class(),
            Error::Accumulator(e) => e.class(),
            Error::Stage(e) => e.class(),
            Error::Interrupted(e) => e.class(),
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
