//! Document model
//!
//! The nested key/value tree every other subsystem operates over.
//!
//! # Design Principles
//!
//! - Field order is insertion order and is significant
//! - Values carry a total order across types, so index keys sort
//!   deterministically
//! - Encoding is not this crate's concern; JSON conversion exists for the
//!   CLI and for tests

mod document;
mod json;
mod path;
mod value;

use thiserror::Error;

pub use document::Document;
pub use path::FieldPath;
pub use value::Value;

/// Errors raised while building documents or paths
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DocumentError {
    /// Root of a document must be an object
    #[error("document root must be an object, got {0}")]
    NotAnObject(&'static str),

    /// Malformed dotted path
    #[error("invalid field path '{0}'")]
    InvalidPath(String),
}

impl DocumentError {
    pub fn code(&self) -> &'static str {
        match self {
            DocumentError::NotAnObject(_) => "DQ_NOT_AN_OBJECT",
            DocumentError::InvalidPath(_) => "DQ_INVALID_PATH",
        }
    }

    pub fn class(&self) -> crate::error::ErrorClass {
        match self {
            DocumentError::NotAnObject(_) => crate::error::ErrorClass::PerDocument,
            DocumentError::InvalidPath(_) => crate::error::ErrorClass::Configuration,
        }
    }
}
