//! Projection error types
//!
//! Every projection error is raised while parsing the spec; transform
//! itself cannot fail.

use thiserror::Error;

use crate::error::ErrorClass;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProjectionError {
    /// Inclusion and exclusion of non-`_id` fields in one spec
    #[error("cannot exclude '{exclusion}' in an inclusion projection that includes '{inclusion}'")]
    MixedProjection { inclusion: String, exclusion: String },

    /// `$`-prefixed key that is not a supported directive
    #[error("unknown projection directive '{directive}' at '{path}'")]
    UnknownDirective { path: String, directive: String },

    /// Field value that is neither 0/1, a boolean, nor an object
    #[error("projection value at '{path}' must be a number, boolean or object, got {type_name}")]
    InvalidValue {
        path: String,
        type_name: &'static str,
    },

    /// Same path named twice, or a path named under an already-decided field
    #[error("projection path collision at '{path}'")]
    PathCollision { path: String },

    /// Malformed `$slice` argument
    #[error("invalid $slice at '{path}': {reason}")]
    InvalidSlice { path: String, reason: String },

    /// `{}` given as a sub-projection
    #[error("empty sub-projection at '{path}'")]
    EmptySubProjection { path: String },

    /// Dotted key with an empty component
    #[error("invalid projection path '{path}'")]
    InvalidPath { path: String },
}

impl ProjectionError {
    pub fn code(&self) -> &'static str {
        match self {
            ProjectionError::MixedProjection { .. } => "DQ_MIXED_PROJECTION",
            ProjectionError::UnknownDirective { .. } => "DQ_UNKNOWN_DIRECTIVE",
            ProjectionError::InvalidValue { .. } => "DQ_INVALID_PROJECTION_VALUE",
            ProjectionError::PathCollision { .. } => "DQ_PATH_COLLISION",
            ProjectionError::InvalidSlice { .. } => "DQ_INVALID_SLICE",
            ProjectionError::EmptySubProjection { .. } => "DQ_EMPTY_SUB_PROJECTION",
            ProjectionError::InvalidPath { .. } => "DQ_INVALID_PATH",
        }
    }

    pub fn class(&self) -> ErrorClass {
        ErrorClass::Configuration
    }
}

pub type ProjectionResult<T> = Result<T, ProjectionError>;
