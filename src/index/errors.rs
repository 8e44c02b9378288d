//! Index error types
//!
//! Error codes:
//! - DQ_INVALID_WILDCARD_PATTERN (configuration)
//! - DQ_UNINDEXABLE_TYPE (per document)
//! - DQ_KEY_TOO_LARGE (per document)
//! - DQ_NESTING_TOO_DEEP (per document)
//! - DQ_CANCELLED / DQ_DEADLINE_EXCEEDED (interrupted)

use thiserror::Error;

use crate::context::Interrupted;
use crate::error::ErrorClass;

/// Key generation error with full context
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum KeyGenError {
    /// Wildcard pattern or path projection is malformed
    #[error("invalid wildcard pattern '{pattern}': {reason}")]
    InvalidPattern { pattern: String, reason: String },

    /// Value type is not allowed in an index key
    #[error("value of type {type_name} at '{path}' cannot be indexed")]
    UnindexableType {
        path: String,
        type_name: &'static str,
    },

    /// Encoded key exceeds the configured ceiling
    #[error("index key for '{path}' is {size} bytes, limit is {max}")]
    KeyTooLarge { path: String, size: usize, max: usize },

    /// Document nesting exceeds the configured depth guard
    #[error("document nesting exceeds {max} levels at '{path}'")]
    NestingTooDeep { path: String, max: usize },

    /// Traversal stopped by the execution context
    #[error(transparent)]
    Interrupted(#[from] Interrupted),
}

impl KeyGenError {
    pub(crate) fn invalid_pattern(pattern: &str, reason: impl Into<String>) -> Self {
        KeyGenError::InvalidPattern {
            pattern: pattern.to_string(),
            reason: reason.into(),
        }
    }

    /// Returns the string code
    pub fn code(&self) -> &'static str {
        match self {
            KeyGenError::InvalidPattern { .. } => "DQ_INVALID_WILDCARD_PATTERN",
            KeyGenError::UnindexableType { .. } => "DQ_UNINDEXABLE_TYPE",
            KeyGenError::KeyTooLarge { .. } => "DQ_KEY_TOO_LARGE",
            KeyGenError::NestingTooDeep { .. } => "DQ_NESTING_TOO_DEEP",
            KeyGenError::Interrupted(i) => i.code(),
        }
    }

    pub fn class(&self) -> ErrorClass {
        match self {
            KeyGenError::InvalidPattern { .. } => ErrorClass::Configuration,
            KeyGenError::Interrupted(_) => ErrorClass::Interrupted,
            _ => ErrorClass::PerDocument,
        }
    }
}

/// Result type for index operations
pub type KeyGenResult<T> = Result<T, KeyGenError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_per_document_errors() {
        let err = KeyGenError::KeyTooLarge {
            path: "a".into(),
            size: 2000,
            max: 1024,
        };
        assert_eq!(err.class(), ErrorClass::PerDocument);
        assert_eq!(err.code(), "DQ_KEY_TOO_LARGE");
        assert!(err.to_string().contains("2000"));
    }

    #[test]
    fn test_interrupt_keeps_its_code() {
        let err = KeyGenError::from(Interrupted::DeadlineExceeded);
        assert_eq!(err.code(), "DQ_DEADLINE_EXCEEDED");
        assert_eq!(err.class(), ErrorClass::Interrupted);
    }

    #[test]
    fn test_pattern_error_is_configuration() {
        let err = KeyGenError::invalid_pattern("a.$**.b", "wildcard must be last");
        assert_eq!(err.class(), ErrorClass::Configuration);
    }
}
