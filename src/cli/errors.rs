//! CLI error types
//!
//! Any `CliError` ends the run with a non-zero exit status. Per-document
//! key-generation failures are not `CliError`s; `keys` reports them inline.

use std::io;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum CliError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// A stdin line that is not a JSON object
    #[error("line {line}: {reason}")]
    Input { line: usize, reason: String },

    /// A command-line argument that is not valid JSON or not an object
    #[error("invalid --{flag}: {reason}")]
    Argument { flag: &'static str, reason: String },

    #[error(transparent)]
    Engine(#[from] crate::Error),
}

impl CliError {
    pub fn code(&self) -> &'static str {
        match self {
            CliError::Io(_) => "DQ_CLI_IO",
            CliError::Input { .. } => "DQ_CLI_INPUT",
            CliError::Argument { .. } => "DQ_CLI_ARGUMENT",
            CliError::Engine(e) => e.code(),
        }
    }

    pub(crate) fn engine(err: impl Into<crate::Error>) -> Self {
        CliError::Engine(err.into())
    }
}

pub type CliResult<T> = Result<T, CliError>;
