//! Command-line interface
//!
//! - `keys`: wildcard index keys per document, then the multikey paths
//! - `project`: skip, limit and projection over a document stream
//! - `group`: accumulators folded per group key
//!
//! Input and output are JSON lines on stdin and stdout.

mod args;
mod commands;
mod errors;
mod io;

pub use args::{Cli, Command};
pub use commands::{run, run_command};
pub use errors::{CliError, CliResult};
pub use io::{parse_object_arg, read_documents, write_line};
