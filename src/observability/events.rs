//! Observable events
//!
//! Every structured log line carries one of these as its `event` field.

use std::fmt;

/// Observable events in the query core
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event {
    // Key generation
    /// Keys generated for one document
    KeygenComplete,
    /// Key generation rejected a document
    KeygenFailed,
    /// A path became multikey for the first time
    MultikeyPathAdded,

    // Projection
    /// Projection spec parsed
    ProjectionBuilt,
    /// Projection spec rejected
    ProjectionRejected,

    // Accumulators
    /// Unknown accumulator requested
    AccumulatorUnknown,
    /// Group results finalized
    GroupFinalized,

    // Stage chain
    /// Stage constructed
    StageBuilt,
    /// Stage rejected its parameters
    StageRejected,
    /// Stage reached end of stream
    StageExhausted,
    /// Stage observed an interrupt
    StageInterrupted,
    /// Stage killed by its owner
    StageKilled,

    // CLI
    /// Command wrote all of its output
    CommandComplete,
    /// Command stopped on a stage error
    CommandFailed,
}

impl Event {
    pub fn as_str(&self) -> &'static str {
        match self {
            Event::KeygenComplete => "KEYGEN_COMPLETE",
            Event::KeygenFailed => "KEYGEN_FAILED",
            Event::MultikeyPathAdded => "MULTIKEY_PATH_ADDED",
            Event::ProjectionBuilt => "PROJECTION_BUILT",
            Event::ProjectionRejected => "PROJECTION_REJECTED",
            Event::AccumulatorUnknown => "ACCUMULATOR_UNKNOWN",
            Event::GroupFinalized => "GROUP_FINALIZED",
            Event::StageBuilt => "STAGE_BUILT",
            Event::StageRejected => "STAGE_REJECTED",
            Event::StageExhausted => "STAGE_EXHAUSTED",
            Event::StageInterrupted => "STAGE_INTERRUPTED",
            Event::StageKilled => "STAGE_KILLED",
            Event::CommandComplete => "COMMAND_COMPLETE",
            Event::CommandFailed => "COMMAND_FAILED",
        }
    }
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
