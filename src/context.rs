//! Execution context
//!
//! Carried by every long-running traversal and every stage. Holds the
//! cooperative interrupt signals: a cancellation token shared with whoever
//! owns the operation, and an optional deadline.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use thiserror::Error;
use uuid::Uuid;

/// Why an operation stopped early
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum Interrupted {
    /// The owner cancelled the operation
    #[error("operation was cancelled")]
    Cancelled,

    /// The operation ran past its deadline
    #[error("operation exceeded its deadline")]
    DeadlineExceeded,
}

impl Interrupted {
    pub fn code(&self) -> &'static str {
        match self {
            Interrupted::Cancelled => "DQ_CANCELLED",
            Interrupted::DeadlineExceeded => "DQ_DEADLINE_EXCEEDED",
        }
    }

    pub fn class(&self) -> crate::error::ErrorClass {
        crate::error::ErrorClass::Interrupted
    }
}

/// Shared cancellation flag. Clones observe the same flag.
#[derive(Debug, Clone, Default)]
pub struct CancellationToken {
    cancelled: Arc<AtomicBool>,
}

impl CancellationToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::Release);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Acquire)
    }
}

/// Per-operation context handed to key generation and to each stage
#[derive(Debug, Clone)]
pub struct ExecutionContext {
    op_id: Uuid,
    token: CancellationToken,
    deadline: Option<Instant>,
}

impl ExecutionContext {
    /// Creates a context with a fresh token and no deadline
    pub fn new() -> Self {
        Self {
            op_id: Uuid::new_v4(),
            token: CancellationToken::new(),
            deadline: None,
        }
    }

    /// Uses an externally owned token
    pub fn with_token(mut self, token: CancellationToken) -> Self {
        self.token = token;
        self
    }

    pub fn with_deadline(mut self, deadline: Instant) -> Self {
        self.deadline = Some(deadline);
        self
    }

    pub fn with_timeout(self, timeout: Duration) -> Self {
        self.with_deadline(Instant::now() + timeout)
    }

    pub fn op_id(&self) -> Uuid {
        self.op_id
    }

    pub fn token(&self) -> &CancellationToken {
        &self.token
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    /// Cooperative interrupt check. Cancellation wins over the deadline.
    pub fn check_for_interrupt(&self) -> Result<(), Interrupted> {
        if self.token.is_cancelled() {
            return Err(Interrupted::Cancelled);
        }
        match self.deadline {
            Some(deadline) if Instant::now() >= deadline => Err(Interrupted::DeadlineExceeded),
            _ => Ok(()),
        }
    }
}

impl Default for ExecutionContext {
    fn default() -> Self {
        Self::new()
    }
}
