//! Error kinds reported by the queues
//!
//! Both kinds are ordinary, non-fatal results. Nothing is retried internally;
//! the caller decides whether to try again.

use thiserror::Error;

/// Failure of a single `add`/`remove` attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum QueueError {
    /// The queue held `size()` elements at the moment of the insertion attempt
    #[error("queue is full")]
    Full,
    /// The queue held no element at the moment of the removal attempt
    #[error("queue is empty")]
    Empty,
}

/// Returned when a string does not name a known [`QueueKind`](crate::QueueKind)
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown queue kind: {0:?}")]
pub struct ParseKindError(pub String);
