//! Queue selection by kind
//!
//! [`Queue`] picks one of the implementations from a [`QueueKind`] and forwards
//! the contract operations to it.

use std::fmt;
use std::str::FromStr;

use crate::buffer_queue::BufferQueue;
use crate::common::QueueOps;
use crate::error::{ParseKindError, QueueError};
use crate::linked_queue::LinkedQueue;

/// Available queue implementations
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum QueueKind {
    /// Ring-buffer backed queue, see [`BufferQueue`]
    #[default]
    Basic,
    /// Lock-free linked queue, see [`LinkedQueue`]
    Linked,
}

impl fmt::Display for QueueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QueueKind::Basic => f.write_str("BasicQueue"),
            QueueKind::Linked => f.write_str("LinkedQueue"),
        }
    }
}

impl FromStr for QueueKind {
    type Err = ParseKindError;

    /// Accepts the short names `basic`/`linked` as well as the display names,
    /// ignoring case
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "basic" | "basicqueue" => Ok(QueueKind::Basic),
            "linked" | "linkedqueue" => Ok(QueueKind::Linked),
            _ => Err(ParseKindError(s.to_owned())),
        }
    }
}

/// A queue of any kind behind the common contract
#[derive(Debug)]
pub enum Queue<T> {
    /// Backed by a [`BufferQueue`]
    Basic(BufferQueue<T>),
    /// Backed by a [`LinkedQueue`]
    Linked(LinkedQueue<T>),
}

impl<T> Queue<T> {
    /// Creates an empty queue of the given kind
    pub fn new(kind: QueueKind, capacity: usize) -> Self {
        match kind {
            QueueKind::Basic => Queue::Basic(BufferQueue::new(capacity)),
            QueueKind::Linked => Queue::Linked(LinkedQueue::new(capacity)),
        }
    }

    /// Returns the kind backing this queue
    pub fn kind(&self) -> QueueKind {
        match self {
            Queue::Basic(_) => QueueKind::Basic,
            Queue::Linked(_) => QueueKind::Linked,
        }
    }
}

impl<T> From<BufferQueue<T>> for Queue<T> {
    fn from(queue: BufferQueue<T>) -> Self {
        Queue::Basic(queue)
    }
}

impl<T> From<LinkedQueue<T>> for Queue<T> {
    fn from(queue: LinkedQueue<T>) -> Self {
        Queue::Linked(queue)
    }
}

impl<T> QueueOps<T> for Queue<T> {
    fn push(&self, item: T) -> Result<(), QueueError> {
        match self {
            Queue::Basic(q) => q.push(item),
            Queue::Linked(q) => q.push(item),
        }
    }

    fn remove(&self) -> Result<T, QueueError> {
        match self {
            Queue::Basic(q) => q.remove(),
            Queue::Linked(q) => q.remove(),
        }
    }

    fn len(&self) -> usize {
        match self {
            Queue::Basic(q) => q.len(),
            Queue::Linked(q) => q.len(),
        }
    }

    fn size(&self) -> usize {
        match self {
            Queue::Basic(q) => q.size(),
            Queue::Linked(q) => q.size(),
        }
    }
}
