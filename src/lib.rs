//! # fqueue
//!
//! Bounded, fail-fast queues for concurrent producers and consumers.
//!
//! Two implementations share one contract, [`QueueOps`]:
//!
//! - [`BufferQueue`]: a fixed-capacity queue over a ring buffer.
//! - [`LinkedQueue`]: a Michael-Scott lock-free linked list with epoch-based
//!   node reclamation.
//!
//! No operation ever blocks. `add` fails with [`QueueError::Full`] and `remove`
//! with [`QueueError::Empty`] instead of waiting, and the caller decides whether
//! to retry. Capacity is enforced by an atomic reservation taken before an
//! element is published, so `len() <= size()` holds under any number of
//! concurrent producers.
//!
//! ```rust
//! use fqueue::{Queue, QueueKind, QueueOps};
//!
//! let queue = Queue::new(QueueKind::Linked, 8);
//! queue.add([1, 1, 2, 3, 5, 8])?;
//! assert_eq!(queue.remove()?, 1);
//! # Ok::<(), fqueue::QueueError>(())
//! ```

mod common;
mod error;

pub mod buffer_queue;
pub mod linked_queue;
pub mod selector;

// Re-exports for convenience
pub use buffer_queue::BufferQueue;
pub use common::QueueOps;
pub use error::{ParseKindError, QueueError};
pub use linked_queue::LinkedQueue;
pub use selector::{Queue, QueueKind};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn queues_are_send_and_sync() {
        fn is_send_sync<T: Send + Sync>() -> bool {
            true
        }

        assert!(is_send_sync::<BufferQueue<String>>());
        assert!(is_send_sync::<LinkedQueue<String>>());
        assert!(is_send_sync::<Queue<Vec<u8>>>());
    }
}
