//! Fixed-capacity queue backed by a ring buffer
//!
//! The buffer itself provides thread-safe single push and pop. Capacity is
//! enforced by reserving a slot in the occupancy counter before pushing, which
//! keeps the check and the insertion from racing between producers.

use std::fmt;

use crossbeam_queue::ArrayQueue;

use crate::common::{Occupancy, QueueOps};
use crate::error::QueueError;

/// A bounded FIFO queue over a ring buffer
///
/// # Examples
///
/// ```rust
/// use fqueue::{BufferQueue, QueueError, QueueOps};
///
/// let queue = BufferQueue::new(2);
/// assert_eq!(queue.add([1, 2, 3]), Err(QueueError::Full));
/// assert_eq!(queue.remove(), Ok(1));
/// assert_eq!(queue.remove(), Ok(2));
/// assert_eq!(queue.remove(), Err(QueueError::Empty));
/// ```
pub struct BufferQueue<T> {
    /// The ring buffer holding committed elements
    buffer: ArrayQueue<T>,

    /// Reserved plus committed elements, bounded by the capacity
    occupancy: Occupancy,
}

impl<T> BufferQueue<T> {
    /// Creates an empty queue holding at most `capacity` elements
    ///
    /// A zero capacity is accepted; such a queue rejects every insertion.
    pub fn new(capacity: usize) -> Self {
        tracing::debug!(capacity, "creating buffer queue");

        Self {
            // The ring buffer cannot be empty-sized; the counter still caps it at zero.
            buffer: ArrayQueue::new(capacity.max(1)),
            occupancy: Occupancy::new(capacity),
        }
    }

    /// Creates a queue pre-loaded with `elements`, in iteration order
    ///
    /// Returns `Err(QueueError::Full)` if the elements do not fit in `capacity`.
    pub fn with_elements<I>(capacity: usize, elements: I) -> Result<Self, QueueError>
    where
        I: IntoIterator<Item = T>,
    {
        let queue = Self::new(capacity);
        queue.add(elements)?;
        Ok(queue)
    }
}

impl<T> QueueOps<T> for BufferQueue<T> {
    fn push(&self, item: T) -> Result<(), QueueError> {
        if !self.occupancy.try_reserve() {
            tracing::trace!(capacity = self.occupancy.capacity(), "buffer queue is full");
            return Err(QueueError::Full);
        }

        // Occupancy never lags behind the buffer, so a reserved slot is always free.
        let pushed = self.buffer.push(item);
        debug_assert!(pushed.is_ok(), "ring buffer rejected a reserved push");
        if pushed.is_err() {
            self.occupancy.release();
            return Err(QueueError::Full);
        }
        Ok(())
    }

    fn remove(&self) -> Result<T, QueueError> {
        match self.buffer.pop() {
            Some(item) => {
                self.occupancy.release();
                Ok(item)
            }
            None => {
                tracing::trace!("buffer queue is empty");
                Err(QueueError::Empty)
            }
        }
    }

    fn len(&self) -> usize {
        self.occupancy.len()
    }

    fn size(&self) -> usize {
        self.occupancy.capacity()
    }
}

impl<T> fmt::Debug for BufferQueue<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BufferQueue")
            .field("len", &self.len())
            .field("size", &self.size())
            .finish()
    }
}
