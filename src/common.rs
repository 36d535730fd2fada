//! Common functionality for the bounded queues
//!
//! This module provides the queue contract every implementation satisfies and
//! the occupancy counter both implementations use to enforce their capacity.

use std::fmt;
use std::sync::atomic::AtomicUsize;

use crossbeam_utils::CachePadded;

use crate::error::QueueError;

/// Memory ordering constants for atomic operations
///
/// Short aliases keep the CAS loops readable.
pub mod ordering {
    pub use std::sync::atomic::Ordering::Acquire as A;
    pub use std::sync::atomic::Ordering::Release as R;
    pub use std::sync::atomic::Ordering::Relaxed as X;
    pub use std::sync::atomic::Ordering::AcqRel as AR;
}

/// The queue contract
///
/// Every operation is a non-blocking "try": it either commits immediately or
/// reports why it could not. Implementations are interchangeable for any
/// caller that only programs against this trait.
pub trait QueueOps<T> {
    /// Attempts to insert a single element at the back of the queue
    ///
    /// Returns `Err(QueueError::Full)` if the queue holds `size()` elements.
    fn push(&self, item: T) -> Result<(), QueueError>;

    /// Inserts elements one at a time, in iteration order
    ///
    /// Stops at the first element that does not fit and returns
    /// `Err(QueueError::Full)`. Elements inserted earlier in the same call stay
    /// in the queue; a failed batch is never rolled back.
    fn add<I>(&self, items: I) -> Result<(), QueueError>
    where
        I: IntoIterator<Item = T>,
        Self: Sized,
    {
        for item in items {
            self.push(item)?;
        }
        Ok(())
    }

    /// Removes and returns the earliest inserted element
    ///
    /// Returns `Err(QueueError::Empty)` if there is nothing to remove.
    fn remove(&self) -> Result<T, QueueError>;

    /// Returns the number of elements currently in the queue
    fn len(&self) -> usize;

    /// Returns the fixed capacity set at construction
    fn size(&self) -> usize;

    /// Checks if the queue was empty during this call
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Checks if the queue was full during this call
    fn is_full(&self) -> bool {
        self.len() >= self.size()
    }
}

/// Element count gated by a fixed capacity
///
/// Producers reserve a slot with an atomic compare-and-increment before they
/// publish an element, consumers release it after they took one out. The count
/// therefore never exceeds the capacity, whatever the number of producers.
pub struct Occupancy {
    /// Reserved plus committed elements
    ///
    /// Placed on its own cache line, it is written by every producer and consumer
    count: CachePadded<AtomicUsize>,

    /// The immutable capacity
    capacity: usize,
}

impl Occupancy {
    /// Creates an empty counter bounded by `capacity`
    #[inline]
    pub fn new(capacity: usize) -> Self {
        Self {
            count: CachePadded::new(AtomicUsize::new(0)),
            capacity,
        }
    }

    /// Claims one slot, failing if all `capacity` slots are taken
    #[inline]
    pub fn try_reserve(&self) -> bool {
        let mut current = self.count.load(ordering::X);
        loop {
            if current >= self.capacity {
                return false;
            }
            match self
                .count
                .compare_exchange_weak(current, current + 1, ordering::AR, ordering::X)
            {
                Ok(_) => return true,
                Err(actual) => current = actual,
            }
        }
    }

    /// Gives back a slot claimed by [`try_reserve`](Self::try_reserve)
    #[inline]
    pub fn release(&self) {
        let previous = self.count.fetch_sub(1, ordering::AR);
        debug_assert!(previous > 0, "released a slot that was never reserved");
    }

    /// Returns the current count
    #[inline]
    pub fn len(&self) -> usize {
        self.count.load(ordering::A)
    }

    /// Returns the capacity
    #[inline]
    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

impl fmt::Debug for Occupancy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Occupancy")
            .field("len", &self.len())
            .field("capacity", &self.capacity)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Barrier};
    use std::thread;

    #[test]
    fn test_reserve_up_to_capacity() {
        let occupancy = Occupancy::new(3);

        assert!(occupancy.try_reserve());
        assert!(occupancy.try_reserve());
        assert!(occupancy.try_reserve());
        assert!(!occupancy.try_reserve());
        assert_eq!(occupancy.len(), 3);

        occupancy.release();
        assert_eq!(occupancy.len(), 2);
        assert!(occupancy.try_reserve());
        assert!(!occupancy.try_reserve());
    }

    #[test]
    fn test_zero_capacity_is_always_full() {
        let occupancy = Occupancy::new(0);
        assert!(!occupancy.try_reserve());
        assert_eq!(occupancy.len(), 0);
    }

    #[test]
    fn test_concurrent_reservations_never_exceed_capacity() {
        const THREADS: usize = 8;
        const CAPACITY: usize = 100;

        let occupancy = Arc::new(Occupancy::new(CAPACITY));
        let barrier = Arc::new(Barrier::new(THREADS));

        let handles: Vec<_> = (0..THREADS)
            .map(|_| {
                let occupancy = Arc::clone(&occupancy);
                let barrier = Arc::clone(&barrier);
                thread::spawn(move || {
                    barrier.wait();
                    (0..CAPACITY).filter(|_| occupancy.try_reserve()).count()
                })
            })
            .collect();

        let granted: usize = handles.into_iter().map(|h| h.join().unwrap()).sum();

        assert_eq!(granted, CAPACITY);
        assert_eq!(occupancy.len(), CAPACITY);
    }
}
