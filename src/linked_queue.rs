//! Lock-free linked queue
//!
//! A Michael-Scott queue: a singly linked list whose head always points at a
//! valueless sentinel node, with atomic head and tail references that are only
//! ever moved by compare-and-swap. Any thread that finds the tail lagging behind
//! the true end of the list helps advance it before retrying its own step.
//!
//! Unlinked nodes are handed to `crossbeam-epoch` and destroyed only once no
//! pinned thread can still hold a snapshot of them.

use std::fmt;
use std::marker::PhantomData;
use std::mem::MaybeUninit;

use crossbeam_epoch::{self as epoch, Atomic, Guard, Owned, Shared};
use crossbeam_utils::{Backoff, CachePadded};

use crate::common::{ordering, Occupancy, QueueOps};
use crate::error::QueueError;

/// A list node
///
/// `value` is initialized for every node created by a push. It is moved out
/// exactly once, by the thread whose head CAS turns the node into the new
/// sentinel; the sentinel's slot is never read again.
struct Node<T> {
    value: MaybeUninit<T>,
    next: Atomic<Node<T>>,
}

impl<T> Node<T> {
    fn sentinel() -> Self {
        Self {
            value: MaybeUninit::uninit(),
            next: Atomic::null(),
        }
    }

    fn with_value(value: T) -> Self {
        Self {
            value: MaybeUninit::new(value),
            next: Atomic::null(),
        }
    }
}

/// A bounded lock-free FIFO queue over a linked list
///
/// Nodes are allocated per element, but the number of elements is capped by
/// the capacity given at construction.
///
/// # Examples
///
/// ```rust
/// use fqueue::{LinkedQueue, QueueError, QueueOps};
///
/// let queue = LinkedQueue::new(8);
/// queue.add([1, 1, 2, 3, 5, 8])?;
/// assert_eq!(queue.remove()?, 1);
/// assert_eq!(queue.len(), 5);
/// # Ok::<(), QueueError>(())
/// ```
pub struct LinkedQueue<T> {
    /// Points at the sentinel; the first element lives in `head.next`
    head: CachePadded<Atomic<Node<T>>>,

    /// Points at the last node, or transiently at its predecessor
    tail: CachePadded<Atomic<Node<T>>>,

    /// Reserved plus committed elements, bounded by the capacity
    occupancy: Occupancy,

    /// Elements are owned by the queue
    _marker: PhantomData<T>,
}

// Safety: elements are moved in by one thread and out by exactly one other;
// nodes are only shared through epoch-protected atomics.
unsafe impl<T: Send> Send for LinkedQueue<T> {}
unsafe impl<T: Send> Sync for LinkedQueue<T> {}

impl<T> LinkedQueue<T> {
    /// Creates an empty queue holding at most `capacity` elements
    pub fn new(capacity: usize) -> Self {
        tracing::debug!(capacity, "creating linked queue");

        let sentinel = Atomic::new(Node::sentinel());
        Self {
            head: CachePadded::new(sentinel.clone()),
            tail: CachePadded::new(sentinel),
            occupancy: Occupancy::new(capacity),
            _marker: PhantomData,
        }
    }

    /// Links `new` after the last node
    ///
    /// The caller already holds a slot in the occupancy counter, so this only
    /// retries on contention and never fails.
    fn enqueue(&self, new: Shared<'_, Node<T>>, guard: &Guard) {
        let backoff = Backoff::new();
        loop {
            let tail = self.tail.load(ordering::A, guard);
            // Safety: tail is never null and the guard keeps the node alive.
            let tail_ref = unsafe { tail.deref() };
            let next = tail_ref.next.load(ordering::A, guard);

            if tail != self.tail.load(ordering::A, guard) {
                backoff.spin();
                continue;
            }

            if next.is_null() {
                if tail_ref
                    .next
                    .compare_exchange(Shared::null(), new, ordering::R, ordering::X, guard)
                    .is_ok()
                {
                    // Best effort: another thread may already have swung the tail.
                    let _ = self
                        .tail
                        .compare_exchange(tail, new, ordering::R, ordering::X, guard);
                    return;
                }
            } else {
                // Tail is lagging; help the other producer before retrying.
                let _ = self
                    .tail
                    .compare_exchange(tail, next, ordering::R, ordering::X, guard);
            }
            backoff.spin();
        }
    }

    /// Unlinks the first element, or reports that there is none
    fn dequeue(&self, guard: &Guard) -> Option<T> {
        let backoff = Backoff::new();
        loop {
            let head = self.head.load(ordering::A, guard);
            let tail = self.tail.load(ordering::A, guard);
            // Safety: head is never null and the guard keeps the node alive.
            let next = unsafe { head.deref() }.next.load(ordering::A, guard);

            if head != self.head.load(ordering::A, guard) {
                backoff.spin();
                continue;
            }

            if head == tail {
                if next.is_null() {
                    return None;
                }
                // Tail is lagging behind a linked node.
                let _ = self
                    .tail
                    .compare_exchange(tail, next, ordering::R, ordering::X, guard);
            } else if let Some(next_ref) = {
                // Safety: the guard keeps `next` alive even if another thread
                // unlinks it concurrently.
                unsafe { next.as_ref() }
            } {
                if self
                    .head
                    .compare_exchange(head, next, ordering::R, ordering::X, guard)
                    .is_ok()
                {
                    // Safety: only the winner of the head CAS reads the value, and
                    // the pinned guard keeps `next` allocated until then. `next` is
                    // now the sentinel and its slot is never touched again.
                    unsafe {
                        let value = next_ref.value.assume_init_read();
                        guard.defer_destroy(head);
                        return Some(value);
                    }
                }
            }
            backoff.spin();
        }
    }
}

impl<T> QueueOps<T> for LinkedQueue<T> {
    fn push(&self, item: T) -> Result<(), QueueError> {
        if !self.occupancy.try_reserve() {
            tracing::trace!(capacity = self.occupancy.capacity(), "linked queue is full");
            return Err(QueueError::Full);
        }

        let guard = &epoch::pin();
        let new = Owned::new(Node::with_value(item)).into_shared(guard);
        self.enqueue(new, guard);
        Ok(())
    }

    fn remove(&self) -> Result<T, QueueError> {
        let guard = &epoch::pin();
        match self.dequeue(guard) {
            Some(value) => {
                self.occupancy.release();
                Ok(value)
            }
            None => {
                tracing::trace!("linked queue is empty");
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

impl<T> Drop for LinkedQueue<T> {
    fn drop(&mut self) {
        unsafe {
            // Safety: `&mut self` means no other thread can observe the list.
            let guard = epoch::unprotected();

            while self.dequeue(guard).is_some() {}

            let sentinel = self.head.load(ordering::X, guard);
            drop(sentinel.into_owned());
        }
    }
}

impl<T> fmt::Debug for LinkedQueue<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LinkedQueue")
            .field("len", &self.len())
            .field("size", &self.size())
            .finish()
    }
}
