use std::collections::VecDeque;
use std::sync::{Mutex, MutexGuard, PoisonError};

use crate::error::FffError;

/// A thread-safe FIFO queue.
///
/// Every operation takes the queue's own lock and nothing else, so the queue
/// can be used from inside other subsystems without creating lock-order
/// dependencies.
pub struct JobQueue<T> {
    items: Mutex<VecDeque<T>>,
}

impl<T> Default for JobQueue<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> JobQueue<T> {
    pub fn new() -> Self {
        Self {
            items: Mutex::new(VecDeque::new()),
        }
    }

    /// Append `item` to the tail.
    pub fn push(&self, item: T) {
        self.lock().push_back(item);
    }

    /// Remove and return the head.
    ///
    /// # Errors
    ///
    /// [`FffError::EmptyQueue`] if there is nothing to pop. Check
    /// [`is_empty`](Self::is_empty) first or handle the error.
    pub fn pop(&self) -> Result<T, FffError> {
        self.lock().pop_front().ok_or(FffError::EmptyQueue)
    }

    /// Number of queued items at this instant.
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    // Jobs never hold this lock while running user code, so a poisoned
    // guard still protects a consistent deque.
    fn lock(&self) -> MutexGuard<'_, VecDeque<T>> {
        self.items.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl<T: Clone> JobQueue<T> {
    /// A copy of the head without removing it.
    pub fn peek(&self) -> Option<T> {
        self.lock().front().cloned()
    }
}
