use std::sync::{Condvar, Mutex, MutexGuard, PoisonError};

use tracing::error;

#[derive(Default)]
struct Slots {
    active: usize,
    peak: usize,
}

/// Counts worker slots in use, never letting the count exceed `limit`.
///
/// A slot is acquired before a worker thread is started and released when
/// that worker stops pulling jobs.
pub struct ActiveCounter {
    limit: usize,
    slots: Mutex<Slots>,
    idle: Condvar,
}

impl ActiveCounter {
    pub fn new(limit: usize) -> Self {
        Self {
            limit,
            slots: Mutex::new(Slots::default()),
            idle: Condvar::new(),
        }
    }

    /// Take a slot if one is free.
    pub fn try_acquire(&self) -> bool {
        let mut slots = self.lock();
        if slots.active >= self.limit {
            return false;
        }
        slots.active += 1;
        slots.peak = slots.peak.max(slots.active);
        true
    }

    /// Give a slot back. Wakes [`wait_idle`](Self::wait_idle) on the
    /// transition to zero.
    pub fn release(&self) {
        let mut slots = self.lock();
        match slots.active.checked_sub(1) {
            Some(n) => slots.active = n,
            None => {
                error!("worker slot released more often than acquired");
                return;
            }
        }
        if slots.active == 0 {
            self.idle.notify_all();
        }
    }

    /// Block until no slot is held.
    pub fn wait_idle(&self) {
        let mut slots = self.lock();
        while slots.active > 0 {
            slots = self.idle.wait(slots).unwrap_or_else(PoisonError::into_inner);
        }
    }

    pub fn active(&self) -> usize {
        self.lock().active
    }

    /// Highest number of slots held at the same time so far.
    pub fn peak(&self) -> usize {
        self.lock().peak
    }

    pub fn limit(&self) -> usize {
        self.limit
    }

    fn lock(&self) -> MutexGuard<'_, Slots> {
        self.slots.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
