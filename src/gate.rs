use std::sync::{Condvar, Mutex, MutexGuard, PoisonError};

use crate::error::FffError;

/// Where a [`Dispatcher`](crate::Dispatcher) is in its life.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatcherState {
    /// Accepting submissions but not running them yet.
    Created,

    /// Running submitted jobs.
    Admitting,

    /// A caller is blocked in `drain()` waiting for pending work to finish.
    Draining,

    /// No work left and none accepted. Safe to drop.
    Quiescent,
}

struct GateState {
    lifecycle: DispatcherState,
    accepting: bool,
    pending: usize,
}

/// Tracks admitted-but-unfinished jobs and signals when that count reaches
/// zero.
///
/// `pending` covers both queued and running jobs, so reading it gives a single
/// consistent view of "queue empty and nothing active" without taking the
/// queue and counter locks together. Admission and lifecycle live under the
/// same lock so a submission can never slip in after quiescence was declared.
pub(crate) struct TerminationGate {
    state: Mutex<GateState>,
    quiescent: Condvar,
}

impl TerminationGate {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(GateState {
                lifecycle: DispatcherState::Created,
                accepting: true,
                pending: 0,
            }),
            quiescent: Condvar::new(),
        }
    }

    /// Count one more pending job, or refuse it.
    pub fn admit(&self) -> Result<(), FffError> {
        let mut state = self.lock();
        if !state.accepting || state.lifecycle == DispatcherState::Quiescent {
            return Err(FffError::DispatcherClosed);
        }
        state.pending += 1;
        Ok(())
    }

    /// Mark one pending job finished.
    pub fn complete(&self) {
        let mut state = self.lock();
        state.pending = state.pending.saturating_sub(1);
        if state.pending == 0 {
            self.quiescent.notify_all();
        }
    }

    /// `Created → Admitting`. Returns `false` if the gate was already open.
    pub fn open(&self) -> bool {
        let mut state = self.lock();
        if state.lifecycle != DispatcherState::Created {
            return false;
        }
        state.lifecycle = DispatcherState::Admitting;
        true
    }

    /// Refuse every later `admit`.
    pub fn close(&self) {
        self.lock().accepting = false;
    }

    /// Block until nothing is pending, then declare quiescence.
    pub fn wait_quiescent(&self) {
        let mut state = self.lock();
        if state.lifecycle != DispatcherState::Quiescent {
            state.lifecycle = DispatcherState::Draining;
        }
        while state.pending > 0 {
            state = self
                .quiescent
                .wait(state)
                .unwrap_or_else(PoisonError::into_inner);
        }
        state.lifecycle = DispatcherState::Quiescent;
        state.accepting = false;
    }

    pub fn is_open(&self) -> bool {
        self.lock().lifecycle != DispatcherState::Created
    }

    pub fn is_accepting(&self) -> bool {
        let state = self.lock();
        state.accepting && state.lifecycle != DispatcherState::Quiescent
    }

    pub fn lifecycle(&self) -> DispatcherState {
        self.lock().lifecycle
    }

    pub fn pending(&self) -> usize {
        self.lock().pending
    }

    fn lock(&self) -> MutexGuard<'_, GateState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
