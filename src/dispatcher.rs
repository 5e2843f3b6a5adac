use std::any::Any;
use std::cell::Cell;
use std::io;
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::thread::{self, JoinHandle};

use tracing::{debug, error, trace, warn};

use crate::counter::ActiveCounter;
use crate::error::FffError;
use crate::gate::{DispatcherState, TerminationGate};
use crate::job::Job;
use crate::queue::JobQueue;

// ---------------------------------------------------------------------------
// DispatchStats
// ---------------------------------------------------------------------------

/// Counters describing what a dispatcher has done so far.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DispatchStats {
    /// Jobs accepted by `submit`.
    pub submitted: usize,

    /// Jobs that finished running, panicked or not.
    pub executed: usize,

    /// Jobs whose body panicked. The panic is caught at the worker boundary.
    pub panicked: usize,

    /// Most worker slots held at the same time.
    pub peak_active: usize,
}

// ---------------------------------------------------------------------------
// Dispatcher
// ---------------------------------------------------------------------------

/// Runs submitted [`Job`]s on at most `concurrency_limit` worker threads.
///
/// Jobs may submit more jobs through a clone of the dispatcher they run on;
/// [`drain`](Dispatcher::drain) waits for that growing frontier to run dry.
///
/// Worker threads are started lazily as slots free up and keep pulling from
/// the queue until it is empty, so a busy dispatcher reuses the same threads
/// rather than spawning one per job.
///
/// Each piece of shared state (queue, slot counter, pending-work gate, worker
/// registry) has its own lock and no lock is taken while another is held.
///
/// `Dispatcher` is a cheap handle; clones share the same queue and workers.
/// Dropping the last handle outside a worker thread drains the dispatcher, so
/// buffered jobs run and worker threads are joined before the drop returns.
/// Queued jobs that hold a clone keep the dispatcher alive; call
/// [`drain`](Dispatcher::drain) explicitly for those.
///
/// # Example
///
/// ```rust
/// use std::sync::Arc;
/// use std::sync::atomic::{AtomicUsize, Ordering};
///
/// use fff::Dispatcher;
///
/// let dispatcher = Dispatcher::new(4, false).unwrap();
/// let ran = Arc::new(AtomicUsize::new(0));
///
/// for _ in 0..10 {
///     let ran = Arc::clone(&ran);
///     dispatcher.submit(move || { ran.fetch_add(1, Ordering::SeqCst); }).unwrap();
/// }
///
/// // Deferred mode: nothing runs until start() (drain() starts implicitly).
/// dispatcher.start();
/// let stats = dispatcher.drain();
///
/// assert_eq!(ran.load(Ordering::SeqCst), 10);
/// assert_eq!(stats.executed, 10);
/// ```
pub struct Dispatcher {
    inner: Arc<Inner>,
}

struct Inner {
    /// Live `Dispatcher` handles. Worker threads hold `Inner` directly and
    /// are not counted.
    handles: AtomicUsize,
    queue: JobQueue<Box<dyn Job>>,
    active: ActiveCounter,
    gate: TerminationGate,
    workers: Mutex<Vec<JoinHandle<()>>>,
    next_worker: AtomicUsize,
    submitted: AtomicUsize,
    executed: AtomicUsize,
    panicked: AtomicUsize,
}

impl Dispatcher {
    /// Create a dispatcher running at most `concurrency_limit` jobs at once.
    ///
    /// With `auto_start` the dispatcher admits immediately; otherwise
    /// submissions are buffered until [`start`](Self::start).
    ///
    /// # Errors
    ///
    /// [`FffError::InvalidThreadCount`] if `concurrency_limit` is zero.
    pub fn new(concurrency_limit: usize, auto_start: bool) -> Result<Self, FffError> {
        if concurrency_limit == 0 {
            return Err(FffError::InvalidThreadCount(concurrency_limit));
        }

        let dispatcher = Self {
            inner: Arc::new(Inner {
                handles: AtomicUsize::new(1),
                queue: JobQueue::new(),
                active: ActiveCounter::new(concurrency_limit),
                gate: TerminationGate::new(),
                workers: Mutex::new(Vec::new()),
                next_worker: AtomicUsize::new(0),
                submitted: AtomicUsize::new(0),
                executed: AtomicUsize::new(0),
                panicked: AtomicUsize::new(0),
            }),
        };

        if auto_start {
            dispatcher.start();
        }
        Ok(dispatcher)
    }

    /// Queue `job` and, if the dispatcher has started, put idle slots to work.
    ///
    /// Never blocks beyond the short critical sections of the queue and
    /// counters. If no worker thread can be spawned the job stays queued for
    /// a running worker or the next [`drain`](Self::drain). Safe to call from
    /// inside a running job.
    ///
    /// # Errors
    ///
    /// [`FffError::DispatcherClosed`] after [`close`](Self::close) or once
    /// the dispatcher has drained.
    pub fn submit(&self, job: impl Job) -> Result<(), FffError> {
        self.submit_boxed(Box::new(job))
    }

    /// [`submit`](Self::submit) for an already boxed job.
    pub fn submit_boxed(&self, job: Box<dyn Job>) -> Result<(), FffError> {
        self.inner.gate.admit()?;
        self.inner.submitted.fetch_add(1, Ordering::Relaxed);
        self.inner.queue.push(job);

        if self.inner.gate.is_open() {
            // A failed spawn leaves the job queued; drain() picks it up.
            let _ = fill_slots(&self.inner);
        }
        Ok(())
    }

    /// Begin running jobs, including any buffered before this call.
    /// Idempotent.
    pub fn start(&self) {
        let _ = self.open_and_fill();
    }

    /// Stop admitting new jobs. Jobs already queued still run.
    pub fn close(&self) {
        debug!(queued = self.inner.queue.len(), "dispatcher closed to new jobs");
        self.inner.gate.close();
    }

    /// Block until every submitted job has finished, including jobs submitted
    /// by other jobs while draining, then join the worker threads.
    ///
    /// Starts the dispatcher if it was created in deferred mode. Afterwards the
    /// dispatcher is [`DispatcherState::Quiescent`] and rejects submissions.
    ///
    /// Must not be called from inside a job running on this dispatcher.
    pub fn drain(&self) -> DispatchStats {
        if self.open_and_fill().is_err() && self.inner.active.try_acquire() {
            // No thread to hand the queue to; the caller is blocking anyway.
            warn!("running queued jobs on the draining thread");
            worker_loop(&self.inner);
        }
        debug!(pending = self.inner.gate.pending(), "draining dispatcher");

        self.inner.gate.wait_quiescent();
        self.inner.active.wait_idle();

        let handles = std::mem::take(&mut *self.inner.workers());
        for handle in handles {
            if handle.join().is_err() {
                error!("worker thread panicked outside of a job");
            }
        }

        let stats = self.stats();
        debug!(
            executed = stats.executed,
            panicked = stats.panicked,
            peak_active = stats.peak_active,
            "dispatcher quiescent"
        );
        stats
    }

    /// Queued jobs at this instant, not counting running ones.
    pub fn len(&self) -> usize {
        self.inner.queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.queue.is_empty()
    }

    /// Worker slots currently held.
    pub fn active(&self) -> usize {
        self.inner.active.active()
    }

    pub fn concurrency_limit(&self) -> usize {
        self.inner.active.limit()
    }

    pub fn state(&self) -> DispatcherState {
        self.inner.gate.lifecycle()
    }

    /// Whether `submit` would currently be accepted.
    pub fn is_accepting(&self) -> bool {
        self.inner.gate.is_accepting()
    }

    pub fn stats(&self) -> DispatchStats {
        DispatchStats {
            submitted: self.inner.submitted.load(Ordering::Relaxed),
            executed: self.inner.executed.load(Ordering::Relaxed),
            panicked: self.inner.panicked.load(Ordering::Relaxed),
            peak_active: self.inner.active.peak(),
        }
    }

    fn open_and_fill(&self) -> Result<(), io::Error> {
        if self.inner.gate.open() {
            debug!(
                limit = self.inner.active.limit(),
                buffered = self.inner.queue.len(),
                "dispatcher started"
            );
        }
        fill_slots(&self.inner)
    }
}

impl Clone for Dispatcher {
    fn clone(&self) -> Self {
        self.inner.handles.fetch_add(1, Ordering::Relaxed);
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl Drop for Dispatcher {
    fn drop(&mut self) {
        if self.inner.handles.fetch_sub(1, Ordering::AcqRel) != 1 {
            return;
        }
        // A job dropping the last handle would wait on its own slot.
        if IN_WORKER.with(Cell::get) || thread::panicking() {
            return;
        }
        if self.inner.gate.lifecycle() != DispatcherState::Quiescent {
            debug!("last dispatcher handle dropped, draining");
            // Jobs may clone and drop handles while we wait.
            self.inner.handles.fetch_add(1, Ordering::AcqRel);
            self.drain();
            self.inner.handles.fetch_sub(1, Ordering::AcqRel);
        }
    }
}

// ---------------------------------------------------------------------------
// Workers
// ---------------------------------------------------------------------------

thread_local! {
    static IN_WORKER: Cell<bool> = const { Cell::new(false) };
}

/// Start workers while there are queued jobs and free slots.
///
/// Spawns at most one worker per job seen in the queue at entry; a worker that
/// loses the race for a job simply gives its slot back.
///
/// A slot taken after quiescence is handed straight back. A spawned thread is
/// registered before the registry lock is released, so `drain` always sees
/// the handle of any worker that held a slot it waited on.
///
/// On spawn failure the slot is released and the remaining jobs stay queued.
fn fill_slots(inner: &Arc<Inner>) -> Result<(), io::Error> {
    if !inner.gate.is_open() {
        return Ok(());
    }

    let queued = inner.queue.len();
    for _ in 0..queued {
        if !inner.active.try_acquire() {
            break;
        }
        if inner.gate.lifecycle() == DispatcherState::Quiescent {
            inner.active.release();
            break;
        }

        let id = inner.next_worker.fetch_add(1, Ordering::Relaxed);
        let worker = Arc::clone(inner);

        let mut workers = inner.workers();
        let spawned = thread::Builder::new()
            .name(format!("fff-worker-{id}"))
            .spawn(move || {
                IN_WORKER.with(|flag| flag.set(true));
                worker_loop(&worker);
            });

        match spawned {
            Ok(handle) => {
                workers.retain(|h| !h.is_finished());
                workers.push(handle);
            }
            Err(err) => {
                drop(workers);
                warn!(%err, queued = inner.queue.len(), "failed to spawn worker thread");
                inner.active.release();
                return Err(err);
            }
        }
    }
    Ok(())
}

/// Pull and run jobs until the queue is empty, then give the slot back.
fn worker_loop(inner: &Inner) {
    loop {
        match inner.queue.pop() {
            Ok(job) => inner.execute(job),
            Err(err) => {
                trace!(%err, "no job for worker, releasing slot");
                inner.active.release();

                // A submitter may have pushed between our pop and release while
                // we still held the slot it needed.
                if inner.queue.is_empty() || !inner.active.try_acquire() {
                    return;
                }
            }
        }
    }
}

impl Inner {
    fn execute(&self, job: Box<dyn Job>) {
        let outcome = panic::catch_unwind(AssertUnwindSafe(move || job.run()));
        self.executed.fetch_add(1, Ordering::Relaxed);

        if let Err(payload) = outcome {
            self.panicked.fetch_add(1, Ordering::Relaxed);
            error!(panic = %panic_message(payload.as_ref()), "job panicked");
        }

        self.gate.complete();
    }

    fn workers(&self) -> MutexGuard<'_, Vec<JoinHandle<()>>> {
        self.workers.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> &str {
    if let Some(s) = payload.downcast_ref::<&'static str>() {
        s
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.as_str()
    } else {
        "non-string panic payload"
    }
}
