use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Instant;

use tracing::debug;

use crate::dispatcher::Dispatcher;
use crate::entry::FrontierItem;
use crate::error::FffError;
use crate::expander::{ExpandJob, Recorder, Scan, ScanParams};
use crate::filter::TypeFilter;
use crate::results::{Results, ScanStats};
use crate::traits::{Matcher, Sink};
use crate::visited::VisitedSet;

// ---------------------------------------------------------------------------
// WalkConfig
// ---------------------------------------------------------------------------

/// Traversal parameters passed from the builder to the engine.
///
/// Callers configure these via the builder methods (`.threads()`,
/// `.min_depth()`, `.max_depth()`, `.type_filter()`).
pub(crate) struct WalkConfig {
    pub threads: usize,
    pub min_depth: usize,
    pub max_depth: Option<usize>,
    pub type_filter: TypeFilter,
}

// ---------------------------------------------------------------------------
// Engine options
// ---------------------------------------------------------------------------

/// Internal options passed from the builder to `run()`.
pub(crate) struct EngineOptions {
    pub config: WalkConfig,
    pub roots: Vec<PathBuf>,
    pub matcher: Arc<dyn Matcher>,
    pub sink: Option<Arc<dyn Sink>>,
    pub shutdown: Option<Arc<AtomicBool>>,
    pub collect_paths: bool,
    pub collect_errors: bool,
}

// ---------------------------------------------------------------------------
// run()
// ---------------------------------------------------------------------------

/// Execute a parallel breadth-first search from every root.
///
/// Every root is seeded into the visited set before any job runs, then the
/// dispatcher is started and drained. Called by `SearchBuilder::run()` after
/// validating inputs.
pub(crate) fn run(opts: EngineOptions) -> Result<Results, FffError> {
    let dispatcher = Dispatcher::new(opts.config.threads, false)?;

    let scan = Arc::new(Scan {
        params: ScanParams {
            matcher: opts.matcher,
            type_filter: opts.config.type_filter,
            min_depth: opts.config.min_depth,
            max_depth: opts.config.max_depth.unwrap_or(usize::MAX),
        },
        visited: VisitedSet::new(),
        recorder: Recorder::new(opts.collect_paths, opts.collect_errors, opts.sink),
        shutdown: opts.shutdown,
        interrupted: AtomicBool::new(false),
    });

    let roots: Vec<FrontierItem> = opts
        .roots
        .into_iter()
        .map(FrontierItem::root)
        .filter(|item| {
            let fresh = scan.visited.try_insert(item.key.clone());
            if !fresh {
                debug!(root = %item.path.display(), "duplicate root skipped");
            }
            fresh
        })
        .collect();

    debug!(
        roots = roots.len(),
        threads = opts.config.threads,
        min_depth = opts.config.min_depth,
        max_depth = ?opts.config.max_depth,
        type_filter = %opts.config.type_filter,
        "starting search"
    );

    let start = Instant::now();
    for item in roots {
        dispatcher.submit(ExpandJob::new(item, Arc::clone(&scan), dispatcher.clone()))?;
    }
    let dispatch = dispatcher.drain();
    let duration = start.elapsed();

    let recorder = &scan.recorder;
    let files = recorder.files.load(Ordering::Relaxed);
    let dirs = recorder.dirs.load(Ordering::Relaxed);
    let error_count = recorder.errors.load(Ordering::Relaxed);
    let completed = !scan.interrupted.load(Ordering::Relaxed);

    debug!(
        matches = recorder.matches.load(Ordering::Relaxed),
        files,
        dirs,
        errors = error_count,
        completed,
        "search finished"
    );

    Ok(Results {
        matches: recorder.matches.load(Ordering::Relaxed),
        paths: take_all(&recorder.paths),
        stats: ScanStats::compute(files, dirs, error_count, duration),
        errors: take_all(&recorder.error_log),
        dispatch,
        completed,
    })
}

fn take_all<T>(slot: &Option<Mutex<Vec<T>>>) -> Vec<T> {
    match slot {
        Some(items) => std::mem::take(&mut *items.lock().unwrap_or_else(PoisonError::into_inner)),
        None => Vec::new(),
    }
}
