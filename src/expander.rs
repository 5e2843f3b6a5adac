use std::fs::{self, DirEntry};
use std::io;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use tracing::{debug, trace};

use crate::dispatcher::Dispatcher;
use crate::entry::{Entry, EntryKind, FrontierItem};
use crate::error::FffError;
use crate::filter::TypeFilter;
use crate::job::Job;
use crate::traits::{Matcher, Sink};
use crate::visited::VisitedSet;

// ---------------------------------------------------------------------------
// Scan state
// ---------------------------------------------------------------------------

/// Immutable parameters shared by every job of one search.
pub(crate) struct ScanParams {
    pub matcher: Arc<dyn Matcher>,
    pub type_filter: TypeFilter,
    pub min_depth: usize,
    pub max_depth: usize,
}

/// Everything the jobs of one search share.
pub(crate) struct Scan {
    pub params: ScanParams,
    pub visited: VisitedSet,
    pub recorder: Recorder,
    pub shutdown: Option<Arc<AtomicBool>>,
    pub interrupted: AtomicBool,
}

/// Counts and forwards search output.
///
/// Collected paths, collected errors and the sink are guarded independently;
/// a worker only ever holds one of those locks at a time.
pub(crate) struct Recorder {
    pub matches: AtomicUsize,
    pub files: AtomicUsize,
    pub dirs: AtomicUsize,
    pub errors: AtomicUsize,
    pub paths: Option<Mutex<Vec<PathBuf>>>,
    pub error_log: Option<Mutex<Vec<FffError>>>,
    pub sink: Option<Arc<dyn Sink>>,
}

impl Recorder {
    pub fn new(collect_paths: bool, collect_errors: bool, sink: Option<Arc<dyn Sink>>) -> Self {
        Self {
            matches: AtomicUsize::new(0),
            files: AtomicUsize::new(0),
            dirs: AtomicUsize::new(0),
            errors: AtomicUsize::new(0),
            paths: collect_paths.then(|| Mutex::new(Vec::new())),
            error_log: collect_errors.then(|| Mutex::new(Vec::new())),
            sink,
        }
    }

    fn examined(&self, kind: EntryKind) {
        if kind.is_dir() {
            self.dirs.fetch_add(1, Ordering::Relaxed);
        } else {
            self.files.fetch_add(1, Ordering::Relaxed);
        }
    }

    fn matched(&self, path: PathBuf) {
        self.matches.fetch_add(1, Ordering::Relaxed);
        if let Some(sink) = &self.sink {
            sink.on_match(&path);
        }
        if let Some(paths) = &self.paths {
            paths.lock().unwrap_or_else(PoisonError::into_inner).push(path);
        }
    }

    fn error(&self, err: FffError) {
        self.errors.fetch_add(1, Ordering::Relaxed);
        debug!(path = ?err.path(), error = %err, "skipping entry");
        if let Some(sink) = &self.sink {
            sink.on_error(&err);
        }
        if let Some(log) = &self.error_log {
            log.lock().unwrap_or_else(PoisonError::into_inner).push(err);
        }
    }
}

// ---------------------------------------------------------------------------
// ExpandJob
// ---------------------------------------------------------------------------

/// Examines one place of a search and submits the places it discovers back
/// into the dispatcher it runs on.
pub struct ExpandJob {
    item: FrontierItem,
    scan: Arc<Scan>,
    dispatcher: Dispatcher,
}

impl ExpandJob {
    pub(crate) fn new(item: FrontierItem, scan: Arc<Scan>, dispatcher: Dispatcher) -> Self {
        Self {
            item,
            scan,
            dispatcher,
        }
    }
}

impl Job for ExpandJob {
    fn run(self: Box<Self>) {
        if let Some(flag) = &self.scan.shutdown {
            if flag.load(Ordering::Relaxed) {
                if !self.scan.interrupted.swap(true, Ordering::Relaxed) {
                    debug!("shutdown requested, closing dispatcher");
                    self.dispatcher.close();
                }
                return;
            }
        }
        examine(&self.scan, &self.item, &self.dispatcher);
    }
}

fn examine(scan: &Arc<Scan>, item: &FrontierItem, dispatcher: &Dispatcher) {
    let params = &scan.params;

    let kind = match classify(&item.path) {
        Ok(kind) => kind,
        Err(err) => {
            scan.recorder.error(err);
            return;
        }
    };
    scan.recorder.examined(kind);

    // Children are queued before this entry is matched, so a worker's own
    // output never precedes the expansion it triggered.
    if kind.is_dir() && item.depth < params.max_depth {
        expand(scan, item, dispatcher);
    }

    if item.depth < params.min_depth || !params.type_filter.accepts(kind) {
        return;
    }

    let entry = Entry::new(&item.path, kind, item.depth);
    if params.matcher.is_match(&entry) {
        scan.recorder.matched(entry.path);
    }
}

/// Stat `path`, following symlinks. A link whose target is gone is still
/// reported as a [`EntryKind::Symlink`] rather than an error.
fn classify(path: &Path) -> Result<EntryKind, FffError> {
    match fs::metadata(path) {
        Ok(meta) => Ok(kind_of(&meta.file_type())),
        Err(err) if err.kind() == io::ErrorKind::NotFound => match fs::symlink_metadata(path) {
            Ok(meta) if meta.file_type().is_symlink() => Ok(EntryKind::Symlink),
            _ => Err(FffError::from_io(path, err)),
        },
        Err(err) => Err(FffError::from_io(path, err)),
    }
}

fn kind_of(ft: &fs::FileType) -> EntryKind {
    if ft.is_dir() {
        EntryKind::Dir
    } else if ft.is_file() {
        EntryKind::File
    } else if ft.is_symlink() {
        EntryKind::Symlink
    } else {
        EntryKind::Other
    }
}

fn expand(scan: &Arc<Scan>, item: &FrontierItem, dispatcher: &Dispatcher) {
    let children = match fs::read_dir(&item.path) {
        Ok(children) => children,
        Err(err) => {
            scan.recorder.error(FffError::from_io(&item.path, err));
            return;
        }
    };

    for child in children {
        let child = match child {
            Ok(child) => child,
            Err(err) => {
                scan.recorder.error(FffError::from_io(&item.path, err));
                continue;
            }
        };

        let path = child.path();
        let key = child_key(item, &child, &path);
        if !scan.visited.try_insert(key.clone()) {
            trace!(path = %path.display(), "already scheduled");
            continue;
        }

        let job = ExpandJob::new(item.child(path, key), Arc::clone(scan), dispatcher.clone());
        if let Err(err) = dispatcher.submit(job) {
            debug!(path = %item.path.display(), error = %err, "stopped expanding");
            return;
        }
    }
}

/// Children inherit the parent's canonical key plus their own name, except
/// symlinks, which are resolved so a link back up the tree maps onto a key
/// that is already taken.
fn child_key(parent: &FrontierItem, child: &DirEntry, path: &Path) -> PathBuf {
    let joined = || parent.key.join(child.file_name());
    let is_link = child.file_type().map(|ft| ft.is_symlink()).unwrap_or(true);
    if is_link {
        fs::canonicalize(path).unwrap_or_else(|_| joined())
    } else {
        joined()
    }
}
