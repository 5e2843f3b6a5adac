use std::path::PathBuf;
use std::time::Duration;

use crate::dispatcher::DispatchStats;
use crate::error::FffError;

/// The output of a completed search.
///
/// `paths` and `errors` are both opt-in — disabled by default to avoid
/// allocation overhead when output is streamed to a [`Sink`](crate::Sink).
/// Enable them on the builder: `.collect_paths(true)` and
/// `.collect_errors(true)`.
pub struct Results {
    /// Total number of entries that matched the search criteria.
    pub matches: usize,

    /// Paths of matched entries, in the order workers reported them.
    /// Only populated if `.collect_paths(true)` was set on the builder.
    pub paths: Vec<PathBuf>,

    /// Scan statistics.
    pub stats: ScanStats,

    /// Per-item errors encountered during the search (permission denied, etc.).
    /// Only populated if `.collect_errors(true)` was set on the builder.
    pub errors: Vec<FffError>,

    /// What the underlying dispatcher did.
    pub dispatch: DispatchStats,

    /// `false` if the search was cut short through its shutdown flag.
    pub completed: bool,
}

/// Performance statistics for a completed scan.
pub struct ScanStats {
    /// Non-directory entries examined (matched or not).
    pub files: usize,

    /// Directories examined.
    pub dirs: usize,

    /// Entries that could not be examined.
    pub errors: usize,

    /// Wall-clock time from search start to completion.
    pub duration: Duration,

    /// Examined entries per second, clamped to 0 on zero-duration runs.
    pub entries_per_sec: usize,
}

impl ScanStats {
    pub(crate) fn compute(files: usize, dirs: usize, errors: usize, duration: Duration) -> Self {
        let total = files + dirs;
        let eps = if duration.as_secs_f64() > 0.0 {
            (total as f64 / duration.as_secs_f64()) as usize
        } else {
            0
        };
        Self {
            files,
            dirs,
            errors,
            duration,
            entries_per_sec: eps,
        }
    }
}
