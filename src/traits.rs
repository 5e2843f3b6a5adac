use std::path::Path;

use crate::entry::Entry;
use crate::error::FffError;

/// Determines whether an entry is a match.
///
/// The built-in [`NameMatcher`](crate::NameMatcher) covers `-name`/`-regex`
/// style filters; implement this for anything else (extensions, metadata,
/// scoring).
///
/// # Thread Safety
///
/// `Send + Sync` are required — matchers are shared across worker threads and
/// called concurrently on different entries.
///
/// # Example
///
/// ```rust
/// use fff::{Matcher, Entry};
///
/// struct ExtensionMatcher(String);
///
/// impl Matcher for ExtensionMatcher {
///     fn is_match(&self, entry: &Entry) -> bool {
///         entry.path
///             .extension()
///             .map(|e| e.eq_ignore_ascii_case(&self.0))
///             .unwrap_or(false)
///     }
/// }
/// ```
pub trait Matcher: Send + Sync {
    /// Returns `true` if this entry should be reported.
    fn is_match(&self, entry: &Entry) -> bool;
}

/// Receives search output as it is produced.
///
/// Called from worker threads in discovery order per worker, not globally
/// ordered. Implementations do their own locking.
pub trait Sink: Send + Sync {
    /// A matched path.
    fn on_match(&self, path: &Path);

    /// A per-item error. The search continues.
    fn on_error(&self, error: &FffError);
}
