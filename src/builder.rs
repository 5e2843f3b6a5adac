use std::path::PathBuf;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;

use crate::engine::{run, EngineOptions, WalkConfig};
use crate::error::FffError;
use crate::filter::{AllMatcher, NamePattern, TypeFilter};
use crate::results::Results;
use crate::traits::{Matcher, Sink};

// ---------------------------------------------------------------------------
// SearchBuilder
// ---------------------------------------------------------------------------

/// Entry point for configuring and executing a search.
///
/// Created via [`fff::search()`](crate::search). Configure with chained
/// builder methods, then call [`run()`](SearchBuilder::run) to execute.
///
/// # Example
///
/// ```rust,ignore
/// let results = fff::search()
///     .root("/var/log")
///     .name("*.log")
///     .type_filter(TypeFilter::File)
///     .max_depth(3)
///     .threads(8)
///     .collect_paths(true)
///     .run()?;
/// ```
pub struct SearchBuilder {
    roots:          Vec<PathBuf>,
    pattern:        Option<NamePattern>,
    matcher:        Option<Box<dyn Matcher>>,
    type_filter:    TypeFilter,
    threads:        usize,
    min_depth:      usize,
    max_depth:      Option<usize>,
    sink:           Option<Arc<dyn Sink>>,
    shutdown:       Option<Arc<AtomicBool>>,
    collect_paths:  bool,
    collect_errors: bool,
}

impl Default for SearchBuilder {
    fn default() -> Self {
        Self {
            roots:          Vec::new(),
            pattern:        None,
            matcher:        None,
            type_filter:    TypeFilter::Any,
            threads:        num_cpus(),
            min_depth:      0,
            max_depth:      None,
            sink:           None,
            shutdown:       None,
            collect_paths:  false,
            collect_errors: false,
        }
    }
}

impl SearchBuilder {
    // ── Roots ─────────────────────────────────────────────────────────────

    /// Add a starting path. May be called repeatedly.
    pub fn root(mut self, path: impl Into<PathBuf>) -> Self {
        self.roots.push(path.into());
        self
    }

    /// Add several starting paths.
    pub fn roots<I, P>(mut self, paths: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        self.roots.extend(paths.into_iter().map(Into::into));
        self
    }

    // ── Matching ──────────────────────────────────────────────────────────

    /// Match leaf names against a glob (`*` matches anything).
    pub fn name(self, glob: impl Into<String>) -> Self {
        self.pattern(NamePattern::Name(glob.into()))
    }

    /// Case-insensitive [`name`](Self::name).
    pub fn iname(self, glob: impl Into<String>) -> Self {
        self.pattern(NamePattern::IName(glob.into()))
    }

    /// Match leaf names against a regular expression. The whole name must match.
    pub fn regex(self, expr: impl Into<String>) -> Self {
        self.pattern(NamePattern::Regex(expr.into()))
    }

    /// Case-insensitive [`regex`](Self::regex).
    pub fn iregex(self, expr: impl Into<String>) -> Self {
        self.pattern(NamePattern::IRegex(expr.into()))
    }

    /// Set the name pattern directly. Replaces any earlier pattern.
    pub fn pattern(mut self, pattern: NamePattern) -> Self {
        self.pattern = Some(pattern);
        self
    }

    /// Set a custom matcher. Takes precedence over any name pattern.
    pub fn with_matcher(mut self, m: impl Matcher + 'static) -> Self {
        self.matcher = Some(Box::new(m));
        self
    }

    /// Only report entries of this kind. Defaults to [`TypeFilter::Any`].
    pub fn type_filter(mut self, filter: TypeFilter) -> Self {
        self.type_filter = filter;
        self
    }

    // ── Options ───────────────────────────────────────────────────────────

    /// Number of worker threads. Defaults to the number of logical CPU cores.
    pub fn threads(mut self, n: usize) -> Self {
        self.threads = n;
        self
    }

    /// Don't report entries shallower than `d`. Roots are depth 0.
    pub fn min_depth(mut self, d: usize) -> Self {
        self.min_depth = d;
        self
    }

    /// Don't descend below depth `d`. `0` examines the roots only.
    /// Unlimited by default.
    pub fn max_depth(mut self, d: usize) -> Self {
        self.max_depth = Some(d);
        self
    }

    /// Stream matches and errors to `sink` as they are found.
    pub fn sink(mut self, sink: impl Sink + 'static) -> Self {
        self.sink = Some(Arc::new(sink));
        self
    }

    /// Stop the search once `flag` is set. Jobs already running finish,
    /// the rest are skipped, and [`Results::completed`] is `false`.
    pub fn shutdown_flag(mut self, flag: Arc<AtomicBool>) -> Self {
        self.shutdown = Some(flag);
        self
    }

    /// Collect matched paths into [`Results::paths`].
    pub fn collect_paths(mut self, yes: bool) -> Self {
        self.collect_paths = yes;
        self
    }

    /// Collect per-item errors into [`Results::errors`].
    pub fn collect_errors(mut self, yes: bool) -> Self {
        self.collect_errors = yes;
        self
    }

    // ── Execute ───────────────────────────────────────────────────────────

    /// Execute the search and return results.
    ///
    /// Blocks until every discovered place has been examined.
    ///
    /// # Errors
    ///
    /// Returns `Err` for configuration errors only (no roots, zero threads,
    /// `max_depth < min_depth`, a pattern that doesn't compile). Per-item
    /// errors during traversal go to the sink and, with
    /// `.collect_errors(true)`, into [`Results::errors`].
    pub fn run(self) -> Result<Results, FffError> {
        if self.roots.is_empty() {
            return Err(FffError::InvalidSource("no root provided".into()));
        }
        if self.threads == 0 {
            return Err(FffError::InvalidThreadCount(self.threads));
        }
        if let Some(max) = self.max_depth {
            if max < self.min_depth {
                return Err(FffError::InvalidDepthRange {
                    min: self.min_depth,
                    max,
                });
            }
        }

        let matcher: Arc<dyn Matcher> = match (self.matcher, &self.pattern) {
            (Some(m), _)        => Arc::from(m),
            (None, Some(p))     => Arc::new(p.compile()?),
            (None, None)        => Arc::new(AllMatcher),
        };

        let opts = EngineOptions {
            config: WalkConfig {
                threads:     self.threads,
                min_depth:   self.min_depth,
                max_depth:   self.max_depth,
                type_filter: self.type_filter,
            },
            roots:          self.roots,
            matcher,
            sink:           self.sink,
            shutdown:       self.shutdown,
            collect_paths:  self.collect_paths,
            collect_errors: self.collect_errors,
        };

        run(opts)
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Get the logical CPU count, with a safe fallback.
fn num_cpus() -> usize {
    std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(4)
}
