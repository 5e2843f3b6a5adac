//! # fff
//!
//! Find my file or folder: a bounded-concurrency job dispatcher and the
//! parallel breadth-first file search built on it.
//!
//! The [`Dispatcher`] runs [`Job`]s on at most N worker threads. Jobs may
//! submit further jobs while they run, and [`Dispatcher::drain`] blocks until
//! that self-replenishing stream is exhausted, with no job queued and none
//! running.
//!
//! The search ([`search()`]) is one such stream: every examined directory
//! submits a job per newly discovered child, de-duplicated through a
//! [`VisitedSet`] so symlink cycles terminate.
//!
//! # Quick Start
//!
//! ```rust
//! use std::sync::Arc;
//! use std::sync::atomic::{AtomicUsize, Ordering};
//!
//! use fff::Dispatcher;
//!
//! // Each job below spawns two children until depth 3: 1 + 2 + 4 + 8 jobs.
//! fn tree(dispatcher: Dispatcher, depth: u32, ran: Arc<AtomicUsize>) {
//!     ran.fetch_add(1, Ordering::SeqCst);
//!     if depth < 3 {
//!         for _ in 0..2 {
//!             let (d, r) = (dispatcher.clone(), Arc::clone(&ran));
//!             dispatcher.submit(move || tree(d, depth + 1, r)).unwrap();
//!         }
//!     }
//! }
//!
//! let dispatcher = Dispatcher::new(4, true).unwrap();
//! let ran = Arc::new(AtomicUsize::new(0));
//! let (d, r) = (dispatcher.clone(), Arc::clone(&ran));
//! dispatcher.submit(move || tree(d, 0, r)).unwrap();
//!
//! dispatcher.drain();
//! assert_eq!(ran.load(Ordering::SeqCst), 15);
//! ```
//!
//! # Searching
//!
//! ```rust,no_run
//! use fff::{StdoutSink, TypeFilter};
//!
//! let results = fff::search()
//!     .root(".")
//!     .name("*.rs")
//!     .type_filter(TypeFilter::File)
//!     .threads(4)
//!     .sink(StdoutSink)
//!     .run()
//!     .unwrap();
//!
//! eprintln!("{} matches in {:.3}s", results.matches, results.stats.duration.as_secs_f64());
//! ```

#![forbid(unsafe_code)]

pub mod config;

mod builder;
mod counter;
mod dispatcher;
mod engine;
mod entry;
mod error;
mod expander;
mod filter;
mod gate;
mod job;
mod output;
mod queue;
mod results;
mod traits;
mod visited;

// ── Public re-exports ─────────────────────────────────────────────────────────

pub use builder::SearchBuilder;
pub use counter::ActiveCounter;
pub use dispatcher::{DispatchStats, Dispatcher};
pub use entry::{Entry, EntryKind, FrontierItem};
pub use error::FffError;
pub use expander::ExpandJob;
pub use filter::{glob_to_regex, NameMatcher, NamePattern, TypeFilter};
pub use gate::DispatcherState;
pub use job::Job;
pub use output::StdoutSink;
pub use queue::JobQueue;
pub use results::{Results, ScanStats};
pub use traits::{Matcher, Sink};
pub use visited::VisitedSet;

// ── Entry point ───────────────────────────────────────────────────────────────

/// Create a new [`SearchBuilder`] to configure and run a search.
///
/// # Example
///
/// ```rust
/// let dir = std::env::temp_dir();
/// let results = fff::search()
///     .root(&dir)
///     .max_depth(0)
///     .collect_paths(true)
///     .run()
///     .unwrap();
///
/// assert_eq!(results.paths, vec![dir]);
/// ```
pub fn search() -> SearchBuilder {
    SearchBuilder::default()
}
