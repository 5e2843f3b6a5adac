use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard, PoisonError};

/// Keys of everything already scheduled during a search.
///
/// Seed it with every root before scheduling anything so a symlink pointing
/// back at a root is recognised as already seen.
#[derive(Default)]
pub struct VisitedSet {
    keys: Mutex<HashSet<PathBuf>>,
}

impl VisitedSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert `key` if absent. Returns `true` when this call inserted it.
    ///
    /// Check and insert happen under one lock, so of several threads racing
    /// on the same key exactly one wins.
    pub fn try_insert(&self, key: PathBuf) -> bool {
        self.lock().insert(key)
    }

    pub fn contains(&self, key: &Path) -> bool {
        self.lock().contains(key)
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    fn lock(&self) -> MutexGuard<'_, HashSet<PathBuf>> {
        self.keys.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
