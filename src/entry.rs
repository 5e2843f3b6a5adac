use std::path::{Path, PathBuf};

/// A single examined place, handed to [`Matcher`](crate::traits::Matcher)s.
pub struct Entry {
    /// Path as discovered: the root joined with each name on the way down.
    pub path: PathBuf,

    /// The entry's leaf name. For roots without a file name (`.`, `/`) this is
    /// the whole path.
    pub name: String,

    /// What kind of entry this is.
    pub kind: EntryKind,

    /// How deep in the search this entry was found. Roots = 0.
    pub depth: usize,
}

impl Entry {
    pub(crate) fn new(path: &Path, kind: EntryKind, depth: usize) -> Self {
        let name = match path.file_name() {
            Some(name) => name.to_string_lossy().into_owned(),
            None => path.to_string_lossy().into_owned(),
        };
        Self {
            path: path.to_path_buf(),
            name,
            kind,
            depth,
        }
    }
}

/// The kind of an examined entry, as seen through symlinks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    /// A regular file.
    File,

    /// A directory (or a symlink to one).
    Dir,

    /// A symbolic link whose target does not exist.
    Symlink,

    /// Anything else (device files, pipes, sockets, etc.).
    Other,
}

impl EntryKind {
    pub fn is_dir(self) -> bool {
        self == Self::Dir
    }
}

/// One unit of the search frontier: a place still to be examined.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrontierItem {
    /// Path as discovered, used for output.
    pub path: PathBuf,

    /// Canonical identity used for de-duplication.
    pub key: PathBuf,

    /// Parent depth + 1. Roots = 0.
    pub depth: usize,
}

impl FrontierItem {
    /// A starting point. The key is the canonical path when it can be resolved.
    pub fn root(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let key = std::fs::canonicalize(&path).unwrap_or_else(|_| path.clone());
        Self {
            path,
            key,
            depth: 0,
        }
    }

    /// A child found inside this item.
    pub fn child(&self, path: PathBuf, key: PathBuf) -> Self {
        Self {
            path,
            key,
            depth: self.depth + 1,
        }
    }
}
