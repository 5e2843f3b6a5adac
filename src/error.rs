use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum FffError {
    // Traversal
    #[error("permission denied")]
    PermissionDenied(PathBuf),

    #[error("no such file or directory")]
    NotFound(PathBuf),

    #[error("{source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // Config
    #[error("invalid source: {0}")]
    InvalidSource(String),

    #[error("invalid pattern `{pattern}`: {reason}")]
    InvalidPattern { pattern: String, reason: String },

    #[error("must use at least 1 thread (got {0})")]
    InvalidThreadCount(usize),

    #[error("max depth ({max}) is less than min depth ({min})")]
    InvalidDepthRange { min: usize, max: usize },

    #[error("unknown search type \"{0}\"")]
    UnknownTypeFilter(String),

    // Dispatch
    #[error("pop() called on empty queue")]
    EmptyQueue,

    #[error("dispatcher is closed to new jobs")]
    DispatcherClosed,
}

impl FffError {
    /// Wrap an I/O failure observed at `path`, splitting out the kinds callers
    /// commonly branch on.
    pub fn from_io(path: &Path, err: std::io::Error) -> Self {
        match err.kind() {
            std::io::ErrorKind::PermissionDenied => Self::PermissionDenied(path.to_path_buf()),
            std::io::ErrorKind::NotFound => Self::NotFound(path.to_path_buf()),
            _ => Self::Io {
                path: path.to_path_buf(),
                source: err,
            },
        }
    }

    /// The path this error occurred at, if applicable.
    /// Callers use this to print `<path>: <message>` without matching on variants.
    pub fn path(&self) -> Option<&PathBuf> {
        match self {
            Self::PermissionDenied(p) | Self::NotFound(p) | Self::Io { path: p, .. } => Some(p),
            _ => None,
        }
    }

    /// Whether the search can continue after this error.
    ///
    /// Per-item errors (permission denied, vanished entries, other IO) are
    /// reported and the scan keeps going. Everything else is either a
    /// configuration problem or a dispatcher condition.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            Self::PermissionDenied(_) | Self::NotFound(_) | Self::Io { .. }
        )
    }

    /// Whether this error was caused by bad configuration, detected before
    /// any work is dispatched.
    pub fn is_config_error(&self) -> bool {
        matches!(
            self,
            Self::InvalidSource(_)
                | Self::InvalidPattern { .. }
                | Self::InvalidThreadCount(_)
                | Self::InvalidDepthRange { .. }
                | Self::UnknownTypeFilter(_)
        )
    }
}
