use std::io::{self, Write};
use std::path::Path;

use crate::error::FffError;
use crate::traits::Sink;

/// Writes matches to standard output, one per line, and per-item errors to
/// standard error as `<path>: <message>`.
///
/// Each line is written under the stream's own lock, so lines from different
/// workers never interleave.
#[derive(Debug, Default, Clone, Copy)]
pub struct StdoutSink;

impl Sink for StdoutSink {
    fn on_match(&self, path: &Path) {
        let mut out = io::stdout().lock();
        // A closed pipe (`fff | head`) is not worth reporting per line.
        let _ = writeln!(out, "{}", path.display());
    }

    fn on_error(&self, error: &FffError) {
        let mut err = io::stderr().lock();
        let _ = match error.path() {
            Some(path) => writeln!(err, "{}: {}", path.display(), error),
            None => writeln!(err, "{error}"),
        };
    }
}
