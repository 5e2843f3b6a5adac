//! Command-line configuration for the `fff` binary
//!
//! This module defines:
//! - CLI argument parsing using clap derive macros
//! - Rewriting of find-style single-dash flags (`-name`) into clap's `--name`
//! - Validation into a [`ScanConfig`]

use std::ffi::OsString;
use std::path::PathBuf;

use clap::Parser;

use crate::builder::SearchBuilder;
use crate::error::FffError;
use crate::filter::{NamePattern, TypeFilter};

/// Flags that `find` spells with a single dash.
const FIND_STYLE_FLAGS: &[&str] = &[
    "name", "iname", "regex", "iregex", "type", "mindepth", "maxdepth",
];

/// Find my file or folder
#[derive(Parser, Debug, Clone, Default)]
#[command(
    name = "fff",
    version,
    about = "Find my file or folder: a parallel breadth-first search",
    long_about = "Searches each PATH breadth-first for files and folders whose name matches a pattern.\n\n\
                  Places are examined by up to -j worker threads; matches are printed as they are found,\n\
                  so output order across directories is not fixed.",
    after_help = "EXAMPLES:\n    \
        fff . -name '*.rs'\n    \
        fff /var/log -iname '*.LOG' -type f -maxdepth 2\n    \
        fff src tests -regex 'mod|lib\\.rs' -j 8"
)]
pub struct CliArgs {
    /// Files or directories to search (defaults to the current directory)
    #[arg(value_name = "PATH")]
    pub roots: Vec<PathBuf>,

    /// Match names against a glob, where `*` matches anything
    #[arg(long, value_name = "PATTERN")]
    pub name: Option<String>,

    /// Like -name, ignoring case
    #[arg(long, value_name = "PATTERN")]
    pub iname: Option<String>,

    /// Match names against a regular expression (whole name)
    #[arg(long, value_name = "REGEX")]
    pub regex: Option<String>,

    /// Like -regex, ignoring case
    #[arg(long, value_name = "REGEX")]
    pub iregex: Option<String>,

    /// Kind of place to report: f/file, d/dir/directory, a/any
    #[arg(long = "type", value_name = "TYPE")]
    pub type_filter: Option<String>,

    /// Do not report places shallower than this depth
    #[arg(long, value_name = "NUM")]
    pub mindepth: Option<usize>,

    /// Do not descend below this depth
    #[arg(long, value_name = "NUM")]
    pub maxdepth: Option<usize>,

    /// Number of worker threads
    #[arg(short = 'j', long = "jobs", default_value_t = 1, value_name = "NUM")]
    pub jobs: usize,

    /// Verbose logging on standard error
    #[arg(short = 'v', long)]
    pub verbose: bool,
}

/// Rewrite find-style flags (`-name`, `-maxdepth`, ...) into the `--name`
/// form clap understands. The value following a rewritten flag is passed
/// through untouched, so `-name -type` searches for a file named `-type`.
pub fn normalize_args<I, T>(args: I) -> Vec<OsString>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString>,
{
    let mut out = Vec::new();
    let mut value_next = false;

    for arg in args {
        let arg: OsString = arg.into();
        if value_next {
            value_next = false;
            out.push(arg);
            continue;
        }

        let rewritten = arg
            .to_str()
            .and_then(|s| s.strip_prefix('-'))
            .filter(|flag| FIND_STYLE_FLAGS.contains(flag))
            .map(|flag| OsString::from(format!("--{flag}")));

        match rewritten {
            Some(flag) => {
                value_next = true;
                out.push(flag);
            }
            None => out.push(arg),
        }
    }
    out
}

/// Validated search configuration.
#[derive(Debug, Clone)]
pub struct ScanConfig {
    pub roots: Vec<PathBuf>,
    pub pattern: Option<NamePattern>,
    pub type_filter: TypeFilter,
    pub min_depth: usize,
    pub max_depth: Option<usize>,
    pub threads: usize,
    pub verbose: bool,
}

impl ScanConfig {
    /// Validate parsed arguments.
    ///
    /// # Errors
    ///
    /// Unknown `-type`, `-j 0`, `-maxdepth` below `-mindepth`, or a pattern
    /// that doesn't compile.
    pub fn from_args(args: CliArgs) -> Result<Self, FffError> {
        let type_filter = match args.type_filter.as_deref() {
            Some(t) => t.parse()?,
            None => TypeFilter::Any,
        };

        if args.jobs == 0 {
            return Err(FffError::InvalidThreadCount(args.jobs));
        }

        let min_depth = args.mindepth.unwrap_or(0);
        if let Some(max) = args.maxdepth {
            if max < min_depth {
                return Err(FffError::InvalidDepthRange { min: min_depth, max });
            }
        }

        let pattern = NamePattern::select(args.regex, args.iregex, args.name, args.iname);
        if let Some(pattern) = &pattern {
            pattern.compile()?;
        }

        let roots = if args.roots.is_empty() {
            vec![PathBuf::from(".")]
        } else {
            args.roots
        };

        Ok(Self {
            roots,
            pattern,
            type_filter,
            min_depth,
            max_depth: args.maxdepth,
            threads: args.jobs,
            verbose: args.verbose,
        })
    }

    /// A [`SearchBuilder`] configured from this config, without a sink.
    pub fn to_builder(&self) -> SearchBuilder {
        let mut builder = crate::search()
            .roots(self.roots.iter().cloned())
            .type_filter(self.type_filter)
            .min_depth(self.min_depth)
            .threads(self.threads);

        if let Some(max) = self.max_depth {
            builder = builder.max_depth(max);
        }
        if let Some(pattern) = &self.pattern {
            builder = builder.pattern(pattern.clone());
        }
        builder
    }
}
