use std::fmt;
use std::str::FromStr;

use regex::{Regex, RegexBuilder};

use crate::entry::{Entry, EntryKind};
use crate::error::FffError;
use crate::traits::Matcher;

// ---------------------------------------------------------------------------
// TypeFilter
// ---------------------------------------------------------------------------

/// Which kinds of entries may be reported.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TypeFilter {
    /// Anything that is not a directory.
    File,

    /// Directories only.
    Directory,

    /// Everything.
    #[default]
    Any,
}

impl TypeFilter {
    pub fn accepts(self, kind: EntryKind) -> bool {
        match self {
            Self::File => !kind.is_dir(),
            Self::Directory => kind.is_dir(),
            Self::Any => true,
        }
    }
}

impl FromStr for TypeFilter {
    type Err = FffError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "f" | "file" => Ok(Self::File),
            "d" | "dir" | "directory" => Ok(Self::Directory),
            "a" | "any" => Ok(Self::Any),
            other => Err(FffError::UnknownTypeFilter(other.to_string())),
        }
    }
}

impl fmt::Display for TypeFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::File => "file",
            Self::Directory => "directory",
            Self::Any => "any",
        })
    }
}

// ---------------------------------------------------------------------------
// NamePattern
// ---------------------------------------------------------------------------

/// A name filter as given on the command line, before compilation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NamePattern {
    /// `-regex`: a regular expression matched against the whole leaf name.
    Regex(String),

    /// `-iregex`: like `Regex`, ignoring case.
    IRegex(String),

    /// `-name`: a glob where `*` matches any run of characters.
    Name(String),

    /// `-iname`: like `Name`, ignoring case.
    IName(String),
}

impl NamePattern {
    /// Pick the pattern to use when several were given.
    /// Precedence is regex > iregex > name > iname.
    pub fn select(
        regex: Option<String>,
        iregex: Option<String>,
        name: Option<String>,
        iname: Option<String>,
    ) -> Option<Self> {
        regex
            .map(Self::Regex)
            .or_else(|| iregex.map(Self::IRegex))
            .or_else(|| name.map(Self::Name))
            .or_else(|| iname.map(Self::IName))
    }

    /// Compile into a matcher.
    ///
    /// # Errors
    ///
    /// [`FffError::InvalidPattern`] if the regular expression doesn't parse.
    pub fn compile(&self) -> Result<NameMatcher, FffError> {
        let (source, expr, ignore_case) = match self {
            Self::Regex(p) => (p, anchor(p), false),
            Self::IRegex(p) => (p, anchor(p), true),
            Self::Name(p) => (p, glob_to_regex(p), false),
            Self::IName(p) => (p, glob_to_regex(p), true),
        };

        let regex = RegexBuilder::new(&expr)
            .case_insensitive(ignore_case)
            .build()
            .map_err(|e| FffError::InvalidPattern {
                pattern: source.clone(),
                reason: e.to_string(),
            })?;

        Ok(NameMatcher { regex })
    }
}

/// Translate a glob into an anchored regular expression.
///
/// `*` matches any run of characters; every other character is literal.
pub fn glob_to_regex(glob: &str) -> String {
    let body = glob
        .split('*')
        .map(regex::escape)
        .collect::<Vec<_>>()
        .join(".*");
    format!("^{body}$")
}

fn anchor(expr: &str) -> String {
    format!("^(?:{expr})$")
}

// ---------------------------------------------------------------------------
// NameMatcher
// ---------------------------------------------------------------------------

/// Matches entries whose leaf name satisfies a compiled [`NamePattern`].
pub struct NameMatcher {
    regex: Regex,
}

impl NameMatcher {
    pub fn is_name_match(&self, name: &str) -> bool {
        self.regex.is_match(name)
    }
}

impl Matcher for NameMatcher {
    fn is_match(&self, entry: &Entry) -> bool {
        self.is_name_match(&entry.name)
    }
}

/// Matches every entry. Used when no pattern is given.
pub(crate) struct AllMatcher;

impl Matcher for AllMatcher {
    fn is_match(&self, _entry: &Entry) -> bool {
        true
    }
}
