use std::ffi::OsString;
use std::path::PathBuf;

use clap::Parser;
use fff::config::{normalize_args, CliArgs, ScanConfig};
use fff::{glob_to_regex, EntryKind, FffError, NamePattern, TypeFilter};

fn parse(args: &[&str]) -> CliArgs {
    CliArgs::parse_from(normalize_args(std::iter::once("fff").chain(args.iter().copied())))
}

// ---------------------------------------------------------------------------
// Patterns
// ---------------------------------------------------------------------------

#[test]
fn glob_star_matches_any_substring() {
    let matcher = NamePattern::Name("*.txt".into()).compile().unwrap();
    assert!(matcher.is_name_match("report.txt"));
    assert!(matcher.is_name_match(".txt"));
    assert!(!matcher.is_name_match("report.doc"));
    assert!(!matcher.is_name_match("report.txt.bak"));
}

#[test]
fn glob_treats_regex_metacharacters_literally() {
    assert_eq!(glob_to_regex("*.txt"), r"^.*\.txt$");

    let matcher = NamePattern::Name("a+b(1).rs".into()).compile().unwrap();
    assert!(matcher.is_name_match("a+b(1).rs"));
    assert!(!matcher.is_name_match("aab1.rs"));
}

#[test]
fn case_insensitive_patterns() {
    let iname = NamePattern::IName("README*".into()).compile().unwrap();
    assert!(iname.is_name_match("readme.md"));

    let name = NamePattern::Name("README*".into()).compile().unwrap();
    assert!(!name.is_name_match("readme.md"));

    let iregex = NamePattern::IRegex("main\\.(rs|c)".into()).compile().unwrap();
    assert!(iregex.is_name_match("MAIN.RS"));
}

#[test]
fn regex_is_anchored_to_the_whole_name() {
    let matcher = NamePattern::Regex("foo|bar".into()).compile().unwrap();
    assert!(matcher.is_name_match("foo"));
    assert!(matcher.is_name_match("bar"));
    assert!(!matcher.is_name_match("foobar"));
    assert!(!matcher.is_name_match("xbar"));
}

#[test]
fn pattern_precedence() {
    let all = NamePattern::select(
        Some("r".into()),
        Some("ir".into()),
        Some("n".into()),
        Some("in".into()),
    );
    assert_eq!(all, Some(NamePattern::Regex("r".into())));

    let no_regex = NamePattern::select(None, Some("ir".into()), Some("n".into()), None);
    assert_eq!(no_regex, Some(NamePattern::IRegex("ir".into())));

    let names = NamePattern::select(None, None, Some("n".into()), Some("in".into()));
    assert_eq!(names, Some(NamePattern::Name("n".into())));

    assert_eq!(NamePattern::select(None, None, None, None), None);
}

#[test]
fn invalid_regex_is_a_config_error() {
    let err = NamePattern::Regex("[unclosed".into()).compile().err().unwrap();
    assert!(matches!(&err, FffError::InvalidPattern { pattern, .. } if pattern == "[unclosed"));
    assert!(err.is_config_error());
    assert!(!err.is_recoverable());
}

// ---------------------------------------------------------------------------
// Type filter
// ---------------------------------------------------------------------------

#[test]
fn type_filter_parses_short_and_long_forms() {
    for (input, expected) in [
        ("f", TypeFilter::File),
        ("file", TypeFilter::File),
        ("d", TypeFilter::Directory),
        ("dir", TypeFilter::Directory),
        ("directory", TypeFilter::Directory),
        ("a", TypeFilter::Any),
        ("any", TypeFilter::Any),
    ] {
        assert_eq!(input.parse::<TypeFilter>().unwrap(), expected, "{input}");
    }

    let err = "socket".parse::<TypeFilter>().unwrap_err();
    assert!(matches!(err, FffError::UnknownTypeFilter(ref t) if t == "socket"));
}

#[test]
fn type_filter_accepts() {
    assert!(TypeFilter::File.accepts(EntryKind::File));
    assert!(TypeFilter::File.accepts(EntryKind::Symlink));
    assert!(!TypeFilter::File.accepts(EntryKind::Dir));
    assert!(TypeFilter::Directory.accepts(EntryKind::Dir));
    assert!(!TypeFilter::Directory.accepts(EntryKind::Other));
    assert!(TypeFilter::Any.accepts(EntryKind::Other));
}

// ---------------------------------------------------------------------------
// Argument normalization
// ---------------------------------------------------------------------------

#[test]
fn normalizes_find_style_flags() {
    let args = normalize_args(["fff", "src", "-name", "*.rs", "-maxdepth", "2", "-j", "4"]);
    let expected: Vec<OsString> = ["fff", "src", "--name", "*.rs", "--maxdepth", "2", "-j", "4"]
        .into_iter()
        .map(OsString::from)
        .collect();
    assert_eq!(args, expected);
}

#[test]
fn flag_values_are_not_rewritten() {
    let args = normalize_args(["fff", "-name", "-type"]);
    assert_eq!(args[1], OsString::from("--name"));
    assert_eq!(args[2], OsString::from("-type"));
}

#[test]
fn parses_full_command_line() {
    let args = parse(&[
        "a", "b", "-iname", "*.LOG", "-type", "f", "-mindepth", "1", "-maxdepth", "3", "-j", "8",
    ]);
    assert_eq!(args.roots, vec![PathBuf::from("a"), PathBuf::from("b")]);
    assert_eq!(args.iname.as_deref(), Some("*.LOG"));
    assert_eq!(args.type_filter.as_deref(), Some("f"));
    assert_eq!(args.mindepth, Some(1));
    assert_eq!(args.maxdepth, Some(3));
    assert_eq!(args.jobs, 8);
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

#[test]
fn defaults() {
    let config = ScanConfig::from_args(parse(&[])).unwrap();
    assert_eq!(config.roots, vec![PathBuf::from(".")]);
    assert_eq!(config.type_filter, TypeFilter::Any);
    assert_eq!(config.min_depth, 0);
    assert_eq!(config.max_depth, None);
    assert_eq!(config.threads, 1);
    assert_eq!(config.pattern, None);
}

#[test]
fn rejects_max_depth_below_min_depth() {
    let err = ScanConfig::from_args(parse(&["-mindepth", "3", "-maxdepth", "2"])).unwrap_err();
    assert!(matches!(err, FffError::InvalidDepthRange { min: 3, max: 2 }));
    assert!(err.is_config_error());
}

#[test]
fn equal_depths_are_fine() {
    let config = ScanConfig::from_args(parse(&["-mindepth", "2", "-maxdepth", "2"])).unwrap();
    assert_eq!((config.min_depth, config.max_depth), (2, Some(2)));
}

#[test]
fn rejects_zero_jobs() {
    let err = ScanConfig::from_args(parse(&["-j", "0"])).unwrap_err();
    assert!(matches!(err, FffError::InvalidThreadCount(0)));
}

#[test]
fn rejects_unknown_type() {
    let err = ScanConfig::from_args(parse(&["-type", "x"])).unwrap_err();
    assert!(matches!(err, FffError::UnknownTypeFilter(_)));
}

#[test]
fn regex_wins_over_name() {
    let config = ScanConfig::from_args(parse(&["-name", "*.md", "-regex", ".*\\.rs"])).unwrap();
    assert_eq!(config.pattern, Some(NamePattern::Regex(".*\\.rs".into())));
}
