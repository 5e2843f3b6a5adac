use std::fs;
use std::path::Path;
use std::process::{Command, Output};

fn fff(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_fff"))
        .args(args)
        .env_remove("RUST_LOG")
        .output()
        .unwrap()
}

fn stdout_lines(output: &Output) -> Vec<String> {
    String::from_utf8_lossy(&output.stdout)
        .lines()
        .map(str::to_string)
        .collect()
}

fn s(path: &Path) -> &str {
    path.to_str().unwrap()
}

#[test]
fn prints_single_match() {
    let dir = tempfile::tempdir().unwrap();
    let root = dir.path().join("root");
    fs::create_dir_all(root.join("a")).unwrap();
    fs::write(root.join("a").join("x.txt"), "x").unwrap();
    fs::write(root.join("a").join("y.txt"), "y").unwrap();

    let output = fff(&[s(&root), "-type", "file", "-name", "x.txt", "-maxdepth", "5", "-j", "2"]);

    assert_eq!(output.status.code(), Some(0));
    let expected = root.join("a").join("x.txt");
    assert_eq!(stdout_lines(&output), vec![s(&expected).to_string()]);
}

#[test]
fn no_matches_still_succeeds() {
    let dir = tempfile::tempdir().unwrap();
    let output = fff(&[s(dir.path()), "-name", "nothing-here"]);

    assert_eq!(output.status.code(), Some(0));
    assert!(output.stdout.is_empty());
}

#[test]
fn per_item_errors_go_to_stderr() {
    let dir = tempfile::tempdir().unwrap();
    let missing = dir.path().join("missing");
    let output = fff(&[s(&missing), s(dir.path()), "-type", "d", "-maxdepth", "0"]);

    assert_eq!(output.status.code(), Some(0));
    assert_eq!(stdout_lines(&output), vec![s(dir.path()).to_string()]);
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(
        stderr.contains(&format!("{}: no such file or directory", s(&missing))),
        "stderr was: {stderr}"
    );
}

#[test]
fn inverted_depths_exit_non_zero() {
    let dir = tempfile::tempdir().unwrap();
    let output = fff(&[s(dir.path()), "-mindepth", "3", "-maxdepth", "1"]);

    assert_ne!(output.status.code(), Some(0));
    assert!(output.stdout.is_empty(), "no partial scan");
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("max depth (1) is less than min depth (3)"), "stderr was: {stderr}");
}

#[test]
fn zero_threads_exit_non_zero() {
    let dir = tempfile::tempdir().unwrap();
    let output = fff(&[s(dir.path()), "-j", "0"]);
    assert_ne!(output.status.code(), Some(0));
}

#[test]
fn unknown_type_exits_non_zero() {
    let dir = tempfile::tempdir().unwrap();
    let output = fff(&[s(dir.path()), "-type", "pipe"]);
    assert_ne!(output.status.code(), Some(0));
    assert!(String::from_utf8_lossy(&output.stderr).contains("unknown search type \"pipe\""));
}
