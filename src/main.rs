//! fff - Find my file or folder
//!
//! Entry point for the CLI application.

use std::process::ExitCode;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use fff::config::{normalize_args, CliArgs, ScanConfig};
use fff::StdoutSink;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

/// Exit status after Ctrl-C, as a shell would report it.
const EXIT_INTERRUPTED: u8 = 130;

fn main() -> ExitCode {
    match run() {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

fn run() -> Result<ExitCode> {
    // Parse CLI arguments, accepting find-style `-name` flags
    let args = CliArgs::parse_from(normalize_args(std::env::args_os()));

    setup_logging(args.verbose);

    // Validate before anything is dispatched
    let config = ScanConfig::from_args(args).context("Invalid configuration")?;

    // Ctrl-C stops admitting new places; running ones finish
    let shutdown = Arc::new(AtomicBool::new(false));
    let flag = Arc::clone(&shutdown);
    ctrlc::set_handler(move || {
        eprintln!("\nInterrupt received, shutting down...");
        flag.store(true, Ordering::SeqCst);
    })
    .context("Failed to set signal handler")?;

    let results = config
        .to_builder()
        .sink(StdoutSink)
        .shutdown_flag(shutdown)
        .run()
        .context("Search failed")?;

    debug!(
        matches = results.matches,
        files = results.stats.files,
        dirs = results.stats.dirs,
        errors = results.stats.errors,
        peak_workers = results.dispatch.peak_active,
        elapsed_ms = results.stats.duration.as_millis() as u64,
        "search complete"
    );

    if !results.completed {
        info!("Search was interrupted before completion");
        return Ok(ExitCode::from(EXIT_INTERRUPTED));
    }

    Ok(ExitCode::SUCCESS)
}

fn setup_logging(verbose: bool) {
    let default = if verbose { "fff=debug" } else { "fff=warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    // Standard output carries results, so logs go to standard error
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}
