//! deadlabel CLI - finds and removes unused control-flow labels in Swift sources.
//!
//! Features:
//! - Reads SourceKitten-style syntax sidecars (`File.swift.syntax.json`)
//! - Rayon-powered parallel linting
//! - Incremental caching for faster re-analysis
//! - Plain, JSON and Xcode output
//! - In-place fixing with dry run

use anyhow::Result;
use clap::{ArgAction, Parser};
use std::path::PathBuf;

use deadlabel_core::{
    init_structured_logging, log_event, log_skipped, print_report, AnalysisResult, Deadlabel,
    DeadlabelError, Reporter, Severity,
};

#[derive(Parser, Debug)]
#[command(author, version, about = "Unused control-flow label detector for Swift")]
pub struct Cli {
    /// Directory (or single .swift file) to analyze
    #[arg(default_value = ".")]
    path: String,

    /// Output results in JSON format (same as `--reporter json`)
    #[arg(long, conflicts_with = "reporter")]
    json: bool,

    /// Output format: plain, json or xcode
    #[arg(long)]
    reporter: Option<Reporter>,

    /// Severity of reported violations: warning or error
    #[arg(long)]
    severity: Option<Severity>,

    /// Regex for root-relative paths to skip (repeatable)
    #[arg(long, action = ArgAction::Append)]
    exclude: Vec<String>,

    /// Ignore and do not write `.deadlabel/cache.json`
    #[arg(long)]
    no_cache: bool,

    /// Ignore `deadlabel.toml`
    #[arg(long)]
    no_config: bool,

    /// Remove unused labels in place (sources and sidecars)
    #[arg(long)]
    fix: bool,

    /// Show what would be removed without writing anything
    #[arg(long, conflicts_with = "fix")]
    fix_dry_run: bool,
}

impl Cli {
    fn builder(&self) -> Deadlabel {
        let mut builder = Deadlabel::new(&self.path)
            .exclude_patterns(self.exclude.iter().cloned())
            .with_config(!self.no_config)
            .dry_run(self.fix_dry_run);
        if self.no_cache {
            builder = builder.with_cache(false);
        }
        if let Some(severity) = self.severity {
            builder = builder.with_severity(severity);
        }
        if self.json {
            builder = builder.with_reporter(Reporter::Json);
        } else if let Some(reporter) = self.reporter {
            builder = builder.with_reporter(reporter);
        }
        builder
    }
}

/// Prints files that could not be analyzed to stderr.
fn print_skipped(result: &AnalysisResult) {
    if !result.files_without_sidecar.is_empty() {
        eprintln!(
            "INFO: {} file(s) without a syntax sidecar were skipped.",
            result.files_without_sidecar.len()
        );
    }
    for skipped in &result.skipped {
        log_skipped(&skipped.path, &skipped.reason);
    }
}

fn exit_code(result: &AnalysisResult) -> i32 {
    if result.has_violations() {
        1
    } else {
        0
    }
}

fn run(cli: &Cli) -> Result<i32> {
    let path = PathBuf::from(&cli.path);
    if !path.exists() {
        return Err(DeadlabelError::InvalidArgument {
            message: format!("path does not exist: {}", path.display()),
        }
        .into());
    }

    let builder = cli.builder();
    let result = builder.analyze()?;
    print_skipped(&result);

    if !(cli.fix || cli.fix_dry_run) {
        print_report(result.reporter, &result.violations, result.files_linted);
        return Ok(exit_code(&result));
    }

    let fixed = builder.fix(&result);
    if result.reporter == Reporter::Json {
        println!("{}", serde_json::to_string_pretty(&fixed)?);
    }
    for err in &fixed.errors {
        log_event("ERROR", err);
    }

    if cli.fix_dry_run {
        if result.reporter != Reporter::Json {
            print_report(result.reporter, &result.violations, result.files_linted);
        }
        return Ok(exit_code(&result));
    }

    // What is left after fixing decides the exit code.
    let remaining = builder.analyze()?;
    if remaining.reporter != Reporter::Json {
        print_report(remaining.reporter, &remaining.violations, remaining.files_linted);
    }
    Ok(exit_code(&remaining))
}

fn main() {
    std::panic::set_hook(Box::new(|info| {
        eprintln!("[PANIC] deadlabel internal error: {}", info);
        eprintln!("[PANIC] The process will exit with code 2.");
    }));

    // JSON to stderr, respects RUST_LOG
    init_structured_logging();

    let cli = Cli::parse();
    let code = match run(&cli) {
        Ok(code) => code,
        Err(e) => {
            eprintln!("[ERROR] {:#}", e);
            2
        }
    };
    std::process::exit(code);
}
