//! Output formatting: plain text, JSON and Xcode-style lines.

use std::fmt;
use std::str::FromStr;

use chrono::Utc;
use serde_json::json;

use crate::rule::Violation;

/// Output format selected by `--reporter` or `[output] format`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Reporter {
    #[default]
    Plain,
    Json,
    /// `file:line:col: warning: reason (rule_id)`, understood by Xcode
    Xcode,
}

impl FromStr for Reporter {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "plain" | "text" => Ok(Self::Plain),
            "json" => Ok(Self::Json),
            "xcode" => Ok(Self::Xcode),
            other => Err(format!(
                "unknown reporter `{}` (expected plain, json or xcode)",
                other
            )),
        }
    }
}

impl fmt::Display for Reporter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Plain => "plain",
            Self::Json => "json",
            Self::Xcode => "xcode",
        })
    }
}

pub fn format_plain(violations: &[Violation]) -> String {
    if violations.is_empty() {
        return "No unused control flow labels found.\n".to_string();
    }
    let mut out = format!("UNUSED LABELS ({}):\n", violations.len());
    for v in violations {
        out.push_str(&format!("- {}: {}\n", v.location, v.reason));
    }
    out
}

pub fn format_xcode(violations: &[Violation]) -> String {
    violations.iter().map(|v| format!("{}\n", v)).collect()
}

pub fn format_json(violations: &[Violation], files_linted: usize) -> String {
    let doc = json!({
        "generated_at": Utc::now().to_rfc3339(),
        "files_linted": files_linted,
        "count": violations.len(),
        "violations": violations,
    });
    match serde_json::to_string_pretty(&doc) {
        Ok(json) => json,
        Err(e) => {
            tracing::warn!(error = %e, "JSON serialization failed");
            format!("{{\"count\": {}}}", violations.len())
        }
    }
}

/// Prints violations in plain text format.
pub fn print_plain(violations: &[Violation]) {
    print!("{}", format_plain(violations));
}

/// Prints violations as a JSON document.
pub fn print_json(violations: &[Violation], files_linted: usize) {
    println!("{}", format_json(violations, files_linted));
}

/// Prints violations as Xcode-compatible diagnostics, one per line.
pub fn print_xcode(violations: &[Violation]) {
    print!("{}", format_xcode(violations));
}

pub fn print_report(reporter: Reporter, violations: &[Violation], files_linted: usize) {
    match reporter {
        Reporter::Plain => print_plain(violations),
        Reporter::Json => print_json(violations, files_linted),
        Reporter::Xcode => print_xcode(violations),
    }
}
