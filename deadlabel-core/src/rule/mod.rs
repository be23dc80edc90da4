//! Rule contract and the unused control-flow label rule.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────┐   ┌──────────────┐
//! │  label.rs    │   │  usage.rs    │
//! │  leading     │   │  break/      │
//! │  `name:`     │   │  continue    │
//! └──────┬───────┘   └──────┬───────┘
//!        └────────┬─────────┘
//!                 ▼
//!        ┌──────────────────┐        ┌──────────────────┐
//!        │   collect.rs     │───────▶│  ../correct.rs   │
//!        │  sorted, deduped │        │  one-pass delete │
//!        └────────┬─────────┘        └──────────────────┘
//!                 ▼
//!        ┌──────────────────┐
//!        │ unused_label.rs  │
//!        │ validate/correct │
//!        └──────────────────┘
//! ```

pub mod collect;
pub mod label;
pub mod unused_label;
pub mod usage;

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::source::offsets::Location;
use crate::source::structure::{NodeKind, StatementNode};
use crate::source::SourceFile;

pub use unused_label::UnusedControlFlowLabelRule;

/// Violation severity, taken from configuration.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    #[default]
    Warning,
    Error,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Warning => f.write_str("warning"),
            Severity::Error => f.write_str("error"),
        }
    }
}

impl FromStr for Severity {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "warning" => Ok(Severity::Warning),
            "error" => Ok(Severity::Error),
            other => Err(format!("unknown severity `{}` (expected warning or error)", other)),
        }
    }
}

/// Rule classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RuleKind {
    Lint,
}

/// Identity and example corpora of a rule.
///
/// In examples, `↓` marks the character offset where a violation (or, for
/// correction inputs, a correction) is expected. The marker is not part of
/// the source text.
#[derive(Debug, Clone, Copy)]
pub struct RuleDescription {
    pub identifier: &'static str,
    pub name: &'static str,
    pub description: &'static str,
    pub kind: RuleKind,
    pub non_triggering_examples: &'static [&'static str],
    pub triggering_examples: &'static [&'static str],
    pub corrections: &'static [(&'static str, &'static str)],
}

/// One reported unused label.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Violation {
    pub rule_id: String,
    pub severity: Severity,
    pub location: Location,
    pub reason: String,
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}: {}: {} ({})",
            self.location, self.severity, self.reason, self.rule_id
        )
    }
}

/// One applied edit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Correction {
    pub description: String,
    pub location: Location,
}

/// A rule validated once per structure node by an external walker.
pub trait Rule: Send + Sync {
    fn description(&self) -> &'static RuleDescription;

    fn severity(&self) -> Severity;

    fn validate(&self, file: &SourceFile, kind: &NodeKind, node: &StatementNode) -> Vec<Violation>;
}

/// A rule that can rewrite the file it reports on.
pub trait CorrectableRule: Rule {
    /// Rewrites `file` in memory. Returns the applied corrections; an empty
    /// list means the text was not touched.
    fn correct(&self, file: &mut SourceFile) -> Vec<Correction>;
}
