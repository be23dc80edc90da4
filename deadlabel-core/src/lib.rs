//! deadlabel-core: detection and removal of unused control-flow labels in
//! Swift sources.
//!
//! A label on an `if`, loop or `switch` is unused when no `break` or
//! `continue` inside the labeled statement names it. The syntax tree and the
//! token stream are not derived here; they are read from a SourceKitten-style
//! sidecar (`File.swift.syntax.json`) next to each source file.
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use deadlabel_core::prelude::*;
//!
//! let result = Deadlabel::new("/path/to/project")
//!     .with_cache(true)
//!     .analyze()?;
//!
//! for v in &result.violations {
//!     println!("{}", v);
//! }
//! ```
//!
//! # Module Organization
//!
//! - [`source`]: source text, structure tree, syntax map, offset bridge
//! - [`rule`]: rule traits and `unused_control_flow_label`
//! - [`detect`]: per-node driver running a rule over a file
//! - [`correct`]: in-memory label removal
//! - [`fix`]: on-disk correction with dry run
//! - [`scan`]: parallel file discovery
//! - [`cache`]: incremental lint cache with SHA-256 change detection
//! - [`builder`]: fluent builder API
//! - [`error`]: typed error handling
//!
//! # Cargo Features
//!
//! - `fix` (default): write corrections back to disk
//! - `full`: enable all optional features

pub mod builder;
pub mod cache;
pub mod config;
pub mod correct;
pub mod detect;
pub mod error;
pub mod logging;
pub mod prelude;
pub mod report;
pub mod rule;
pub mod scan;
pub mod source;

#[cfg(feature = "fix")]
pub mod fix;

// ============================================================================
// Explicit Re-exports
// ============================================================================

// Error types
pub use error::{DeadlabelError, DeadlabelResult, IoResultExt};

// Builder API
pub use builder::{AnalysisResult, Deadlabel, Settings};

// Cache
pub use cache::{
    entry_hash, lint_files_incremental, load_cache, save_cache, CacheMetadata,
    CachedFile, DeadlabelCache, LintRun, SkippedFile,
};

// Configuration
pub use config::{load_config, DeadlabelConfig, OutputConfig, CONFIG_FILE};

// Correction
pub use correct::{correct_ranges, removal_range};

// Detection
pub use detect::lint_file;

// Logging
pub use logging::{init_structured_logging, log_event, log_skipped};

// Reporting
pub use report::{
    format_json, format_plain, format_xcode, print_json, print_plain, print_report, print_xcode,
    Reporter,
};

// Rules
pub use rule::{
    CorrectableRule, Correction, Rule, RuleDescription, RuleKind, Severity,
    UnusedControlFlowLabelRule, Violation,
};

// File scanning
pub use scan::{gather_swift_files, partition_by_sidecar, relative_path};

// Source model
pub use source::offsets::{ByteRange, CharRange, Location};
pub use source::structure::{NodeKind, StatementNode};
pub use source::tokens::{Token, TokenKind};
pub use source::{sidecar_path, SourceFile, SyntaxData};

#[cfg(feature = "fix")]
pub use fix::{fix_file, fix_files, FixResult};

#[cfg(test)]
mod testing;
