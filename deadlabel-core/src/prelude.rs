//! Prelude module for convenient imports.
//!
//! ```rust,ignore
//! use deadlabel_core::prelude::*;
//! ```

// Errors
pub use crate::error::{DeadlabelError, DeadlabelResult};

// Source model
pub use crate::source::offsets::{ByteRange, Location};
pub use crate::source::SourceFile;

// Rule API
pub use crate::rule::{
    CorrectableRule, Correction, Rule, RuleDescription, Severity, UnusedControlFlowLabelRule,
    Violation,
};

// Driving a rule over a file
pub use crate::detect::lint_file;

// File scanning
pub use crate::scan::gather_swift_files;

// Configuration
pub use crate::config::{load_config, DeadlabelConfig};

// Builder API
pub use crate::builder::{AnalysisResult, Deadlabel};

// Reporting
pub use crate::report::Reporter;

// Fix functionality
#[cfg(feature = "fix")]
pub use crate::fix::{fix_file, fix_files, FixResult};
