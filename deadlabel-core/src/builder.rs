//! Builder pattern API for deadlabel analysis.
//!
//! Provides a fluent interface for configuring and running the lint:
//!
//! ```rust,ignore
//! use deadlabel_core::prelude::*;
//!
//! let result = Deadlabel::new("/path/to/project")
//!     .with_cache(true)
//!     .with_severity(Severity::Error)
//!     .exclude_patterns(["^Pods/"])
//!     .analyze()?;
//!
//! for v in &result.violations {
//!     println!("{}", v);
//! }
//! ```
//!
//! Settings left unset on the builder fall back to `deadlabel.toml` in the
//! analysis root, then to the defaults.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context, Result};
use regex::Regex;
use tracing::info;

use crate::cache::{self, SkippedFile};
use crate::config::{load_config, DeadlabelConfig, CONFIG_FILE};
use crate::report::Reporter;
use crate::rule::{Severity, UnusedControlFlowLabelRule, Violation};
use crate::scan::{gather_swift_files, partition_by_sidecar};

/// Builder for configuring an analysis run.
#[derive(Debug, Clone)]
pub struct Deadlabel {
    /// Directory (or single file) to analyze
    root: PathBuf,

    /// Incremental caching; `None` defers to the config file
    use_cache: Option<bool>,

    severity: Option<Severity>,

    reporter: Option<Reporter>,

    /// Extra exclusion regexes, added to the configured ones
    excluded: Vec<String>,

    /// Whether to read `deadlabel.toml`
    use_config: bool,

    /// Dry-run mode for [`Deadlabel::fix`]
    dry_run: bool,
}

impl Deadlabel {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            use_cache: None,
            severity: None,
            reporter: None,
            excluded: Vec::new(),
            use_config: true,
            dry_run: false,
        }
    }

    /// Enable or disable incremental caching.
    pub fn with_cache(mut self, enabled: bool) -> Self {
        self.use_cache = Some(enabled);
        self
    }

    pub fn with_severity(mut self, severity: Severity) -> Self {
        self.severity = Some(severity);
        self
    }

    pub fn with_reporter(mut self, reporter: Reporter) -> Self {
        self.reporter = Some(reporter);
        self
    }

    /// Add regexes matched against root-relative paths of files to skip.
    pub fn exclude_patterns(mut self, patterns: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.excluded.extend(patterns.into_iter().map(Into::into));
        self
    }

    /// Read (or ignore) `deadlabel.toml`.
    pub fn with_config(mut self, enabled: bool) -> Self {
        self.use_config = enabled;
        self
    }

    /// Enable dry-run mode (no file modifications).
    pub fn dry_run(mut self, enabled: bool) -> Self {
        self.dry_run = enabled;
        self
    }

    /// Directory holding `deadlabel.toml` and `.deadlabel/`.
    pub fn base_dir(&self) -> &Path {
        if self.root.is_file() {
            self.root.parent().unwrap_or(Path::new("."))
        } else {
            &self.root
        }
    }

    /// Builder settings merged over the config file.
    pub fn resolve(&self) -> Result<Settings> {
        let base = self.base_dir();
        let config = if self.use_config {
            load_config(base)?.unwrap_or_default()
        } else {
            DeadlabelConfig::default()
        };
        let config_path = base.join(CONFIG_FILE);

        let severity = match self.severity {
            Some(s) => s,
            None => config.severity(&config_path)?,
        };
        let reporter = match (self.reporter, config.output_format()) {
            (Some(r), _) => r,
            (None, Some(raw)) => raw
                .parse()
                .map_err(|e: String| anyhow!("{}: {}", config_path.display(), e))?,
            (None, None) => Reporter::default(),
        };

        let mut excluded = config.excluded_patterns(&config_path)?;
        for pattern in &self.excluded {
            excluded.push(
                Regex::new(pattern)
                    .with_context(|| format!("invalid exclude pattern `{}`", pattern))?,
            );
        }

        Ok(Settings {
            severity,
            reporter,
            use_cache: self.use_cache.unwrap_or_else(|| config.cache_enabled()),
            excluded,
        })
    }

    /// Run the analysis and return results.
    pub fn analyze(&self) -> Result<AnalysisResult> {
        let settings = self.resolve()?;
        let base = self.base_dir().to_path_buf();

        // 1. Gather sources, keep those with syntax data
        let files = gather_swift_files(&self.root, &settings.excluded)
            .context("Failed to gather .swift files")?;
        let files_scanned = files.len();
        let (files, files_without_sidecar) = partition_by_sidecar(files);

        // 2. Lint, reusing cached results where inputs are unchanged
        let old_cache = if settings.use_cache {
            cache::load_cache(&base)
        } else {
            None
        };
        let rule = UnusedControlFlowLabelRule::new(settings.severity);
        let run = cache::lint_files_incremental(&base, &files, &rule, old_cache, settings.use_cache);

        info!(
            files = run.files_linted,
            cache_hits = run.cache_hits,
            violations = run.violations.len(),
            "analysis finished"
        );

        Ok(AnalysisResult {
            root: self.root.clone(),
            severity: settings.severity,
            reporter: settings.reporter,
            files_scanned,
            files_linted: run.files_linted,
            cache_hits: run.cache_hits,
            files,
            files_without_sidecar,
            skipped: run.skipped,
            violations: run.violations,
        })
    }

    /// Remove the unused labels found by `result` from disk.
    #[cfg(feature = "fix")]
    pub fn fix(&self, result: &AnalysisResult) -> crate::fix::FixResult {
        let rule = UnusedControlFlowLabelRule::new(result.severity);
        crate::fix::fix_files(&result.files_with_violations(), &rule, self.dry_run)
    }
}

/// Effective settings of one run.
#[derive(Debug, Clone)]
pub struct Settings {
    pub severity: Severity,
    pub reporter: Reporter,
    pub use_cache: bool,
    pub excluded: Vec<Regex>,
}

/// Result of an analysis run.
#[derive(Debug, Clone)]
pub struct AnalysisResult {
    pub root: PathBuf,

    pub severity: Severity,

    /// Output format chosen by the builder or the config file
    pub reporter: Reporter,

    /// Sources found after exclusions
    pub files_scanned: usize,

    pub files_linted: usize,

    pub cache_hits: usize,

    /// Sources that have a syntax sidecar
    pub files: Vec<PathBuf>,

    pub files_without_sidecar: Vec<PathBuf>,

    /// Files that could not be read or parsed
    pub skipped: Vec<SkippedFile>,

    /// Violations ordered by file, then position
    pub violations: Vec<Violation>,
}

impl AnalysisResult {
    pub fn has_violations(&self) -> bool {
        !self.violations.is_empty()
    }

    pub fn violation_count(&self) -> usize {
        self.violations.len()
    }

    /// Analyzed files with at least one violation.
    pub fn files_with_violations(&self) -> Vec<PathBuf> {
        let flagged: HashSet<&str> = self
            .violations
            .iter()
            .filter_map(|v| v.location.file.as_deref())
            .collect();
        self.files
            .iter()
            .filter(|f| flagged.contains(f.display().to_string().as_str()))
            .cloned()
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::fixture;
    use std::fs;
    use std::sync::atomic::{AtomicU64, Ordering};

    static TEST_COUNTER: AtomicU64 = AtomicU64::new(0);

    fn create_test_project(name: &str) -> PathBuf {
        let id = TEST_COUNTER.fetch_add(1, Ordering::SeqCst);
        let dir = std::env::temp_dir()
            .join("deadlabel_builder_test")
            .join(format!("{}_{}_{}", name, std::process::id(), id));
        if dir.exists() {
            fs::remove_dir_all(&dir).ok();
        }
        fs::create_dir_all(dir.join("Sources")).unwrap();
        fs::create_dir_all(dir.join("Pods")).unwrap();

        fixture("loop: while true { break }")
            .save(&dir.join("Sources/unused.swift"))
            .unwrap();
        fixture("loop: while true { break loop }")
            .save(&dir.join("Sources/used.swift"))
            .unwrap();
        fixture("outer: for x in xs { break }")
            .save(&dir.join("Pods/vendored.swift"))
            .unwrap();
        fs::write(dir.join("Sources/plain.swift"), "print(1)").unwrap();
        dir
    }

    #[test]
    fn test_builder_basic() {
        let dir = create_test_project("basic");
        let result = Deadlabel::new(&dir).with_cache(false).analyze().unwrap();

        assert_eq!(result.files_scanned, 4);
        assert_eq!(result.files_linted, 3);
        assert_eq!(result.files_without_sidecar.len(), 1);
        assert_eq!(result.violation_count(), 2);
        assert!(result.has_violations());
        assert_eq!(result.severity, Severity::Warning);
        assert_eq!(result.reporter, Reporter::Plain);
        assert!(!dir.join(".deadlabel").exists());

        fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_builder_exclude_patterns() {
        let dir = create_test_project("exclude");
        let result = Deadlabel::new(&dir)
            .with_cache(false)
            .exclude_patterns(["^Pods/"])
            .analyze()
            .unwrap();

        assert_eq!(result.violation_count(), 1);
        let files = result.files_with_violations();
        assert_eq!(files.len(), 1);
        assert!(files[0].ends_with("Sources/unused.swift"));

        fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_config_file_and_overrides() {
        let dir = create_test_project("config");
        fs::write(
            dir.join(CONFIG_FILE),
            "severity = \"error\"\nexcluded = [\"^Pods/\"]\n[output]\nformat = \"xcode\"\ncache = false\n",
        )
        .unwrap();

        let result = Deadlabel::new(&dir).analyze().unwrap();
        assert_eq!(result.severity, Severity::Error);
        assert_eq!(result.reporter, Reporter::Xcode);
        assert_eq!(result.violation_count(), 1);
        assert!(!dir.join(".deadlabel").exists());

        let result = Deadlabel::new(&dir)
            .with_severity(Severity::Warning)
            .with_reporter(Reporter::Json)
            .analyze()
            .unwrap();
        assert_eq!(result.severity, Severity::Warning);
        assert_eq!(result.reporter, Reporter::Json);

        let result = Deadlabel::new(&dir).with_config(false).with_cache(false).analyze().unwrap();
        assert_eq!(result.violation_count(), 2);

        fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_bad_config_format_is_error() {
        let dir = create_test_project("bad_format");
        fs::write(dir.join(CONFIG_FILE), "[output]\nformat = \"html\"\n").unwrap();
        assert!(Deadlabel::new(&dir).analyze().is_err());
        fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_bad_exclude_is_error() {
        let dir = create_test_project("bad_exclude");
        assert!(Deadlabel::new(&dir)
            .with_cache(false)
            .exclude_patterns(["("])
            .analyze()
            .is_err());
        fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_cache_is_written_and_reused() {
        let dir = create_test_project("cache");
        let first = Deadlabel::new(&dir).analyze().unwrap();
        assert_eq!(first.cache_hits, 0);
        assert!(dir.join(".deadlabel/cache.json").exists());

        let second = Deadlabel::new(&dir).analyze().unwrap();
        assert_eq!(second.cache_hits, 3);
        assert_eq!(second.violations, first.violations);

        fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_single_file_root() {
        let dir = create_test_project("single");
        let file = dir.join("Sources/unused.swift");
        let builder = Deadlabel::new(&file).with_cache(false);
        assert_eq!(builder.base_dir(), dir.join("Sources"));

        let result = builder.analyze().unwrap();
        assert_eq!(result.files_linted, 1);
        assert_eq!(result.violation_count(), 1);

        fs::remove_dir_all(&dir).ok();
    }

    #[cfg(feature = "fix")]
    #[test]
    fn test_fix_then_reanalyze() {
        let dir = create_test_project("fix");
        let builder = Deadlabel::new(&dir).with_cache(false);
        let result = builder.analyze().unwrap();

        let fixed = builder.fix(&result);
        assert!(fixed.is_clean());
        assert_eq!(fixed.files_changed.len(), 2);
        assert_eq!(
            fs::read_to_string(dir.join("Sources/unused.swift")).unwrap(),
            "while true { break }"
        );

        assert!(!builder.analyze().unwrap().has_violations());
        fs::remove_dir_all(&dir).ok();
    }

    #[cfg(feature = "fix")]
    #[test]
    fn test_fix_dry_run() {
        let dir = create_test_project("fix_dry");
        let builder = Deadlabel::new(&dir).with_cache(false).dry_run(true);
        let result = builder.analyze().unwrap();

        let fixed = builder.fix(&result);
        assert!(fixed.dry_run);
        assert_eq!(fixed.corrections.len(), 2);
        assert_eq!(builder.analyze().unwrap().violation_count(), 2);

        fs::remove_dir_all(&dir).ok();
    }
}
