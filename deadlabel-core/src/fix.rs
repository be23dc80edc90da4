//! On-disk removal of unused labels.
//!
//! Never panics: per-file failures are recorded in [`FixResult::errors`] and
//! the remaining files are still processed.
//!
//! Features:
//! - Dry-run mode that reports without writing
//! - Source text and syntax sidecar rewritten together
//! - Symlinked sources are refused
//!
//! Progress lines go to stderr so stdout stays clean for reports.

use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::{DeadlabelError, DeadlabelResult, IoResultExt};
use crate::rule::{CorrectableRule, Correction};
use crate::source::SourceFile;

/// Result of a fix operation.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FixResult {
    pub dry_run: bool,
    /// Files that were (or in dry-run, would be) rewritten
    pub files_changed: Vec<String>,
    pub corrections: Vec<Correction>,
    pub errors: Vec<String>,
}

impl FixResult {
    fn new(dry_run: bool) -> Self {
        Self {
            dry_run,
            ..Self::default()
        }
    }

    pub fn is_clean(&self) -> bool {
        self.errors.is_empty()
    }
}

/// Applies `rule`'s corrections to the file at `path`.
///
/// Returns the corrections, in applied order. Nothing is written when the
/// list is empty or `dry_run` is set.
pub fn fix_file<R: CorrectableRule + ?Sized>(
    path: &Path,
    rule: &R,
    dry_run: bool,
) -> DeadlabelResult<Vec<Correction>> {
    let metadata = path.symlink_metadata().with_path(path)?;
    if metadata.file_type().is_symlink() {
        return Err(DeadlabelError::fix(format!(
            "refusing to rewrite symlink: {}",
            path.display()
        )));
    }

    let mut file = SourceFile::load(path)?;
    let corrections = rule.correct(&mut file);
    if corrections.is_empty() {
        return Ok(corrections);
    }

    if dry_run {
        eprintln!(
            "[DRY-RUN] Would remove {} label(s) in: {}",
            corrections.len(),
            path.display()
        );
        return Ok(corrections);
    }

    file.save(path)?;
    eprintln!(
        "[FIX] Removed {} label(s) in: {}",
        corrections.len(),
        path.display()
    );
    Ok(corrections)
}

/// Fixes every file in `files`, continuing past individual failures.
pub fn fix_files<R, P>(files: &[P], rule: &R, dry_run: bool) -> FixResult
where
    R: CorrectableRule + ?Sized,
    P: AsRef<Path>,
{
    let mut result = FixResult::new(dry_run);

    for path in files {
        let path = path.as_ref();
        match fix_file(path, rule, dry_run) {
            Ok(corrections) if corrections.is_empty() => {}
            Ok(corrections) => {
                result.files_changed.push(path.display().to_string());
                result.corrections.extend(corrections);
            }
            Err(e) => {
                warn!(path = %path.display(), error = %e, "fix failed");
                result.errors.push(format!("{}: {}", path.display(), e));
            }
        }
    }

    let mode = if dry_run { "DRY-RUN" } else { "FIX" };
    eprintln!(
        "[{}] {} label(s) in {} file(s), {} error(s)",
        mode,
        result.corrections.len(),
        result.files_changed.len(),
        result.errors.len()
    );

    result
}
