//! Parallel, deterministic discovery of Swift sources with early directory pruning.
//!
//! Performance optimizations:
//! - Early directory pruning via `WalkDir::filter_entry` (O(1) subtree skip)
//! - Parallel file processing via Rayon's `par_bridge`
//!
//! Only files that have a syntax sidecar next to them can be analyzed;
//! [`partition_by_sidecar`] separates the rest.

use anyhow::{Context, Result};
use rayon::prelude::*;
use regex::Regex;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use tracing::warn;
use walkdir::WalkDir;

use crate::source::sidecar_path;

/// Extension of analyzable sources.
pub const SOURCE_EXTENSION: &str = "swift";

/// Directories never descended into (build output, VCS, tool state).
const EXCLUDED_DIRS: &[&str] = &[".git", ".build", ".deadlabel", "DerivedData", "node_modules"];

#[inline]
fn is_excluded_dir(entry: &walkdir::DirEntry, excludes: &HashSet<&str>) -> bool {
    entry.depth() > 0
        && entry.file_type().is_dir()
        && entry
            .file_name()
            .to_str()
            .is_some_and(|name| excludes.contains(name))
}

#[inline]
fn is_source(path: &Path) -> bool {
    path.is_file() && path.extension().is_some_and(|ext| ext == SOURCE_EXTENSION)
}

/// Path of `path` relative to `root`, with `/` separators.
///
/// When `root` is the file itself, its file name is returned.
pub fn relative_path(root: &Path, path: &Path) -> String {
    let rel = path.strip_prefix(root).unwrap_or(path);
    let rel = if rel.as_os_str().is_empty() {
        path.file_name().map(Path::new).unwrap_or(path)
    } else {
        rel
    };
    rel.to_string_lossy().replace('\\', "/")
}

/// Gathers all `.swift` files under `root` whose root-relative path matches
/// none of `excludes`, sorted by path.
///
/// `root` may also be a single file.
pub fn gather_swift_files(root: &Path, excludes: &[Regex]) -> Result<Vec<PathBuf>> {
    let dirs: HashSet<&str> = EXCLUDED_DIRS.iter().copied().collect();

    let mut files = WalkDir::new(root)
        .into_iter()
        .filter_entry(|e| !is_excluded_dir(e, &dirs))
        .par_bridge()
        .filter_map(|entry| match entry {
            Ok(e) => {
                let path = e.path();
                if !is_source(path) {
                    return None;
                }
                let rel = relative_path(root, path);
                if excludes.iter().any(|re| re.is_match(&rel)) {
                    return None;
                }
                Some(Ok(path.to_path_buf()))
            }
            Err(e) => Some(Err(e.into())),
        })
        .collect::<Result<Vec<_>>>()
        .with_context(|| format!("Failed to gather .swift files from {}", root.display()))?;

    files.sort();
    Ok(files)
}

/// Splits `files` into those with a syntax sidecar and those without.
/// Files without one are logged and returned separately.
pub fn partition_by_sidecar(files: Vec<PathBuf>) -> (Vec<PathBuf>, Vec<PathBuf>) {
    let (with, without): (Vec<_>, Vec<_>) = files
        .into_par_iter()
        .partition(|f| sidecar_path(f).is_file());

    for file in &without {
        warn!(path = %file.display(), "no syntax sidecar, skipping");
    }
    (with, without)
}
