//! Incremental lint cache using SHA-256 for change detection.
//!
//! Performance characteristics:
//! - Parallel file hashing and linting via Rayon
//! - Read-once pattern: source and sidecar read once, then hashed and parsed
//! - O(changed_files) linting work, O(1) cache lookups
//!
//! An entry is keyed by the root-relative source path and holds the hash of
//! the source text, the sidecar text and the rule settings, plus the
//! violations found. Any change to one of the three re-lints the file.
//!
//! # Cache Versioning
//!
//! The cache carries version metadata so it is discarded when:
//! - the cache format changes
//! - the deadlabel major version changes

use anyhow::{Context, Result};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};
use tracing::{debug, info, warn};

use crate::detect::lint_file;
use crate::error::{DeadlabelError, IoResultExt};
use crate::rule::{Rule, Violation};
use crate::scan::relative_path;
use crate::source::{sidecar_path, SourceFile};

/// Directory holding tool state, relative to the analysis root.
pub const CACHE_DIR: &str = ".deadlabel";

/// Maximum cache file size (50MB).
const MAX_CACHE_SIZE_BYTES: usize = 50_000_000;

/// Current cache format version. Increment when the format changes.
const CACHE_VERSION: u32 = 1;

const DEADLABEL_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Cached lint result of one file.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct CachedFile {
    pub hash: String,
    #[serde(default)]
    pub violations: Vec<Violation>,
}

/// Cache metadata for version checking.
#[derive(Debug, Serialize, Deserialize, Clone, Default)]
pub struct CacheMetadata {
    pub cache_version: u32,
    pub deadlabel_version: String,
    /// Seconds since the Unix epoch
    #[serde(default)]
    pub created_at: u64,
}

impl CacheMetadata {
    pub fn current() -> Self {
        let created_at = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or(0);

        Self {
            cache_version: CACHE_VERSION,
            deadlabel_version: DEADLABEL_VERSION.to_string(),
            created_at,
        }
    }

    /// Same format version and same deadlabel major version.
    pub fn is_compatible(&self) -> bool {
        if self.cache_version != CACHE_VERSION {
            return false;
        }
        let current_major = DEADLABEL_VERSION.split('.').next().unwrap_or("0");
        let cached_major = self.deadlabel_version.split('.').next().unwrap_or("0");
        current_major == cached_major
    }
}

/// The full cache model, stored in `.deadlabel/cache.json`.
#[derive(Debug, Serialize, Deserialize, Clone, Default)]
pub struct DeadlabelCache {
    #[serde(default)]
    pub metadata: CacheMetadata,
    /// Root-relative source path to its cached result.
    pub files: HashMap<String, CachedFile>,
}

/// Hash identifying one lint input: source text, sidecar text and the rule
/// settings that influence the output.
pub fn entry_hash(source: &[u8], sidecar: &[u8], settings: &str) -> String {
    let mut sha = Sha256::new();
    for part in [source, sidecar, settings.as_bytes()] {
        // Length prefix keeps ("ab", "c") and ("a", "bc") apart.
        sha.update((part.len() as u64).to_le_bytes());
        sha.update(part);
    }
    format!("{:x}", sha.finalize())
}

fn cache_path(root: &Path) -> PathBuf {
    root.join(CACHE_DIR).join("cache.json")
}

/// Loads `.deadlabel/cache.json`.
///
/// Returns `None` when the file is missing, corrupted, or written by an
/// incompatible version (the stale file is removed).
pub fn load_cache(root: &Path) -> Option<DeadlabelCache> {
    let path = cache_path(root);
    if !path.exists() {
        return None;
    }

    let text = fs::read_to_string(&path).ok()?;
    let cache: DeadlabelCache = match serde_json::from_str(&text) {
        Ok(c) => c,
        Err(e) => {
            let err = DeadlabelError::cache(format!("{}: {}", path.display(), e));
            warn!(error = %err, "corrupted cache, ignoring");
            return None;
        }
    };

    if !cache.metadata.is_compatible() {
        info!(
            cached = %format!("v{} {}", cache.metadata.cache_version, cache.metadata.deadlabel_version),
            current = %format!("v{} {}", CACHE_VERSION, DEADLABEL_VERSION),
            "cache version mismatch, rebuilding"
        );
        let _ = fs::remove_file(&path);
        return None;
    }

    Some(cache)
}

/// Saves the cache with an atomic temp-file + rename write.
///
/// A cache above the size cap is dropped instead of written.
pub fn save_cache(root: &Path, cache: &DeadlabelCache) -> Result<()> {
    let dir = root.join(CACHE_DIR);
    if !dir.exists() {
        fs::create_dir_all(&dir)
            .with_context(|| format!("Failed to create {}", dir.display()))?;
    }

    let path = dir.join("cache.json");
    let json = serde_json::to_string_pretty(cache)?;

    if json.len() > MAX_CACHE_SIZE_BYTES {
        warn!(
            limit_mb = MAX_CACHE_SIZE_BYTES / 1_000_000,
            "cache exceeds size limit, clearing"
        );
        let _ = fs::remove_file(&path);
        return Ok(());
    }

    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_nanos();
    let temp_path = dir.join(format!("cache.json.{}.{}.tmp", std::process::id(), nanos));

    fs::write(&temp_path, &json)
        .with_context(|| format!("Failed to write temp cache file: {}", temp_path.display()))?;

    fs::rename(&temp_path, &path).with_context(|| {
        let _ = fs::remove_file(&temp_path);
        format!("Failed to rename cache file to: {}", path.display())
    })?;

    Ok(())
}

/// A file that could not be linted.
#[derive(Debug, Clone, Serialize)]
pub struct SkippedFile {
    pub path: String,
    pub reason: String,
}

/// Outcome of linting a set of files.
#[derive(Debug, Clone, Default)]
pub struct LintRun {
    /// All violations, ordered by file then position
    pub violations: Vec<Violation>,
    pub files_linted: usize,
    pub cache_hits: usize,
    pub skipped: Vec<SkippedFile>,
}

enum FileLintResult {
    Ok {
        key: String,
        entry: CachedFile,
        cache_hit: bool,
    },
    Skipped(SkippedFile),
}

/// Reads source + sidecar once, answers from the cache on a hash match and
/// lints otherwise.
fn process_file<R: Rule + ?Sized>(
    root: &Path,
    file: &Path,
    rule: &R,
    settings: &str,
    old_cache: Option<&DeadlabelCache>,
) -> FileLintResult {
    let key = relative_path(root, file);
    let skipped = |err: DeadlabelError| {
        warn!(path = %file.display(), error = %err, "skipping file");
        FileLintResult::Skipped(SkippedFile {
            path: file.display().to_string(),
            reason: err.to_string(),
        })
    };

    let contents = match fs::read_to_string(file).with_path(file) {
        Ok(c) => c,
        Err(e) => return skipped(e),
    };
    let sidecar = sidecar_path(file);
    let sidecar_json = match fs::read_to_string(&sidecar).with_path(&sidecar) {
        Ok(s) => s,
        Err(e) => return skipped(e),
    };

    let hash = entry_hash(contents.as_bytes(), sidecar_json.as_bytes(), settings);
    let shown = file.display().to_string();

    if let Some(cached) = old_cache.and_then(|c| c.files.get(&key)) {
        if cached.hash == hash {
            debug!(path = %shown, "cache hit");
            let mut entry = cached.clone();
            for v in &mut entry.violations {
                v.location.file = Some(shown.clone());
            }
            return FileLintResult::Ok {
                key,
                entry,
                cache_hit: true,
            };
        }
    }

    let source = match SourceFile::from_sidecar_json(file, contents, &sidecar_json) {
        Ok(s) => s,
        Err(e) => return skipped(e),
    };
    FileLintResult::Ok {
        key,
        entry: CachedFile {
            hash,
            violations: lint_file(&source, rule),
        },
        cache_hit: false,
    }
}

/// Settings string folded into every entry hash.
fn rule_settings<R: Rule + ?Sized>(rule: &R) -> String {
    format!("{}:{}", rule.description().identifier, rule.severity())
}

/// Lints `files` in parallel, reusing `old_cache` entries whose inputs did
/// not change. When `persist` is set the refreshed cache is saved under
/// `root` (best effort).
///
/// Unreadable or malformed files are reported in [`LintRun::skipped`] and
/// never abort the run.
pub fn lint_files_incremental<R: Rule + ?Sized>(
    root: &Path,
    files: &[PathBuf],
    rule: &R,
    old_cache: Option<DeadlabelCache>,
    persist: bool,
) -> LintRun {
    let settings = rule_settings(rule);
    let results: Vec<FileLintResult> = files
        .par_iter()
        .map(|file| process_file(root, file, rule, &settings, old_cache.as_ref()))
        .collect();

    let mut run = LintRun::default();
    let mut new_cache = DeadlabelCache {
        metadata: CacheMetadata::current(),
        files: HashMap::with_capacity(results.len()),
    };

    for result in results {
        match result {
            FileLintResult::Ok {
                key,
                entry,
                cache_hit,
            } => {
                run.files_linted += 1;
                if cache_hit {
                    run.cache_hits += 1;
                }
                run.violations.extend(entry.violations.iter().cloned());
                new_cache.files.insert(key, entry);
            }
            FileLintResult::Skipped(skipped) => run.skipped.push(skipped),
        }
    }

    if persist {
        if let Err(e) = save_cache(root, &new_cache) {
            warn!(error = %e, "cache save failed");
        }
    }

    run
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rule::{Severity, UnusedControlFlowLabelRule};
    use crate::testing::fixture;

    fn create_temp_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir()
            .join("deadlabel_cache_test")
            .join(format!("{}_{}", name, std::process::id()));
        if dir.exists() {
            fs::remove_dir_all(&dir).ok();
        }
        fs::create_dir_all(&dir).unwrap();
        dir
    }

    fn write_source(dir: &Path, name: &str, text: &str) -> PathBuf {
        let path = dir.join(name);
        fixture(text).save(&path).unwrap();
        path
    }

    #[test]
    fn test_entry_hash_deterministic() {
        let hash1 = entry_hash(b"while true { break }", b"{}", "unused_control_flow_label:warning");
        let hash2 = entry_hash(b"while true { break }", b"{}", "unused_control_flow_label:warning");
        assert_eq!(hash1, hash2);
        assert_eq!(hash1.len(), 64);
    }

    #[test]
    fn test_entry_hash_covers_every_input() {
        let base = entry_hash(b"src", b"side", "rule:warning");
        assert_ne!(base, entry_hash(b"src2", b"side", "rule:warning"));
        assert_ne!(base, entry_hash(b"src", b"side2", "rule:warning"));
        assert_ne!(base, entry_hash(b"src", b"side", "rule:error"));
        assert_ne!(entry_hash(b"ab", b"c", ""), entry_hash(b"a", b"bc", ""));
    }

    #[test]
    fn test_cache_save_load() {
        let dir = create_temp_dir("save_load");
        let mut cache = DeadlabelCache {
            metadata: CacheMetadata::current(),
            files: HashMap::new(),
        };
        cache.files.insert(
            "Sources/a.swift".to_string(),
            CachedFile {
                hash: "abc123".to_string(),
                violations: Vec::new(),
            },
        );

        save_cache(&dir, &cache).unwrap();
        let loaded = load_cache(&dir).unwrap();
        assert_eq!(loaded.files.len(), 1);
        assert_eq!(loaded.files["Sources/a.swift"].hash, "abc123");

        fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_load_cache_not_found() {
        let dir = create_temp_dir("not_found");
        assert!(load_cache(&dir).is_none());
        fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_incompatible_cache_is_discarded() {
        let dir = create_temp_dir("incompatible");
        let cache = DeadlabelCache {
            metadata: CacheMetadata {
                cache_version: CACHE_VERSION + 1,
                deadlabel_version: DEADLABEL_VERSION.to_string(),
                created_at: 0,
            },
            files: HashMap::new(),
        };
        save_cache(&dir, &cache).unwrap();

        assert!(load_cache(&dir).is_none());
        assert!(!cache_path(&dir).exists());

        fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_corrupted_cache_is_ignored() {
        let dir = create_temp_dir("corrupted");
        fs::create_dir_all(dir.join(CACHE_DIR)).unwrap();
        fs::write(cache_path(&dir), "{ not json").unwrap();
        assert!(load_cache(&dir).is_none());
        fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_incremental_lint_fresh_then_cached() {
        let dir = create_temp_dir("incremental");
        let a = write_source(&dir, "a.swift", "loop: while true { break }");
        let b = write_source(&dir, "b.swift", "loop: while true { break loop }");
        let files = vec![a.clone(), b];
        let rule = UnusedControlFlowLabelRule::default();

        let first = lint_files_incremental(&dir, &files, &rule, None, true);
        assert_eq!(first.files_linted, 2);
        assert_eq!(first.cache_hits, 0);
        assert_eq!(first.violations.len(), 1);
        assert_eq!(
            first.violations[0].location.file.as_deref(),
            Some(a.display().to_string().as_str())
        );

        let second = lint_files_incremental(&dir, &files, &rule, load_cache(&dir), true);
        assert_eq!(second.cache_hits, 2);
        assert_eq!(second.violations, first.violations);

        fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_changed_file_is_relinted() {
        let dir = create_temp_dir("changed");
        let a = write_source(&dir, "a.swift", "loop: while true { break }");
        let rule = UnusedControlFlowLabelRule::default();
        lint_files_incremental(&dir, &[a.clone()], &rule, None, true);

        write_source(&dir, "a.swift", "loop: while true { break loop }");
        let run = lint_files_incremental(&dir, &[a], &rule, load_cache(&dir), true);
        assert_eq!(run.cache_hits, 0);
        assert!(run.violations.is_empty());

        fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_severity_change_invalidates_entries() {
        let dir = create_temp_dir("severity");
        let a = write_source(&dir, "a.swift", "loop: while true { break }");
        lint_files_incremental(&dir, &[a.clone()], &UnusedControlFlowLabelRule::default(), None, true);

        let strict = UnusedControlFlowLabelRule::new(Severity::Error);
        let run = lint_files_incremental(&dir, &[a], &strict, load_cache(&dir), true);
        assert_eq!(run.cache_hits, 0);
        assert_eq!(run.violations[0].severity, Severity::Error);

        fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_bad_files_are_skipped() {
        let dir = create_temp_dir("skipped");
        let good = write_source(&dir, "good.swift", "loop: while true { break }");
        let bad = dir.join("bad.swift");
        fs::write(&bad, "while true {}").unwrap();
        fs::write(sidecar_path(&bad), "not json").unwrap();
        let missing = dir.join("missing.swift");

        let run = lint_files_incremental(
            &dir,
            &[good, bad, missing],
            &UnusedControlFlowLabelRule::default(),
            None,
            false,
        );
        assert_eq!(run.files_linted, 1);
        assert_eq!(run.violations.len(), 1);
        assert_eq!(run.skipped.len(), 2);
        assert!(!cache_path(&dir).exists());

        fs::remove_dir_all(&dir).ok();
    }
}
