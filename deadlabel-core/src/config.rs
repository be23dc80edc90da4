//! Configuration loading from deadlabel.toml.

use anyhow::{Context, Result};
use regex::Regex;
use serde::Deserialize;
use std::{fs, path::Path};

use crate::error::DeadlabelError;
use crate::rule::Severity;

pub const CONFIG_FILE: &str = "deadlabel.toml";

/// Main configuration structure for deadlabel.toml.
#[derive(Debug, Deserialize, Default, Clone)]
pub struct DeadlabelConfig {
    /// Severity of reported violations ("warning" or "error").
    pub severity: Option<String>,
    /// Regexes matched against root-relative paths of files to skip.
    pub excluded: Option<Vec<String>>,
    /// Output configuration.
    pub output: Option<OutputConfig>,
}

/// Output format configuration.
#[derive(Debug, Deserialize, Default, Clone)]
pub struct OutputConfig {
    /// Output format: "plain", "json" or "xcode".
    pub format: Option<String>,
    /// Whether to reuse `.deadlabel/cache.json`.
    pub cache: Option<bool>,
}

impl DeadlabelConfig {
    /// Configured severity, defaulting to warning.
    pub fn severity(&self, path: &Path) -> Result<Severity, DeadlabelError> {
        match &self.severity {
            None => Ok(Severity::default()),
            Some(raw) => raw
                .parse()
                .map_err(|e: String| DeadlabelError::config(path, e)),
        }
    }

    /// Compiled exclusion patterns.
    pub fn excluded_patterns(&self, path: &Path) -> Result<Vec<Regex>, DeadlabelError> {
        self.excluded
            .iter()
            .flatten()
            .map(|p| {
                Regex::new(p).map_err(|e| {
                    DeadlabelError::config(path, format!("invalid exclude pattern `{}`: {}", p, e))
                })
            })
            .collect()
    }

    pub fn output_format(&self) -> Option<&str> {
        self.output.as_ref()?.format.as_deref()
    }

    pub fn cache_enabled(&self) -> bool {
        self.output.as_ref().and_then(|o| o.cache).unwrap_or(true)
    }
}

/// Loads configuration from deadlabel.toml if it exists.
pub fn load_config(root: &Path) -> Result<Option<DeadlabelConfig>> {
    let path = root.join(CONFIG_FILE);
    if !path.exists() {
        return Ok(None);
    }

    let content = fs::read_to_string(&path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    let cfg: DeadlabelConfig = toml::from_str(&content).context("Invalid deadlabel.toml")?;

    // Surface bad values at load time rather than mid-run.
    cfg.severity(&path)?;
    cfg.excluded_patterns(&path)?;
    Ok(Some(cfg))
}
