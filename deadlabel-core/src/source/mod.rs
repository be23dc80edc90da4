//! Source file model: text plus the externally produced structure tree and
//! syntax map.
//!
//! The syntax data is never derived from the text here. It is read from a
//! sidecar JSON file (`File.swift.syntax.json`) written by an external
//! producer such as SourceKitten:
//!
//! ```json
//! { "structure": { "key.substructure": [ ... ] },
//!   "syntaxmap": [ { "type": "...", "offset": 0, "length": 4 } ] }
//! ```

pub mod offsets;
pub mod structure;
pub mod tokens;

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{DeadlabelError, DeadlabelResult, IoResultExt};
use offsets::{ByteRange, Location};
use structure::StatementNode;
use tokens::Token;

/// Suffix appended to a source path to find its syntax sidecar.
pub const SIDECAR_SUFFIX: &str = ".syntax.json";

/// On-disk shape of the sidecar.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SyntaxData {
    pub structure: StatementNode,
    #[serde(rename = "syntaxmap", default)]
    pub syntax_map: Vec<Token>,
}

/// Sidecar path for a source file: `A.swift` -> `A.swift.syntax.json`.
pub fn sidecar_path(source: &Path) -> PathBuf {
    let mut name = source.as_os_str().to_os_string();
    name.push(SIDECAR_SUFFIX);
    PathBuf::from(name)
}

/// One file under analysis. Exclusively owned by one analysis pass.
#[derive(Debug, Clone)]
pub struct SourceFile {
    path: Option<PathBuf>,
    contents: String,
    structure: StatementNode,
    tokens: Vec<Token>,
}

impl SourceFile {
    /// In-memory file from already produced syntax data.
    pub fn new(contents: impl Into<String>, structure: StatementNode, mut tokens: Vec<Token>) -> Self {
        tokens::normalize(&mut tokens);
        Self {
            path: None,
            contents: contents.into(),
            structure,
            tokens,
        }
    }

    pub fn with_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.path = Some(path.into());
        self
    }

    /// Reads `path` and its sidecar.
    pub fn load(path: &Path) -> DeadlabelResult<Self> {
        let contents = fs::read_to_string(path).with_path(path)?;
        let sidecar = sidecar_path(path);
        if !sidecar.exists() {
            return Err(DeadlabelError::syntax(&sidecar, "syntax sidecar not found"));
        }
        let raw = fs::read_to_string(&sidecar).with_path(&sidecar)?;
        Self::from_sidecar_json(path, contents, &raw)
    }

    /// Builds a file from text already in memory and the sidecar's JSON.
    pub fn from_sidecar_json(path: &Path, contents: String, sidecar_json: &str) -> DeadlabelResult<Self> {
        let data: SyntaxData = serde_json::from_str(sidecar_json)
            .map_err(|e| DeadlabelError::syntax(sidecar_path(path), e.to_string()))?;
        Ok(Self::new(contents, data.structure, data.syntax_map).with_path(path))
    }

    /// Writes the text to `path` and the syntax data to its sidecar.
    pub fn save(&self, path: &Path) -> DeadlabelResult<()> {
        let data = SyntaxData {
            structure: self.structure.clone(),
            syntax_map: self.tokens.clone(),
        };
        let json = serde_json::to_string_pretty(&data)
            .map_err(|e| DeadlabelError::syntax(path, e.to_string()))?;
        fs::write(path, &self.contents).with_path(path)?;
        let sidecar = sidecar_path(path);
        fs::write(&sidecar, json).with_path(&sidecar)?;
        Ok(())
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub fn display_path(&self) -> Option<String> {
        self.path.as_ref().map(|p| p.display().to_string())
    }

    pub fn contents(&self) -> &str {
        &self.contents
    }

    pub fn structure(&self) -> &StatementNode {
        &self.structure
    }

    pub fn tokens(&self) -> &[Token] {
        &self.tokens
    }

    pub fn token_text(&self, token: &Token) -> Option<&str> {
        token.text(&self.contents)
    }

    pub fn tokens_in(&self, range: ByteRange) -> &[Token] {
        tokens::tokens_in(&self.tokens, range)
    }

    pub fn first_token_after(&self, offset: usize) -> Option<&Token> {
        tokens::first_token_after(&self.tokens, offset)
    }

    /// Character-based location of a byte offset, tagged with this file's path.
    pub fn location(&self, byte: usize) -> Option<Location> {
        offsets::location_of(&self.contents, byte, self.display_path().as_deref())
    }

    /// Removes `deletions` from the text in one pass and remaps the
    /// structure and syntax map onto the new text.
    ///
    /// `deletions` must be sorted ascending, non-overlapping and aligned to
    /// character boundaries; otherwise nothing is changed.
    pub fn apply_deletions(&mut self, deletions: &[ByteRange]) -> DeadlabelResult<()> {
        if deletions.is_empty() {
            return Ok(());
        }
        let mut cursor = 0usize;
        for d in deletions {
            if d.start < cursor || d.end < d.start {
                return Err(DeadlabelError::missing_structure(format!(
                    "deletion {} overlaps or is unsorted",
                    d
                )));
            }
            if !self.contents.is_char_boundary(d.start) || !self.contents.is_char_boundary(d.end) {
                return Err(DeadlabelError::missing_structure(format!(
                    "deletion {} is not on character boundaries",
                    d
                )));
            }
            cursor = d.end;
        }

        let removed: usize = deletions.iter().map(ByteRange::len).sum();
        let mut out = String::with_capacity(self.contents.len() - removed);
        let mut cursor = 0usize;
        for d in deletions {
            out.push_str(&self.contents[cursor..d.start]);
            cursor = d.end;
        }
        out.push_str(&self.contents[cursor..]);
        self.contents = out;

        self.tokens.retain(|t| !deletions.iter().any(|d| d.contains(t.offset)));
        for token in &mut self.tokens {
            let start = remap_offset(token.offset, deletions);
            let end = remap_offset(token.offset.saturating_add(token.length), deletions);
            token.offset = start;
            token.length = end - start;
        }
        remap_node(&mut self.structure, deletions);
        Ok(())
    }
}

/// Position of `offset` after removing `deletions` (sorted, disjoint).
/// Offsets inside a deleted range collapse to its start.
fn remap_offset(offset: usize, deletions: &[ByteRange]) -> usize {
    let mut shift = 0usize;
    for d in deletions {
        if offset <= d.start {
            break;
        }
        if offset >= d.end {
            shift += d.len();
        } else {
            return d.start - shift;
        }
    }
    offset - shift
}

fn remap_node(node: &mut StatementNode, deletions: &[ByteRange]) {
    if let Some(range) = node.byte_range() {
        let start = remap_offset(range.start, deletions);
        let end = remap_offset(range.end, deletions);
        node.offset = Some(start);
        node.length = Some(end - start);
    }
    for child in &mut node.substructure {
        remap_node(child, deletions);
    }
}
