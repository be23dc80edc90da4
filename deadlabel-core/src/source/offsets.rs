//! Byte offset <-> character offset bridge.
//!
//! Structure and tokens are measured in UTF-8 bytes. Everything user-facing
//! (violation locations, correction locations) is measured in characters.
//! A byte offset that does not sit on a character boundary has no character
//! counterpart; every conversion here returns `None` for it instead of
//! guessing.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Half-open byte range `[start, end)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ByteRange {
    pub start: usize,
    pub end: usize,
}

impl ByteRange {
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    /// Range from an offset/length pair, `None` on overflow.
    pub fn from_offset_length(offset: usize, length: usize) -> Option<Self> {
        offset.checked_add(length).map(|end| Self { start: offset, end })
    }

    pub fn len(&self) -> usize {
        self.end.saturating_sub(self.start)
    }

    pub fn is_empty(&self) -> bool {
        self.end <= self.start
    }

    pub fn contains(&self, offset: usize) -> bool {
        self.start <= offset && offset < self.end
    }

    pub fn overlaps(&self, other: &ByteRange) -> bool {
        self.start < other.end && other.start < self.end
    }
}

impl fmt::Display for ByteRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}..{}", self.start, self.end)
    }
}

/// Half-open character range `[start, end)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CharRange {
    pub start: usize,
    pub end: usize,
}

impl fmt::Display for CharRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}..{}", self.start, self.end)
    }
}

/// A user-facing position in a file.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Location {
    /// Source file, when the text came from disk
    pub file: Option<String>,
    /// 1-based line
    pub line: usize,
    /// 1-based column, counted in characters
    pub character: usize,
    /// 0-based character offset from the start of the file
    pub offset: usize,
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.file {
            Some(file) => write!(f, "{}:{}:{}", file, self.line, self.character),
            None => write!(f, "<nopath>:{}:{}", self.line, self.character),
        }
    }
}

/// Character offset of `byte` in `text`.
///
/// `byte == text.len()` maps to the character count (end of text).
pub fn byte_to_char(text: &str, byte: usize) -> Option<usize> {
    if !text.is_char_boundary(byte) {
        return None;
    }
    Some(text[..byte].chars().count())
}

/// Character range covering `range`, if both ends are character boundaries.
pub fn byte_range_to_char_range(text: &str, range: ByteRange) -> Option<CharRange> {
    if range.start > range.end {
        return None;
    }
    let start = byte_to_char(text, range.start)?;
    // Count only the slice between the ends instead of rescanning from 0.
    let inner = text.get(range.start..range.end)?;
    Some(CharRange {
        start,
        end: start + inner.chars().count(),
    })
}

/// Substring for `range`, if it is a valid character-aligned slice.
pub fn slice(text: &str, range: ByteRange) -> Option<&str> {
    text.get(range.start..range.end)
}

/// Line/column location of a byte offset.
pub fn location_of(text: &str, byte: usize, file: Option<&str>) -> Option<Location> {
    let offset = byte_to_char(text, byte)?;
    let before = &text[..byte];
    let line = before.matches('\n').count() + 1;
    let line_start = before.rfind('\n').map(|i| i + 1).unwrap_or(0);
    let character = before[line_start..].chars().count() + 1;
    Some(Location {
        file: file.map(str::to_string),
        line,
        character,
        offset,
    })
}
