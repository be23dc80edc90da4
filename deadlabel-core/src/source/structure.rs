//! Statement tree in the SourceKitten structure shape.
//!
//! ```json
//! { "key.kind": "source.lang.swift.stmt.while", "key.offset": 0,
//!   "key.length": 26, "key.substructure": [ ... ] }
//! ```
//!
//! The root dictionary of a file carries only `key.substructure`.

use serde::{Deserialize, Serialize};

use super::offsets::ByteRange;

const STMT_PREFIX: &str = "source.lang.swift.stmt.";

/// Syntactic category of a structure node.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum NodeKind {
    If,
    For,
    ForEach,
    While,
    RepeatWhile,
    Switch,
    /// Any other SourceKit kind (declarations, braces, calls, ...)
    Other(String),
}

impl NodeKind {
    /// Kinds that may carry a label targeted by `break`/`continue`.
    pub const CONTROL_FLOW: [NodeKind; 6] = [
        NodeKind::If,
        NodeKind::For,
        NodeKind::ForEach,
        NodeKind::While,
        NodeKind::RepeatWhile,
        NodeKind::Switch,
    ];

    pub fn is_control_flow(&self) -> bool {
        !matches!(self, NodeKind::Other(_))
    }

    pub fn as_str(&self) -> &str {
        match self {
            NodeKind::If => "source.lang.swift.stmt.if",
            NodeKind::For => "source.lang.swift.stmt.for",
            NodeKind::ForEach => "source.lang.swift.stmt.foreach",
            NodeKind::While => "source.lang.swift.stmt.while",
            NodeKind::RepeatWhile => "source.lang.swift.stmt.repeatwhile",
            NodeKind::Switch => "source.lang.swift.stmt.switch",
            NodeKind::Other(raw) => raw,
        }
    }
}

impl From<String> for NodeKind {
    fn from(raw: String) -> Self {
        match raw.strip_prefix(STMT_PREFIX) {
            Some("if") => NodeKind::If,
            Some("for") => NodeKind::For,
            Some("foreach") => NodeKind::ForEach,
            Some("while") => NodeKind::While,
            Some("repeatwhile") => NodeKind::RepeatWhile,
            Some("switch") => NodeKind::Switch,
            _ => NodeKind::Other(raw),
        }
    }
}

impl From<NodeKind> for String {
    fn from(kind: NodeKind) -> Self {
        match kind {
            NodeKind::Other(raw) => raw,
            known => known.as_str().to_string(),
        }
    }
}

/// One node of the structure tree. Children are in source order.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct StatementNode {
    #[serde(rename = "key.kind", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<NodeKind>,
    #[serde(rename = "key.offset", default, skip_serializing_if = "Option::is_none")]
    pub offset: Option<usize>,
    #[serde(rename = "key.length", default, skip_serializing_if = "Option::is_none")]
    pub length: Option<usize>,
    #[serde(rename = "key.substructure", default, skip_serializing_if = "Vec::is_empty")]
    pub substructure: Vec<StatementNode>,
}

impl StatementNode {
    /// A root node holding top-level statements.
    pub fn root(substructure: Vec<StatementNode>) -> Self {
        Self {
            substructure,
            ..Self::default()
        }
    }

    pub fn new(kind: NodeKind, offset: usize, length: usize) -> Self {
        Self {
            kind: Some(kind),
            offset: Some(offset),
            length: Some(length),
            substructure: Vec::new(),
        }
    }

    pub fn with_children(mut self, children: Vec<StatementNode>) -> Self {
        self.substructure = children;
        self
    }

    /// Byte range of the node, `None` when offset or length is missing.
    pub fn byte_range(&self) -> Option<ByteRange> {
        ByteRange::from_offset_length(self.offset?, self.length?)
    }
}
