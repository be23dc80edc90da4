//! Leading label detection for one statement node.

use tracing::debug;

use crate::source::offsets::ByteRange;
use crate::source::structure::{NodeKind, StatementNode};
use crate::source::tokens::TokenKind;
use crate::source::SourceFile;

/// A statement's leading label. Only valid for the file it was taken from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LabelCandidate {
    pub name: String,
    /// The identifier alone, without the colon
    pub range: ByteRange,
}

/// Returns the label of `node` if `kind` is a control-flow kind and the
/// first token inside the node is an identifier followed by `:`.
pub fn detect_label(file: &SourceFile, kind: &NodeKind, node: &StatementNode) -> Option<LabelCandidate> {
    if !kind.is_control_flow() {
        return None;
    }
    let Some(range) = node.byte_range() else {
        debug!(kind = kind.as_str(), "statement without offset/length, skipped");
        return None;
    };

    let first = file.tokens_in(range).first()?;
    if first.kind != TokenKind::Identifier {
        return None;
    }
    let name = file.token_text(first)?;
    let label_range = first.byte_range();

    let rest = file.contents().get(label_range.end..)?;
    if !rest.trim_start().starts_with(':') {
        return None;
    }

    Some(LabelCandidate {
        name: name.to_string(),
        range: label_range,
    })
}
