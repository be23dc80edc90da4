//! Labeled jump lookup inside a statement.
//!
//! The search is token-typed: a `break`/`continue` keyword token directly
//! followed by an identifier token spelling the label, separated only by
//! whitespace. Strings and comments are separate token kinds and can never
//! match.
//!
//! Scope is textual containment. A jump inside a nested statement that
//! re-declares the same label still counts as a use of the outer label.

use crate::source::offsets::ByteRange;
use crate::source::tokens::TokenKind;
use crate::source::SourceFile;

const JUMP_KEYWORDS: [&str; 2] = ["break", "continue"];

/// True when `statement` contains `break <name>` or `continue <name>`.
pub fn is_label_used(file: &SourceFile, name: &str, statement: ByteRange) -> bool {
    let text = file.contents();
    file.tokens_in(statement).windows(2).any(|pair| {
        let (jump, target) = (&pair[0], &pair[1]);
        if jump.kind != TokenKind::Keyword || target.kind != TokenKind::Identifier {
            return false;
        }
        if target.offset.saturating_add(target.length) > statement.end {
            return false;
        }
        let is_jump = jump
            .text(text)
            .is_some_and(|word| JUMP_KEYWORDS.contains(&word));
        let gap = text.get(jump.offset + jump.length..target.offset);
        let separated = gap.is_some_and(|g| !g.is_empty() && g.chars().all(char::is_whitespace));
        is_jump && separated && target.text(text) == Some(name)
    })
}
