//! Syntax-map tokens and the token stream accessor.
//!
//! Tokens follow SourceKit syntax-map semantics: identifiers, keywords,
//! literals, comments and attributes are tokens; punctuation (`:`, `{`, `(`)
//! is not. The stream is ordered by offset and tokens never overlap.

use serde::{Deserialize, Serialize};

use super::offsets::{slice, ByteRange};

const SYNTAX_PREFIX: &str = "source.lang.swift.syntaxtype.";

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum TokenKind {
    Keyword,
    Identifier,
    TypeIdentifier,
    String,
    Number,
    Comment,
    Attribute,
    Other(String),
}

impl TokenKind {
    pub fn as_str(&self) -> &str {
        match self {
            TokenKind::Keyword => "source.lang.swift.syntaxtype.keyword",
            TokenKind::Identifier => "source.lang.swift.syntaxtype.identifier",
            TokenKind::TypeIdentifier => "source.lang.swift.syntaxtype.typeidentifier",
            TokenKind::String => "source.lang.swift.syntaxtype.string",
            TokenKind::Number => "source.lang.swift.syntaxtype.number",
            TokenKind::Comment => "source.lang.swift.syntaxtype.comment",
            TokenKind::Attribute => "source.lang.swift.syntaxtype.attribute.builtin",
            TokenKind::Other(raw) => raw,
        }
    }
}

impl From<String> for TokenKind {
    fn from(raw: String) -> Self {
        let Some(short) = raw.strip_prefix(SYNTAX_PREFIX) else {
            return TokenKind::Other(raw);
        };
        match short {
            "keyword" => TokenKind::Keyword,
            "identifier" => TokenKind::Identifier,
            "typeidentifier" => TokenKind::TypeIdentifier,
            "string" => TokenKind::String,
            "number" => TokenKind::Number,
            "comment" => TokenKind::Comment,
            "attribute.builtin" => TokenKind::Attribute,
            _ => TokenKind::Other(raw),
        }
    }
}

impl From<TokenKind> for String {
    fn from(kind: TokenKind) -> Self {
        match kind {
            TokenKind::Other(raw) => raw,
            known => known.as_str().to_string(),
        }
    }
}

/// One syntax-map entry.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Token {
    #[serde(rename = "type")]
    pub kind: TokenKind,
    pub offset: usize,
    pub length: usize,
}

impl Token {
    pub fn new(kind: TokenKind, offset: usize, length: usize) -> Self {
        Self {
            kind,
            offset,
            length,
        }
    }

    pub fn byte_range(&self) -> ByteRange {
        ByteRange::new(self.offset, self.offset.saturating_add(self.length))
    }

    /// Token text, `None` if the range is not a valid slice of `text`.
    pub fn text<'t>(&self, text: &'t str) -> Option<&'t str> {
        slice(text, self.byte_range())
    }
}

/// Tokens whose byte offset lies in `range`, in stream order.
pub fn tokens_in(tokens: &[Token], range: ByteRange) -> &[Token] {
    let lo = tokens.partition_point(|t| t.offset < range.start);
    let hi = tokens.partition_point(|t| t.offset < range.end);
    &tokens[lo..hi.max(lo)]
}

/// First token whose byte offset is strictly greater than `offset`.
pub fn first_token_after(tokens: &[Token], offset: usize) -> Option<&Token> {
    let idx = tokens.partition_point(|t| t.offset <= offset);
    tokens.get(idx)
}

/// Sorts a syntax map by offset, dropping entries that overlap their
/// predecessor. Producers are expected to emit a clean stream already.
pub fn normalize(tokens: &mut Vec<Token>) {
    tokens.sort_by_key(|t| (t.offset, t.length));
    let mut last_end = 0usize;
    let mut first = true;
    tokens.retain(|t| {
        let keep = first || t.offset >= last_end;
        if keep {
            first = false;
            last_end = t.offset.saturating_add(t.length);
        }
        keep
    });
}
