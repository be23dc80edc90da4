//! Test support: a tiny structure/syntax-map producer for Swift snippets and
//! the example-corpus verifier.
//!
//! The producer only understands what the rule tests need: labels, the
//! control-flow keywords, brace blocks, `else` chains and the trailing
//! `while` of `repeat`. It stands in for SourceKitten in tests.

use crate::detect::lint_file;
use crate::rule::CorrectableRule;
use crate::source::structure::{NodeKind, StatementNode};
use crate::source::tokens::{Token, TokenKind};
use crate::source::SourceFile;

/// Marker used in rule examples for an expected violation/correction.
pub const MARKER: char = '↓';

const KEYWORDS: &[&str] = &[
    "break", "case", "catch", "class", "continue", "default", "do", "else", "enum", "fallthrough",
    "false", "for", "func", "guard", "if", "import", "in", "let", "nil", "repeat", "return",
    "self", "struct", "switch", "throw", "true", "try", "var", "where", "while",
];

#[derive(Debug, Clone, PartialEq)]
enum Lexeme {
    Token(Token),
    Punct(char, usize),
}

impl Lexeme {
    fn start(&self) -> usize {
        match self {
            Lexeme::Token(t) => t.offset,
            Lexeme::Punct(_, at) => *at,
        }
    }

    fn end(&self) -> usize {
        match self {
            Lexeme::Token(t) => t.offset + t.length,
            Lexeme::Punct(c, at) => at + c.len_utf8(),
        }
    }
}

fn is_ident_char(c: char) -> bool {
    c == '_' || c.is_alphanumeric()
}

fn scan_while(s: &str, f: impl Fn(char) -> bool) -> usize {
    s.char_indices()
        .find(|&(_, c)| !f(c))
        .map(|(i, _)| i)
        .unwrap_or(s.len())
}

fn string_len(rest: &str) -> usize {
    let mut escaped = false;
    for (i, c) in rest.char_indices().skip(1) {
        if escaped {
            escaped = false;
            continue;
        }
        match c {
            '\\' => escaped = true,
            '"' => return i + 1,
            '\n' => return i,
            _ => {}
        }
    }
    rest.len()
}

fn lex(text: &str) -> Vec<Lexeme> {
    let mut out = Vec::new();
    let mut pos = 0;
    while let Some(c) = text[pos..].chars().next() {
        let rest = &text[pos..];
        if c.is_whitespace() {
            pos += c.len_utf8();
            continue;
        }
        let (len, kind) = if rest.starts_with("//") {
            (rest.find('\n').unwrap_or(rest.len()), Some(TokenKind::Comment))
        } else if rest.starts_with("/*") {
            (
                rest.find("*/").map(|n| n + 2).unwrap_or(rest.len()),
                Some(TokenKind::Comment),
            )
        } else if c == '"' {
            (string_len(rest), Some(TokenKind::String))
        } else if c.is_ascii_digit() {
            let n = scan_while(rest, |ch| ch.is_ascii_alphanumeric() || ch == '_' || ch == '.');
            (n, Some(TokenKind::Number))
        } else if c == '_' || c.is_alphabetic() {
            let n = scan_while(rest, is_ident_char);
            let kind = if KEYWORDS.contains(&&rest[..n]) {
                TokenKind::Keyword
            } else {
                TokenKind::Identifier
            };
            (n, Some(kind))
        } else if c == '@' {
            (1 + scan_while(&rest[1..], is_ident_char), Some(TokenKind::Attribute))
        } else {
            (c.len_utf8(), None)
        };
        out.push(match kind {
            Some(kind) => Lexeme::Token(Token::new(kind, pos, len)),
            None => Lexeme::Punct(c, pos),
        });
        pos += len;
    }
    out
}

struct StructureBuilder<'a> {
    text: &'a str,
    lexemes: Vec<Lexeme>,
    pos: usize,
}

impl<'a> StructureBuilder<'a> {
    fn peek_at(&self, i: usize) -> Option<&Lexeme> {
        self.lexemes.get(i)
    }

    fn keyword_at(&self, i: usize) -> Option<&'a str> {
        match self.peek_at(i)? {
            Lexeme::Token(t) if t.kind == TokenKind::Keyword => t.text(self.text),
            _ => None,
        }
    }

    fn is_punct(&self, i: usize, c: char) -> bool {
        matches!(self.peek_at(i), Some(Lexeme::Punct(p, _)) if *p == c)
    }

    fn control_kind(word: &str) -> Option<NodeKind> {
        match word {
            "if" => Some(NodeKind::If),
            "for" => Some(NodeKind::ForEach),
            "while" => Some(NodeKind::While),
            "repeat" => Some(NodeKind::RepeatWhile),
            "switch" => Some(NodeKind::Switch),
            _ => None,
        }
    }

    /// Consumes `}` if present and returns where the block ends.
    fn close_block(&mut self) -> usize {
        if self.is_punct(self.pos, '}') {
            let end = self.lexemes[self.pos].end();
            self.pos += 1;
            end
        } else {
            self.text.len()
        }
    }

    fn block(&mut self, nested: bool) -> Vec<StatementNode> {
        let mut nodes = Vec::new();
        while let Some(lexeme) = self.peek_at(self.pos) {
            match lexeme {
                Lexeme::Punct('}', _) if nested => break,
                Lexeme::Punct('{', at) => {
                    let start = *at;
                    self.pos += 1;
                    let children = self.block(true);
                    let end = self.close_block();
                    nodes.push(
                        StatementNode::new(
                            NodeKind::Other("source.lang.swift.stmt.brace".into()),
                            start,
                            end - start,
                        )
                        .with_children(children),
                    );
                }
                _ => match self.statement() {
                    Some(node) => nodes.push(node),
                    None => self.pos += 1,
                },
            }
        }
        nodes
    }

    fn statement(&mut self) -> Option<StatementNode> {
        let labeled = matches!(
            self.peek_at(self.pos),
            Some(Lexeme::Token(t)) if t.kind == TokenKind::Identifier
        ) && self.is_punct(self.pos + 1, ':')
            && self
                .keyword_at(self.pos + 2)
                .and_then(Self::control_kind)
                .is_some();
        let keyword_idx = if labeled { self.pos + 2 } else { self.pos };
        let kind = self.keyword_at(keyword_idx).and_then(Self::control_kind)?;
        let start = self.lexemes[self.pos].start();
        let mut end = self.lexemes[keyword_idx].end();
        self.pos = keyword_idx + 1;

        let mut depth = 0i32;
        while let Some(lexeme) = self.peek_at(self.pos) {
            match lexeme {
                Lexeme::Punct('(', _) | Lexeme::Punct('[', _) => depth += 1,
                Lexeme::Punct(')', _) | Lexeme::Punct(']', _) => depth -= 1,
                Lexeme::Punct('{', _) if depth <= 0 => break,
                _ => {}
            }
            end = lexeme.end();
            self.pos += 1;
        }
        let mut children = Vec::new();
        if self.is_punct(self.pos, '{') {
            self.pos += 1;
            children = self.block(true);
            end = self.close_block();
        }

        match kind {
            NodeKind::If => {
                if self.keyword_at(self.pos) == Some("else") {
                    self.pos += 1;
                    if self.is_punct(self.pos, '{') {
                        self.pos += 1;
                        children.extend(self.block(true));
                        end = self.close_block();
                    } else if let Some(chained) = self.statement() {
                        end = chained.offset.unwrap_or(end) + chained.length.unwrap_or(0);
                        children.push(chained);
                    }
                }
            }
            NodeKind::RepeatWhile => {
                if let Some(at) = self
                    .keyword_at(self.pos)
                    .filter(|w| *w == "while")
                    .map(|_| self.lexemes[self.pos].start())
                {
                    let line_end = self.text[at..]
                        .find('\n')
                        .map(|n| at + n)
                        .unwrap_or(self.text.len());
                    while let Some(lexeme) = self.peek_at(self.pos) {
                        if lexeme.start() >= line_end || matches!(lexeme, Lexeme::Punct('}', _)) {
                            break;
                        }
                        end = lexeme.end();
                        self.pos += 1;
                    }
                }
            }
            _ => {}
        }

        Some(StatementNode::new(kind, start, end - start).with_children(children))
    }
}

/// Builds a `SourceFile` with structure and syntax map for a Swift snippet.
pub fn fixture(text: &str) -> SourceFile {
    let lexemes = lex(text);
    let tokens: Vec<Token> = lexemes
        .iter()
        .filter_map(|l| match l {
            Lexeme::Token(t) => Some(t.clone()),
            Lexeme::Punct(..) => None,
        })
        .collect();
    let mut builder = StructureBuilder {
        text,
        lexemes,
        pos: 0,
    };
    let root = StatementNode::root(builder.block(false));
    SourceFile::new(text, root, tokens)
}

/// Removes `↓` markers, returning the clean text and the character offsets
/// the markers pointed at.
pub fn strip_markers(example: &str) -> (String, Vec<usize>) {
    let mut text = String::with_capacity(example.len());
    let mut markers = Vec::new();
    let mut chars = 0usize;
    for c in example.chars() {
        if c == MARKER {
            markers.push(chars);
        } else {
            text.push(c);
            chars += 1;
        }
    }
    (text, markers)
}

/// Runs every example corpus of `rule`'s description.
pub fn verify_examples<R: CorrectableRule>(rule: &R) {
    let description = rule.description();

    for example in description.non_triggering_examples {
        let mut file = fixture(example);
        let violations = lint_file(&file, rule);
        assert!(
            violations.is_empty(),
            "non-triggering example reported {:?}:\n{}",
            violations,
            example
        );
        assert!(rule.correct(&mut file).is_empty(), "corrected:\n{}", example);
        assert_eq!(file.contents(), *example);
    }

    for example in description.triggering_examples {
        let (text, markers) = strip_markers(example);
        let file = fixture(&text);
        let offsets: Vec<usize> = lint_file(&file, rule)
            .iter()
            .map(|v| v.location.offset)
            .collect();
        assert_eq!(offsets, markers, "triggering example:\n{}", example);
    }

    for (input, expected) in description.corrections {
        let (text, markers) = strip_markers(input);
        let mut file = fixture(&text);
        let corrections = rule.correct(&mut file);
        assert_eq!(file.contents(), *expected, "correction of:\n{}", input);

        let mut offsets: Vec<usize> = corrections.iter().map(|c| c.location.offset).collect();
        offsets.sort_unstable();
        assert_eq!(offsets, markers, "correction locations of:\n{}", input);

        assert!(rule.correct(&mut file).is_empty(), "second pass on:\n{}", input);
        let mut reparsed = fixture(expected);
        assert!(rule.correct(&mut reparsed).is_empty(), "reparsed output of:\n{}", input);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lexer_skips_punctuation() {
        let file = fixture("loop: while true { break }");
        let kinds: Vec<&TokenKind> = file.tokens().iter().map(|t| &t.kind).collect();
        assert_eq!(
            kinds,
            vec![
                &TokenKind::Identifier,
                &TokenKind::Keyword,
                &TokenKind::Keyword,
                &TokenKind::Keyword
            ]
        );
    }

    #[test]
    fn test_strings_and_comments_are_single_tokens() {
        let file = fixture("print(\"a \\\" break\") // x\n/* y */");
        let kinds: Vec<&TokenKind> = file.tokens().iter().map(|t| &t.kind).collect();
        assert_eq!(
            kinds,
            vec![
                &TokenKind::Identifier,
                &TokenKind::String,
                &TokenKind::Comment,
                &TokenKind::Comment
            ]
        );
    }

    #[test]
    fn test_statement_ranges() {
        let source = "loop: repeat {\n    if x { break }\n} while true\nlet y = 1";
        let file = fixture(source);
        let stmt = &file.structure().substructure[0];
        assert_eq!(stmt.kind, Some(NodeKind::RepeatWhile));
        let range = stmt.byte_range().unwrap();
        assert_eq!(&source[range.start..range.end], "loop: repeat {\n    if x { break }\n} while true");
        assert_eq!(stmt.substructure[0].kind, Some(NodeKind::If));
    }

    #[test]
    fn test_else_if_chain_is_nested() {
        let source = "a: if x { } else if y { break a } else { }";
        let file = fixture(source);
        let stmt = &file.structure().substructure[0];
        assert_eq!(stmt.byte_range().unwrap().end, source.len());
        assert_eq!(stmt.substructure.len(), 1);
        assert_eq!(stmt.substructure[0].kind, Some(NodeKind::If));
    }

    #[test]
    fn test_strip_markers() {
        let (text, markers) = strip_markers("if a {\n    ↓b: while c {}\n}");
        assert_eq!(text, "if a {\n    b: while c {}\n}");
        assert_eq!(markers, vec![11]);
    }
}
