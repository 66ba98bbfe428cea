//! `Token<Kind>` — a generic, zero-copy token parameterized over a
//! caller-supplied kind type.

use crate::position::Position;
use std::fmt;

/// A tagged payload attached to a token beyond its raw slice, e.g. a
/// literal's parsed value.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TokenMetadata<'src> {
    /// A parsed integer literal.
    Integer(i64),
    /// A parsed floating-point literal.
    Float(f64),
    /// A parsed string literal's contents (post-escape-processing), still
    /// borrowed from the source if no escapes required copying.
    StringValue(&'src str),
    /// A parsed boolean literal.
    Boolean(bool),
    /// A parsed character literal's codepoint.
    Character(u32),
    /// An opaque caller-defined payload, carried without interpretation.
    Custom(u64),
}

/// A zero-copy token: a kind, a borrowed slice of the source it was lexed
/// from, the position where the slice starts, and optional metadata.
///
/// `Kind` is supplied entirely by the caller — this type commits to
/// nothing about what kinds exist; see [`crate::token_cmp`] for the
/// capability interfaces a caller's `Kind` can opt into.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Token<'src, Kind> {
    /// The caller-defined kind of this token.
    pub kind: Kind,
    /// The token's textual content, borrowed from the source buffer.
    pub slice: &'src [u8],
    /// The position of the first byte of `slice`.
    pub position: Position,
    /// Additional parsed payload, if any.
    pub metadata: Option<TokenMetadata<'src>>,
}

impl<'src, Kind> Token<'src, Kind> {
    /// Builds a token with no metadata. Allocates nothing.
    #[must_use]
    pub fn init(kind: Kind, slice: &'src [u8], position: Position) -> Self {
        Self {
            kind,
            slice,
            position,
            metadata: None,
        }
    }

    /// Builds a token carrying `metadata`. Allocates nothing.
    #[must_use]
    pub fn init_with_metadata(
        kind: Kind,
        slice: &'src [u8],
        position: Position,
        metadata: TokenMetadata<'src>,
    ) -> Self {
        Self {
            kind,
            slice,
            position,
            metadata: Some(metadata),
        }
    }

    /// The token's textual content.
    #[must_use]
    pub fn lexeme(&self) -> &'src [u8] {
        self.slice
    }

    /// Byte length of the token's slice.
    #[must_use]
    pub fn length(&self) -> usize {
        self.slice.len()
    }
}

impl<'src, Kind: PartialEq> Token<'src, Kind> {
    /// Same kind and same slice content. Position is ignored.
    #[must_use]
    pub fn eql(a: &Token<'src, Kind>, b: &Token<'src, Kind>) -> bool {
        a.kind == b.kind && a.slice == b.slice
    }

    /// [`Self::eql`] plus same position.
    #[must_use]
    pub fn identical(a: &Token<'src, Kind>, b: &Token<'src, Kind>) -> bool {
        Self::eql(a, b) && a.position == b.position
    }
}

impl<'src, Kind: fmt::Debug> fmt::Display for Token<'src, Kind> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Token({:?}, {:?}, {}:{})",
            self.kind,
            String::from_utf8_lossy(self.slice),
            self.position.line,
            self.position.column
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    enum K {
        Ident,
        Number,
    }

    fn pos(byte_offset: usize) -> Position {
        Position { line: 1, column: byte_offset as u32 + 1, byte_offset }
    }

    #[test]
    fn eql_ignores_position() {
        let a = Token::init(K::Ident, b"foo", pos(0));
        let b = Token::init(K::Ident, b"foo", pos(10));
        assert!(Token::eql(&a, &b));
        assert!(!Token::identical(&a, &b));
    }

    #[test]
    fn eql_requires_same_kind_and_slice() {
        let a = Token::init(K::Ident, b"foo", pos(0));
        let b = Token::init(K::Number, b"foo", pos(0));
        assert!(!Token::eql(&a, &b));
    }

    #[test]
    fn metadata_round_trips() {
        let tok = Token::init_with_metadata(K::Number, b"42", pos(0), TokenMetadata::Integer(42));
        assert_eq!(tok.metadata, Some(TokenMetadata::Integer(42)));
        assert_eq!(tok.length(), 2);
    }

    #[test]
    fn display_matches_expected_format() {
        let tok = Token::init(K::Ident, b"foo", Position { line: 3, column: 7, byte_offset: 20 });
        assert_eq!(format!("{tok}"), "Token(Ident, \"foo\", 3:7)");
    }
}
