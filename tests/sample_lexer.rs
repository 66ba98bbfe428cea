//! A minimal hand-written recognizer built on `Buffer` + `PositionTracker`
//! + `Token<DefaultKind>`, demonstrating the mark/consume/emit control flow
//! this crate is meant to support. Not part of the crate's public API.

use lexcore::token_cmp::DefaultKind;
use lexcore::{Buffer, Token};

fn lex_one<'src>(buf: &mut Buffer<'src>) -> Option<Token<'src, DefaultKind>> {
    if buf.is_at_end() {
        return None;
    }
    buf.mark_position();
    let start = buf.tracker().unwrap().current();

    let b = buf.peek().ok()?;
    let kind = match b {
        b' ' | b'\t' | b'\n' | b'\r' => {
            buf.consume_whitespace().ok()?;
            DefaultKind::Whitespace
        }
        b'/' if buf.peek_n(1) == Ok(b'/') => {
            buf.skip_while(|cp| cp != u32::from(b'\n')).ok()?;
            DefaultKind::LineComment
        }
        b'0'..=b'9' => {
            buf.skip_while(|cp| (u32::from(b'0')..=u32::from(b'9')).contains(&cp))
                .ok()?;
            DefaultKind::Int
        }
        b'+' => {
            buf.next().ok()?;
            DefaultKind::Plus
        }
        b'(' => {
            buf.next().ok()?;
            DefaultKind::LeftParen
        }
        b')' => {
            buf.next().ok()?;
            DefaultKind::RightParen
        }
        _ if lexcore::codec::is_identifier_start(u32::from(b)) => {
            buf.consume_identifier().ok()?;
            DefaultKind::Ident
        }
        _ => {
            buf.next().ok()?;
            DefaultKind::InvalidByte
        }
    };

    let lexeme = &buf.data()[start.byte_offset..buf.byte_pos()];
    Some(Token::init(kind, lexeme, start))
}

fn lex_all<'src>(buf: &mut Buffer<'src>) -> Vec<Token<'src, DefaultKind>> {
    let mut tokens = Vec::new();
    while let Some(tok) = lex_one(buf) {
        tokens.push(tok);
    }
    tokens
}

#[test]
fn lexes_a_small_expression() {
    let mut buf = Buffer::with_tracker(b"foo + 12 // trailing\n(bar)");
    let tokens = lex_all(&mut buf);

    let kinds: Vec<DefaultKind> = tokens.iter().map(|t| t.kind).collect();
    assert_eq!(
        kinds,
        vec![
            DefaultKind::Ident,
            DefaultKind::Whitespace,
            DefaultKind::Plus,
            DefaultKind::Whitespace,
            DefaultKind::Int,
            DefaultKind::Whitespace,
            DefaultKind::LineComment,
            DefaultKind::Whitespace,
            DefaultKind::LeftParen,
            DefaultKind::Ident,
            DefaultKind::RightParen,
        ]
    );
    assert_eq!(tokens[0].lexeme(), b"foo");
    assert_eq!(tokens[4].lexeme(), b"12");
}

#[test]
fn token_positions_track_newlines() {
    let mut buf = Buffer::with_tracker(b"a\nb");
    let tokens = lex_all(&mut buf);
    let idents: Vec<_> = tokens
        .iter()
        .filter(|t| t.kind == DefaultKind::Ident)
        .collect();
    assert_eq!(idents[0].position.line, 1);
    assert_eq!(idents[1].position.line, 2);
}
