//! UTF-8 decode/encode and the codepoint classification predicates consumed
//! by the buffer and tracker subsystems.
//!
//! This crate is usable without any consumer wiring its own classification
//! in, so the default here is built directly on `char`'s standard-library
//! Unicode tables rather than hand-rolled ranges. A downstream lexer is
//! free to ignore this module and implement the same small surface over a
//! different classification source (e.g. a grammar-specific identifier
//! charset).

use crate::error::CodecError;

/// Surrogate range, reserved and never a valid scalar value.
const SURROGATE_RANGE: std::ops::RangeInclusive<u32> = 0xD800..=0xDFFF;
const MAX_CODEPOINT: u32 = 0x0010_FFFF;

/// Result of decoding one codepoint from the front of a byte slice.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Decoded {
    /// The decoded Unicode scalar value.
    pub codepoint: u32,
    /// Number of bytes consumed from the front of the input, `1..=4`.
    pub bytes_consumed: usize,
}

/// Decodes one UTF-8 codepoint from the front of `bytes`.
///
/// # Errors
///
/// Returns [`CodecError::EmptyInput`] if `bytes` is empty,
/// [`CodecError::InvalidUtf8`] if the lead byte or decoded value is
/// malformed, [`CodecError::IncompleteUtf8`] if the sequence is cut short by
/// the end of `bytes`, and [`CodecError::InvalidUtf8Continuation`] if an
/// expected continuation byte is not in `0x80..=0xBF`.
pub fn decode_one(bytes: &[u8]) -> Result<Decoded, CodecError> {
    let first = *bytes.first().ok_or(CodecError::EmptyInput)?;

    let len = utf8_len_from_lead(first).ok_or(CodecError::InvalidUtf8)?;
    if bytes.len() < len {
        return Err(CodecError::IncompleteUtf8);
    }
    for &b in &bytes[1..len] {
        if b & 0xC0 != 0x80 {
            return Err(CodecError::InvalidUtf8Continuation);
        }
    }

    let codepoint = match len {
        1 => u32::from(first),
        2 => (u32::from(first & 0x1F) << 6) | cont(bytes[1]),
        3 => {
            (u32::from(first & 0x0F) << 12) | (cont(bytes[1]) << 6) | cont(bytes[2])
        }
        4 => {
            (u32::from(first & 0x07) << 18)
                | (cont(bytes[1]) << 12)
                | (cont(bytes[2]) << 6)
                | cont(bytes[3])
        }
        _ => unreachable!("utf8_len_from_lead only returns 1..=4"),
    };

    if !is_valid_codepoint(codepoint) || encoded_len(codepoint) != len {
        return Err(CodecError::InvalidUtf8);
    }

    Ok(Decoded {
        codepoint,
        bytes_consumed: len,
    })
}

fn cont(byte: u8) -> u32 {
    u32::from(byte & 0x3F)
}

fn utf8_len_from_lead(byte: u8) -> Option<usize> {
    match byte {
        0x00..=0x7F => Some(1),
        0xC2..=0xDF => Some(2),
        0xE0..=0xEF => Some(3),
        0xF0..=0xF4 => Some(4),
        _ => None,
    }
}

/// The number of UTF-8 bytes a valid codepoint would encode to. Used to
/// reject overlong encodings (a 2-byte sequence that encodes a value that
/// fits in 1 byte, etc.).
fn encoded_len(codepoint: u32) -> usize {
    match codepoint {
        0x0000..=0x007F => 1,
        0x0080..=0x07FF => 2,
        0x0800..=0xFFFF => 3,
        _ => 4,
    }
}

fn is_valid_codepoint(codepoint: u32) -> bool {
    codepoint <= MAX_CODEPOINT && !SURROGATE_RANGE.contains(&codepoint)
}

/// Encodes `codepoint` as UTF-8 into the front of `out`, returning the
/// number of bytes written.
///
/// # Errors
///
/// Returns [`CodecError::InvalidCodepoint`] if `codepoint` is greater than
/// `0x10FFFF` or falls in the surrogate range, and
/// [`CodecError::BufferTooSmall`] if `out` cannot hold the encoded form.
pub fn encode_one(codepoint: u32, out: &mut [u8]) -> Result<usize, CodecError> {
    if !is_valid_codepoint(codepoint) {
        return Err(CodecError::InvalidCodepoint(codepoint));
    }
    let ch = char::from_u32(codepoint).ok_or(CodecError::InvalidCodepoint(codepoint))?;
    let len = ch.len_utf8();
    if out.len() < len {
        return Err(CodecError::BufferTooSmall);
    }
    ch.encode_utf8(out);
    Ok(len)
}

/// The length in UTF-8 bytes that `codepoint` encodes to.
#[must_use]
pub fn utf8_len(codepoint: u32) -> usize {
    encoded_len(codepoint)
}

/// Whether `codepoint` is whitespace, per Unicode's `White_Space` property.
#[must_use]
pub fn is_whitespace(codepoint: u32) -> bool {
    char::from_u32(codepoint).is_some_and(char::is_whitespace)
}

/// Whether `codepoint` is an alphabetic letter.
#[must_use]
pub fn is_letter(codepoint: u32) -> bool {
    char::from_u32(codepoint).is_some_and(char::is_alphabetic)
}

/// Whether `codepoint` is an ASCII or Unicode decimal digit.
#[must_use]
pub fn is_digit(codepoint: u32) -> bool {
    char::from_u32(codepoint).is_some_and(|c| c.is_numeric())
}

/// Whether `codepoint` may start an identifier: a letter or underscore.
#[must_use]
pub fn is_identifier_start(codepoint: u32) -> bool {
    codepoint == u32::from(b'_') || is_letter(codepoint)
}

/// Whether `codepoint` may continue an identifier after its first
/// codepoint: a letter, digit, or underscore.
#[must_use]
pub fn is_identifier_continue(codepoint: u32) -> bool {
    codepoint == u32::from(b'_') || is_letter(codepoint) || is_digit(codepoint)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn decodes_ascii() {
        let d = decode_one(b"A").unwrap();
        assert_eq!(d.codepoint, u32::from(b'A'));
        assert_eq!(d.bytes_consumed, 1);
    }

    #[test]
    fn decodes_four_byte_emoji() {
        let bytes = "😊".as_bytes();
        let d = decode_one(bytes).unwrap();
        assert_eq!(d.codepoint, '😊' as u32);
        assert_eq!(d.bytes_consumed, 4);
    }

    #[test]
    fn rejects_empty_input() {
        assert_eq!(decode_one(&[]), Err(CodecError::EmptyInput));
    }

    #[test]
    fn rejects_lone_continuation_byte() {
        assert_eq!(decode_one(&[0x80]), Err(CodecError::InvalidUtf8));
    }

    #[test]
    fn rejects_truncated_sequence() {
        let bytes = "é".as_bytes();
        assert_eq!(
            decode_one(&bytes[..1]),
            Err(CodecError::IncompleteUtf8)
        );
    }

    #[test]
    fn rejects_surrogate_codepoint() {
        let mut out = [0u8; 4];
        assert_eq!(
            encode_one(0xD800, &mut out),
            Err(CodecError::InvalidCodepoint(0xD800))
        );
    }

    #[test]
    fn rejects_overlong_encoding() {
        // 0xC0 0x80 would overlong-encode U+0000 in two bytes.
        assert_eq!(decode_one(&[0xC0, 0x80]), Err(CodecError::InvalidUtf8));
    }

    #[test]
    fn encode_decode_round_trip() {
        for ch in ['a', 'é', '中', '😊'] {
            let mut out = [0u8; 4];
            let len = encode_one(ch as u32, &mut out).unwrap();
            let d = decode_one(&out[..len]).unwrap();
            assert_eq!(d.codepoint, ch as u32);
            assert_eq!(d.bytes_consumed, len);
        }
    }

    #[test]
    fn encode_buffer_too_small() {
        let mut out = [0u8; 1];
        assert_eq!(
            encode_one('中' as u32, &mut out),
            Err(CodecError::BufferTooSmall)
        );
    }

    #[test]
    fn classifies_identifier_codepoints() {
        assert!(is_identifier_start(u32::from(b'_')));
        assert!(is_identifier_start(u32::from(b'a')));
        assert!(!is_identifier_start(u32::from(b'1')));
        assert!(is_identifier_continue(u32::from(b'1')));
        assert!(is_whitespace(u32::from(b' ')));
        assert!(is_digit(u32::from(b'7')));
    }

    proptest::proptest! {
        #[test]
        fn round_trip_holds_for_any_char(ch in proptest::char::any()) {
            let mut out = [0u8; 4];
            let len = encode_one(ch as u32, &mut out).unwrap();
            let d = decode_one(&out[..len]).unwrap();
            proptest::prop_assert_eq!(d.codepoint, ch as u32);
            proptest::prop_assert_eq!(d.bytes_consumed, len);
        }
    }
}
