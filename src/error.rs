//! Typed error taxonomy for the buffer, tracker, streaming, and codec
//! subsystems.
//!
//! Each fallible subsystem gets its own small enum rather than one
//! crate-wide error type; callers that only use `Buffer` never need to
//! match on `StreamError` variants they can't produce.

use thiserror::Error;

/// Errors raised by [`crate::tracker::PositionTracker`] when used directly,
/// or surfaced through [`BufferError`]/[`StreamError`] when it is driven by
/// a buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[non_exhaustive]
pub enum TrackerError {
    /// `restore()` called with an empty mark stack.
    #[error("no mark to restore")]
    NoMarkToRestore,
    /// `offset_to_position` was asked for an offset past the end of the
    /// source it was given.
    #[error("offset {offset} is out of bounds for a source of length {len}")]
    OffsetOutOfBounds {
        /// The offset that was requested.
        offset: usize,
        /// The length of the source that was scanned.
        len: usize,
    },
}

/// Errors raised by [`crate::buffer::Buffer`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[non_exhaustive]
pub enum BufferError {
    /// A read was attempted past the end of the buffer's data.
    #[error("read past end of buffer")]
    EndOfBuffer,
    /// The bytes at the cursor are not valid UTF-8.
    #[error("invalid UTF-8 at byte offset {offset}")]
    InvalidUtf8 {
        /// The byte offset at which decoding failed.
        offset: usize,
    },
    /// `restore_mark()` was called with no mark set.
    #[error("no mark set")]
    NoMarkSet,
    /// `consume_identifier()` was called but the codepoint under the cursor
    /// is not a valid identifier-start codepoint.
    #[error("invalid identifier start at byte offset {offset}")]
    InvalidIdentifierStart {
        /// The byte offset of the offending codepoint.
        offset: usize,
    },
    /// `codepoint_index_to_byte_offset` was given an index beyond the
    /// number of codepoints in the buffer.
    #[error("codepoint index {index} is out of bounds")]
    IndexOutOfBounds {
        /// The requested codepoint index.
        index: usize,
    },
    /// Propagated from the attached tracker.
    #[error(transparent)]
    Tracker(#[from] TrackerError),
}

/// Errors raised by [`crate::streaming::StreamingBuffer`].
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum StreamError {
    /// A read was attempted past the end of the stream.
    #[error("read past end of stream")]
    EndOfStream,
    /// The bytes at the cursor are not valid UTF-8.
    #[error("invalid UTF-8 at absolute offset {offset}")]
    InvalidUtf8 {
        /// The absolute file offset at which decoding failed.
        offset: usize,
    },
    /// `restore_mark()` was called with no mark set.
    #[error("no mark set")]
    NoMarkSet,
    /// A mark's absolute offset lies behind the current window and the
    /// underlying reader does not support seeking.
    #[error("mark at offset {offset} requires seeking but the reader is not seekable")]
    SeekNotSupported {
        /// The absolute offset that would have needed a seek.
        offset: usize,
    },
    /// `window_size` was too small to hold even a single slide's worth of
    /// look-ahead.
    #[error("window size {requested} is too small, minimum is {minimum}")]
    WindowTooSmall {
        /// The window size that was requested.
        requested: usize,
        /// The smallest window size this buffer accepts.
        minimum: usize,
    },
    /// Propagated from the attached tracker.
    #[error(transparent)]
    Tracker(#[from] TrackerError),
    /// Propagated unchanged from the underlying reader.
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Errors raised by the UTF-8 codec in [`crate::codec`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[non_exhaustive]
pub enum CodecError {
    /// `decode_one` was given a zero-length slice.
    #[error("empty input")]
    EmptyInput,
    /// The leading byte is not a valid UTF-8 lead byte, or a continuation
    /// byte decoded to an overlong / out-of-range codepoint.
    #[error("invalid UTF-8 sequence")]
    InvalidUtf8,
    /// The leading byte announces a multi-byte sequence but the input ends
    /// before all continuation bytes are available.
    #[error("incomplete UTF-8 sequence")]
    IncompleteUtf8,
    /// A continuation byte (`0x80..=0xBF`) was expected but not found.
    #[error("invalid UTF-8 continuation byte")]
    InvalidUtf8Continuation,
    /// `encode_one` was given a buffer too small for the encoded codepoint.
    #[error("output buffer too small")]
    BufferTooSmall,
    /// The codepoint is greater than `0x10FFFF` or falls in the surrogate
    /// range `0xD800..=0xDFFF`.
    #[error("invalid codepoint: {0:#x}")]
    InvalidCodepoint(u32),
}
