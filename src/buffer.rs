//! `Buffer` — an in-memory byte cursor over a borrowed slice, with an
//! optional attached [`PositionTracker`].

use crate::codec::{self, Decoded};
use crate::error::BufferError;
use crate::tracker::PositionTracker;

/// A cursor over a borrowed byte slice.
///
/// Tracking is opt-in: a `Buffer` created with [`Buffer::new`] has no
/// [`PositionTracker`] attached and only maintains `byte_pos`; one created
/// with [`Buffer::with_tracker`] (or after calling
/// [`Buffer::enable_tracking`]) additionally maintains a synchronized
/// `(line, column)` cursor.
#[derive(Debug, Clone)]
pub struct Buffer<'src> {
    data: &'src [u8],
    byte_pos: usize,
    byte_mark: Option<usize>,
    source_mark: Option<crate::position::Position>,
    tracker: Option<PositionTracker>,
}

impl<'src> Buffer<'src> {
    /// Creates a buffer over `data` with no position tracking.
    #[must_use]
    pub fn new(data: &'src [u8]) -> Self {
        Self {
            data,
            byte_pos: 0,
            byte_mark: None,
            source_mark: None,
            tracker: None,
        }
    }

    /// Creates a buffer over `data` with position tracking enabled and the
    /// line-ending convention auto-detected from `data`.
    #[must_use]
    pub fn with_tracker(data: &'src [u8]) -> Self {
        let mut buffer = Self::new(data);
        buffer.enable_tracking();
        buffer
    }

    /// Attaches a `PositionTracker` if one is not already attached,
    /// detecting the line-ending convention from the buffer's content.
    pub fn enable_tracking(&mut self) {
        if self.tracker.is_none() {
            let mut tracker = PositionTracker::new();
            tracker.set_line_ending(PositionTracker::detect(self.data));
            self.tracker = Some(tracker);
        }
    }

    /// Detaches and discards the attached `PositionTracker`, if any.
    pub fn disable_tracking(&mut self) {
        self.tracker = None;
    }

    /// Rebinds the buffer to `data`: resets the cursor, clears marks, and
    /// (if tracking is enabled) resets the tracker and re-detects the
    /// line-ending convention.
    pub fn set_content(&mut self, data: &'src [u8]) {
        self.data = data;
        self.byte_pos = 0;
        self.byte_mark = None;
        self.source_mark = None;
        if let Some(tracker) = &mut self.tracker {
            tracker.reset();
            tracker.set_line_ending(PositionTracker::detect(data));
        }
    }

    /// The full underlying slice.
    #[must_use]
    pub fn data(&self) -> &'src [u8] {
        self.data
    }

    /// Number of bytes in the underlying slice.
    #[must_use]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Whether the underlying slice is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Current byte cursor.
    #[must_use]
    pub fn byte_pos(&self) -> usize {
        self.byte_pos
    }

    /// Whether the cursor has consumed the entire slice.
    #[must_use]
    pub fn is_at_end(&self) -> bool {
        self.byte_pos >= self.data.len()
    }

    /// The attached tracker, if tracking is enabled.
    #[must_use]
    pub fn tracker(&self) -> Option<&PositionTracker> {
        self.tracker.as_ref()
    }

    /// Whether the entire underlying slice is valid UTF-8.
    #[must_use]
    pub fn validate_utf8(&self) -> bool {
        std::str::from_utf8(self.data).is_ok()
    }

    /// Reads the byte at the cursor without advancing.
    ///
    /// # Errors
    ///
    /// [`BufferError::EndOfBuffer`] if the cursor is at or past the end.
    pub fn peek(&self) -> Result<u8, BufferError> {
        self.data
            .get(self.byte_pos)
            .copied()
            .ok_or(BufferError::EndOfBuffer)
    }

    /// Reads the byte `k` positions ahead of the cursor without advancing.
    ///
    /// # Errors
    ///
    /// [`BufferError::EndOfBuffer`] if `byte_pos + k` is at or past the end.
    pub fn peek_n(&self, k: usize) -> Result<u8, BufferError> {
        self.data
            .get(self.byte_pos + k)
            .copied()
            .ok_or(BufferError::EndOfBuffer)
    }

    /// Decodes the codepoint at the cursor without advancing.
    ///
    /// # Errors
    ///
    /// [`BufferError::EndOfBuffer`] at the end of the slice,
    /// [`BufferError::InvalidUtf8`] if the bytes there are malformed.
    pub fn peek_codepoint(&self) -> Result<Decoded, BufferError> {
        if self.byte_pos >= self.data.len() {
            return Err(BufferError::EndOfBuffer);
        }
        codec::decode_one(&self.data[self.byte_pos..])
            .map_err(|_| BufferError::InvalidUtf8 { offset: self.byte_pos })
    }

    /// Consumes and returns one byte, advancing the tracker if attached.
    ///
    /// # Errors
    ///
    /// [`BufferError::EndOfBuffer`] at the end of the slice.
    pub fn next(&mut self) -> Result<u8, BufferError> {
        let b = self.peek()?;
        self.byte_pos += 1;
        if let Some(tracker) = &mut self.tracker {
            tracker.advance(b);
        }
        Ok(b)
    }

    /// Consumes and returns one codepoint, advancing the tracker (via its
    /// codepoint-aware path) if attached.
    ///
    /// # Errors
    ///
    /// [`BufferError::EndOfBuffer`] at the end of the slice,
    /// [`BufferError::InvalidUtf8`] if the bytes there are malformed.
    pub fn next_codepoint(&mut self) -> Result<Decoded, BufferError> {
        let decoded = self.peek_codepoint()?;
        self.consume_decoded(decoded);
        Ok(decoded)
    }

    fn consume_decoded(&mut self, decoded: Decoded) {
        if let Some(tracker) = &mut self.tracker {
            tracker.advance_codepoint(decoded.codepoint);
        }
        self.byte_pos += decoded.bytes_consumed;
    }

    /// Moves the cursor forward by up to `n` bytes, saturating at the end
    /// of the slice. The tracker, if attached, replays each byte
    /// individually so tab stops and line endings stay correct.
    pub fn advance(&mut self, n: usize) {
        let end = (self.byte_pos + n).min(self.data.len());
        if let Some(tracker) = &mut self.tracker {
            for &b in &self.data[self.byte_pos..end] {
                tracker.advance(b);
            }
        }
        self.byte_pos = end;
    }

    /// Moves the cursor forward by exactly `n` codepoints.
    ///
    /// On failure partway through, the buffer (and tracker) are left
    /// exactly as they were before the call.
    ///
    /// # Errors
    ///
    /// [`BufferError::EndOfBuffer`] if fewer than `n` codepoints remain,
    /// [`BufferError::InvalidUtf8`] if malformed bytes are encountered.
    pub fn advance_codepoints(&mut self, n: usize) -> Result<(), BufferError> {
        let saved_pos = self.byte_pos;
        let saved_tracker = self.tracker.clone();
        for _ in 0..n {
            if let Err(err) = self.next_codepoint() {
                self.byte_pos = saved_pos;
                self.tracker = saved_tracker;
                return Err(err);
            }
        }
        Ok(())
    }

    /// Moves the cursor back by `n` bytes, clamped to 0.
    ///
    /// Because tabs and newlines make `byte_offset -> (line, column)`
    /// non-invertible in constant work, the attached tracker (if any) is
    /// rebuilt by replaying bytes `[0, new_pos)` from scratch. Callers on a
    /// hot retreat path should prefer [`Buffer::mark_position`] /
    /// [`Buffer::restore_mark`] instead.
    pub fn retreat(&mut self, n: usize) {
        self.byte_pos = self.byte_pos.saturating_sub(n);
        if let Some(tracker) = &mut self.tracker {
            let mut fresh = PositionTracker::with_tab_width(tracker.tab_width());
            fresh.set_line_ending(tracker.line_ending());
            fresh.advance_utf8_bytes(&self.data[..self.byte_pos]);
            *tracker = fresh;
        }
    }

    /// Captures the current byte cursor, and (if tracking) the current
    /// position, into a single restorable mark. Overwrites any prior mark.
    pub fn mark_position(&mut self) {
        self.byte_mark = Some(self.byte_pos);
        self.source_mark = self.tracker.as_ref().map(PositionTracker::current);
    }

    /// Restores the cursor (and tracker position) captured by the last
    /// [`Buffer::mark_position`], then clears the mark.
    ///
    /// # Errors
    ///
    /// [`BufferError::NoMarkSet`] if no mark is set.
    pub fn restore_mark(&mut self) -> Result<(), BufferError> {
        let byte_mark = self.byte_mark.take().ok_or(BufferError::NoMarkSet)?;
        self.byte_pos = byte_mark;
        if let Some(position) = self.source_mark.take() {
            if let Some(tracker) = &mut self.tracker {
                tracker.restore_snapshot(position);
            }
        }
        Ok(())
    }

    /// Consumes codepoints while `pred` holds, returning the number of
    /// bytes consumed.
    ///
    /// # Errors
    ///
    /// [`BufferError::InvalidUtf8`] if malformed bytes are encountered
    /// before the predicate fails or the buffer ends.
    pub fn skip_while(&mut self, pred: impl Fn(u32) -> bool) -> Result<usize, BufferError> {
        let start = self.byte_pos;
        loop {
            match self.peek_codepoint() {
                Ok(decoded) => {
                    if !pred(decoded.codepoint) {
                        break;
                    }
                    self.consume_decoded(decoded);
                }
                Err(BufferError::EndOfBuffer) => break,
                Err(err) => return Err(err),
            }
        }
        Ok(self.byte_pos - start)
    }

    /// Like [`Buffer::skip_while`], but returns the consumed slice.
    ///
    /// # Errors
    ///
    /// Same as [`Buffer::skip_while`].
    pub fn consume_while(&mut self, pred: impl Fn(u32) -> bool) -> Result<&'src [u8], BufferError> {
        let start = self.byte_pos;
        self.skip_while(pred)?;
        Ok(&self.data[start..self.byte_pos])
    }

    /// Consumes a maximal run of whitespace codepoints.
    ///
    /// # Errors
    ///
    /// Same as [`Buffer::skip_while`].
    pub fn consume_whitespace(&mut self) -> Result<&'src [u8], BufferError> {
        self.consume_while(codec::is_whitespace)
    }

    /// Consumes an identifier: one codepoint satisfying
    /// `codec::is_identifier_start`, followed by a maximal run satisfying
    /// `codec::is_identifier_continue`.
    ///
    /// # Errors
    ///
    /// [`BufferError::EndOfBuffer`] if the buffer is already exhausted,
    /// [`BufferError::InvalidIdentifierStart`] if the first codepoint
    /// cannot start an identifier, [`BufferError::InvalidUtf8`] on
    /// malformed bytes.
    pub fn consume_identifier(&mut self) -> Result<&'src [u8], BufferError> {
        let start = self.byte_pos;
        let first = self.peek_codepoint()?;
        if !codec::is_identifier_start(first.codepoint) {
            return Err(BufferError::InvalidIdentifierStart { offset: self.byte_pos });
        }
        self.consume_decoded(first);
        self.skip_while(codec::is_identifier_continue)?;
        Ok(&self.data[start..self.byte_pos])
    }

    /// Converts a codepoint index into a byte offset by scanning from the
    /// start, O(k).
    ///
    /// # Errors
    ///
    /// [`BufferError::IndexOutOfBounds`] if fewer than `k` codepoints exist,
    /// [`BufferError::InvalidUtf8`] on malformed bytes encountered first.
    pub fn codepoint_index_to_byte_offset(&self, k: usize) -> Result<usize, BufferError> {
        let mut offset = 0;
        for _ in 0..k {
            match codec::decode_one(&self.data[offset..]) {
                Ok(decoded) => offset += decoded.bytes_consumed,
                Err(crate::error::CodecError::EmptyInput) => {
                    return Err(BufferError::IndexOutOfBounds { index: k })
                }
                Err(_) => return Err(BufferError::InvalidUtf8 { offset }),
            }
        }
        Ok(offset)
    }

    /// Resets the cursor to 0, clears marks, and (if tracking) resets the
    /// tracker.
    pub fn reset(&mut self) {
        self.byte_pos = 0;
        self.byte_mark = None;
        self.source_mark = None;
        if let Some(tracker) = &mut self.tracker {
            tracker.reset();
        }
    }
}
