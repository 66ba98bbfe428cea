//! `StreamingBuffer` — a sliding-window cursor over a `Read` (optionally
//! `Read + Seek`) byte stream of potentially unknown length.

use std::io::{Read, Seek, SeekFrom};

use crate::codec;
use crate::error::StreamError;
use crate::position::Position;
use crate::tracker::PositionTracker;

/// Smallest window this buffer accepts. Below this a single 4-byte UTF-8
/// sequence couldn't fit resident at once, and (more urgently) a
/// zero-sized window can never make `slide` observe end-of-stream, which
/// would spin forever.
const MIN_WINDOW_SIZE: usize = 4;

/// A windowed view over a byte stream, re-filled on demand as the cursor
/// consumes it.
///
/// Unlike [`crate::buffer::Buffer`], which borrows its entire source up
/// front, `StreamingBuffer` only ever holds `window_size` bytes resident at
/// once — the window slides forward as bytes are consumed, discarding a
/// prefix and reading fresh bytes into the tail. The one invariant this
/// type exists to protect is that the tracker's cumulative `(line, column)`
/// state survives a slide exactly as if the whole file had been buffered at
/// once, including when a `\r\n` pair straddles a slide boundary.
pub struct StreamingBuffer<R> {
    reader: R,
    window: Vec<u8>,
    window_size: usize,
    window_start: usize,
    pos_in_window: usize,
    valid_bytes: usize,
    eof_reached: bool,
    byte_mark: Option<usize>,
    source_mark: Option<Position>,
    tracker: Option<PositionTracker>,
}

impl<R> StreamingBuffer<R> {
    /// Configured window capacity.
    #[must_use]
    pub fn window_size(&self) -> usize {
        self.window_size
    }

    /// Absolute file offset of the cursor.
    #[must_use]
    pub fn absolute_offset(&self) -> usize {
        self.window_start + self.pos_in_window
    }

    /// Whether the underlying reader has been exhausted and the window is
    /// fully consumed.
    #[must_use]
    pub fn is_at_end(&self) -> bool {
        self.eof_reached && self.pos_in_window >= self.valid_bytes
    }

    /// The attached tracker, if tracking is enabled.
    #[must_use]
    pub fn tracker(&self) -> Option<&PositionTracker> {
        self.tracker.as_ref()
    }

    /// Detaches and discards the attached tracker, if any.
    pub fn disable_tracking(&mut self) {
        self.tracker = None;
    }

    /// Borrows the underlying reader.
    #[must_use]
    pub fn get_ref(&self) -> &R {
        &self.reader
    }

    /// Consumes `self`, returning the underlying reader.
    #[must_use]
    pub fn into_inner(self) -> R {
        self.reader
    }
}

impl<R: Read> StreamingBuffer<R> {
    /// Opens a streaming buffer over `reader` with no position tracking,
    /// performing the initial window fill.
    ///
    /// # Errors
    ///
    /// [`StreamError::WindowTooSmall`] if `window_size` is below
    /// [`MIN_WINDOW_SIZE`], or any I/O error from the first read.
    pub fn new(reader: R, window_size: usize) -> Result<Self, StreamError> {
        if window_size < MIN_WINDOW_SIZE {
            return Err(StreamError::WindowTooSmall {
                requested: window_size,
                minimum: MIN_WINDOW_SIZE,
            });
        }
        let mut buffer = Self {
            reader,
            window: vec![0u8; window_size],
            window_size,
            window_start: 0,
            pos_in_window: 0,
            valid_bytes: 0,
            eof_reached: false,
            byte_mark: None,
            source_mark: None,
            tracker: None,
        };
        buffer.fill_initial()?;
        Ok(buffer)
    }

    /// Like [`Self::new`], with position tracking enabled and the
    /// line-ending convention auto-detected from the first window's
    /// content.
    ///
    /// # Errors
    ///
    /// Propagates any I/O error from the first read.
    pub fn with_tracker(reader: R, window_size: usize) -> Result<Self, StreamError> {
        let mut buffer = Self::new(reader, window_size)?;
        let mut tracker = PositionTracker::new();
        tracker.set_line_ending(PositionTracker::detect(&buffer.window[..buffer.valid_bytes]));
        buffer.tracker = Some(tracker);
        Ok(buffer)
    }

    fn fill_initial(&mut self) -> Result<(), StreamError> {
        let mut total = 0;
        while total < self.window.len() {
            let n = self.reader.read(&mut self.window[total..])?;
            if n == 0 {
                break;
            }
            total += n;
        }
        self.valid_bytes = total;
        self.eof_reached = total < self.window_size;
        Ok(())
    }

    /// Slides the window forward: keeps a small unconsumed tail, discards
    /// the rest, and reads fresh bytes in behind it.
    ///
    /// The tracker's `(line, column)` is carried across the slide
    /// explicitly rather than recomputed, because recomputation would
    /// require bytes the window no longer holds. The `pending_cr` flag
    /// (see [`PositionTracker::pending_cr`]) travels with it so a `\r\n`
    /// pair split exactly at the slide boundary is still recognized as one
    /// line break rather than two.
    fn slide(&mut self) -> Result<(), StreamError> {
        debug_assert!(
            self.tracker
                .as_ref()
                .map_or(true, |t| t.current().byte_offset == self.absolute_offset()),
            "tracker must already reflect window[..pos_in_window] before a slide"
        );

        let keep = (self.window_size / 4).min(self.valid_bytes - self.pos_in_window);
        let slide_amount = self.pos_in_window;
        let carried = self
            .tracker
            .as_ref()
            .map(|t| (t.current().line, t.current().column, t.pending_cr()));

        self.window.copy_within(self.pos_in_window..self.pos_in_window + keep, 0);
        let mut read_total = 0;
        let tail_len = self.window_size - keep;
        while read_total < tail_len {
            let n = self.reader.read(&mut self.window[keep + read_total..self.window_size])?;
            if n == 0 {
                break;
            }
            read_total += n;
        }
        self.valid_bytes = keep + read_total;
        if read_total < tail_len {
            self.eof_reached = true;
        }
        self.window_start += slide_amount;
        self.pos_in_window = 0;

        if let (Some(tracker), Some((line, column, pending_cr))) = (&mut self.tracker, carried) {
            tracker.restore_snapshot(Position {
                line,
                column,
                byte_offset: self.window_start,
            });
            tracker.set_pending_cr(pending_cr);
        }

        Ok(())
    }

    /// Ensures the byte at `pos_in_window + ahead` is resident, sliding as
    /// many times as necessary (and possible) to fetch it.
    fn ensure_available(&mut self, ahead: usize) -> Result<(), StreamError> {
        while self.pos_in_window + ahead >= self.valid_bytes && !self.eof_reached {
            self.slide()?;
        }
        Ok(())
    }

    /// Reads the byte at the cursor without advancing, pulling in new
    /// window data if needed.
    ///
    /// # Errors
    ///
    /// [`StreamError::EndOfStream`] at the end of the stream, or any I/O
    /// error from a slide's read.
    pub fn peek(&mut self) -> Result<u8, StreamError> {
        self.ensure_available(0)?;
        self.window
            .get(self.pos_in_window)
            .copied()
            .ok_or(StreamError::EndOfStream)
    }

    /// Reads the byte `k` positions ahead of the cursor without advancing.
    /// `k` must be small relative to `window_size`; this is a short
    /// look-ahead primitive, not random access into the stream.
    ///
    /// # Errors
    ///
    /// [`StreamError::EndOfStream`] if fewer than `k + 1` bytes remain, or
    /// any I/O error from a slide's read.
    pub fn peek_n(&mut self, k: usize) -> Result<u8, StreamError> {
        self.ensure_available(k)?;
        self.window
            .get(self.pos_in_window + k)
            .copied()
            .ok_or(StreamError::EndOfStream)
    }

    /// Consumes and returns one byte, advancing the tracker if attached.
    ///
    /// # Errors
    ///
    /// [`StreamError::EndOfStream`] at the end of the stream.
    pub fn next(&mut self) -> Result<u8, StreamError> {
        let b = self.peek()?;
        self.pos_in_window += 1;
        if let Some(tracker) = &mut self.tracker {
            tracker.advance(b);
        }
        Ok(b)
    }

    /// Consumes and returns one codepoint. The decode may need up to 3
    /// bytes of additional look-ahead, which can itself trigger a slide —
    /// this is exactly the case a multi-byte codepoint split across a
    /// slide boundary must handle correctly.
    ///
    /// # Errors
    ///
    /// [`StreamError::EndOfStream`] at the end of the stream,
    /// [`StreamError::InvalidUtf8`] if the bytes there are malformed.
    pub fn next_codepoint(&mut self) -> Result<codec::Decoded, StreamError> {
        self.ensure_available(0)?;
        if self.pos_in_window >= self.valid_bytes {
            return Err(StreamError::EndOfStream);
        }
        // Best-effort extra look-ahead so a 4-byte sequence starting right
        // at the edge of the window doesn't get truncated by a premature
        // EOF check; if the stream is genuinely short, decode_one reports
        // it.
        self.ensure_available(3)?;
        let offset = self.absolute_offset();
        let slice = &self.window[self.pos_in_window..self.valid_bytes];
        let decoded = codec::decode_one(slice).map_err(|_| StreamError::InvalidUtf8 { offset })?;
        self.pos_in_window += decoded.bytes_consumed;
        if let Some(tracker) = &mut self.tracker {
            tracker.advance_codepoint(decoded.codepoint);
        }
        Ok(decoded)
    }

    /// Moves the cursor forward by up to `n` bytes, saturating at the end
    /// of the stream.
    ///
    /// # Errors
    ///
    /// Any I/O error from a slide's read; running out of stream is not an
    /// error here, matching `Buffer::advance`'s saturating behavior.
    pub fn advance(&mut self, n: usize) -> Result<(), StreamError> {
        for _ in 0..n {
            match self.next() {
                Ok(_) => {}
                Err(StreamError::EndOfStream) => break,
                Err(err) => return Err(err),
            }
        }
        Ok(())
    }

    /// Captures the current absolute offset and (if tracking) position
    /// into a restorable mark. Overwrites any prior mark.
    pub fn mark_position(&mut self) {
        self.byte_mark = Some(self.absolute_offset());
        self.source_mark = self.tracker.as_ref().map(PositionTracker::current);
    }

    /// Restores the mark captured by [`Self::mark_position`].
    ///
    /// Handles restoring within the current window and restoring forward
    /// past it (by reading and discarding, which any `Read` can do).
    /// Restoring to an offset behind the current window requires seeking
    /// the underlying reader; for a non-seekable reader this returns
    /// [`StreamError::SeekNotSupported`] — use
    /// [`Self::restore_mark_seeking`] when `R: Seek`.
    ///
    /// # Errors
    ///
    /// [`StreamError::NoMarkSet`] if no mark is set,
    /// [`StreamError::SeekNotSupported`] if the mark lies behind the
    /// current window, or any I/O error encountered while reading forward.
    pub fn restore_mark(&mut self) -> Result<(), StreamError> {
        let target = self.byte_mark.ok_or(StreamError::NoMarkSet)?;
        if target < self.window_start {
            return Err(StreamError::SeekNotSupported { offset: target });
        }
        if target <= self.window_start + self.valid_bytes {
            self.pos_in_window = target - self.window_start;
        } else {
            // Forward past the buffered window: read and discard until we
            // reach it, like a forward seek on a stream that can't skip.
            while self.absolute_offset() < target {
                if self.next().is_err() {
                    break;
                }
            }
        }
        if let Some(position) = self.source_mark.take() {
            if let Some(tracker) = &mut self.tracker {
                tracker.restore_snapshot(position);
            }
        }
        self.byte_mark = None;
        Ok(())
    }
}

impl<R: Read + Seek> StreamingBuffer<R> {
    /// Like [`Self::restore_mark`], but additionally handles a mark whose
    /// absolute offset lies behind the current window by seeking the
    /// underlying reader and refilling the window from that origin.
    ///
    /// # Errors
    ///
    /// [`StreamError::NoMarkSet`] if no mark is set, or any I/O error from
    /// the seek or subsequent read.
    pub fn restore_mark_seeking(&mut self) -> Result<(), StreamError> {
        let target = self.byte_mark.ok_or(StreamError::NoMarkSet)?;
        if target >= self.window_start {
            return self.restore_mark();
        }
        self.reader.seek(SeekFrom::Start(target as u64))?;
        self.window_start = target;
        self.pos_in_window = 0;
        self.eof_reached = false;
        self.fill_initial()?;
        if let Some(position) = self.source_mark.take() {
            if let Some(tracker) = &mut self.tracker {
                tracker.restore_snapshot(position);
            }
        }
        self.byte_mark = None;
        Ok(())
    }

    /// Current absolute offset of the underlying reader's cursor, via
    /// `stream_position`. Primarily useful for diagnostics and tests.
    ///
    /// # Errors
    ///
    /// Any I/O error from `stream_position`.
    pub fn reader_position(&mut self) -> std::io::Result<u64> {
        self.reader.stream_position()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::io::Cursor;

    #[test]
    fn window_slide_across_five_lines() {
        let source = b"Line1\nLine2\nLine3\nLine4\nLine5";
        let mut buf = StreamingBuffer::with_tracker(Cursor::new(source.to_vec()), 8).unwrap();
        let mut line = 1;
        let mut slid_at_least_once_between_2_and_4 = false;
        for i in 0..source.len() {
            let before_window_start = buf.window_start;
            let b = buf.next().unwrap();
            if before_window_start != buf.window_start && (2..4).contains(&line) {
                slid_at_least_once_between_2_and_4 = true;
            }
            if b == b'\n' {
                line += 1;
            }
            assert_eq!(buf.tracker().unwrap().current().byte_offset, i + 1);
        }
        assert_eq!(line, 5);
        assert!(slid_at_least_once_between_2_and_4);
    }

    #[test]
    fn crlf_split_at_window_boundary() {
        // 7 bytes then \r\n, window size 8: consuming 7 then one more (\r)
        // lands the cursor exactly at the window edge, forcing a slide
        // right before the \n is read.
        let source = b"Hello12\r\nWorld";
        let mut buf = StreamingBuffer::with_tracker(Cursor::new(source.to_vec()), 8).unwrap();
        buf.tracker.as_mut().unwrap().set_line_ending(crate::tracker::LineEnding::Crlf);
        for _ in 0..8 {
            buf.next().unwrap();
        }
        assert_eq!(buf.tracker().unwrap().current().byte_offset, 8);
        let b = buf.next().unwrap();
        assert_eq!(b, b'\n');
        assert_eq!(
            buf.tracker().unwrap().current(),
            Position { line: 2, column: 1, byte_offset: 9 }
        );
    }

    #[test]
    fn multibyte_codepoint_split_across_slide() {
        // Pad so the emoji's 4 bytes straddle a window boundary.
        let mut source = vec![b'a'; 6];
        source.extend_from_slice("😊".as_bytes());
        let mut buf = StreamingBuffer::with_tracker(Cursor::new(source.clone()), 8).unwrap();
        for _ in 0..6 {
            buf.next().unwrap();
        }
        let decoded = buf.next_codepoint().unwrap();
        assert_eq!(decoded.codepoint, '😊' as u32);
        assert_eq!(decoded.bytes_consumed, 4);
    }

    #[test]
    fn in_memory_and_streaming_agree_on_trajectory() {
        let source = b"A\tB\r\nC\nD";
        let mut mem = crate::buffer::Buffer::with_tracker(source);
        let mut stream = StreamingBuffer::with_tracker(Cursor::new(source.to_vec()), 4).unwrap();
        stream
            .tracker
            .as_mut()
            .unwrap()
            .set_line_ending(mem.tracker().unwrap().line_ending());
        for _ in 0..source.len() {
            let a = mem.next().unwrap();
            let b = stream.next().unwrap();
            assert_eq!(a, b);
            assert_eq!(mem.tracker().unwrap().current(), stream.tracker().unwrap().current());
        }
    }

    #[test]
    fn mark_restore_within_same_window() {
        let source = b"abcdefgh";
        let mut buf = StreamingBuffer::with_tracker(Cursor::new(source.to_vec()), 8).unwrap();
        buf.advance(3).unwrap();
        buf.mark_position();
        buf.advance(4).unwrap();
        buf.restore_mark().unwrap();
        assert_eq!(buf.absolute_offset(), 3);
    }

    #[test]
    fn mark_restore_seeking_behind_window() {
        let source = b"0123456789abcdef0123456789";
        let mut buf = StreamingBuffer::with_tracker(Cursor::new(source.to_vec()), 8).unwrap();
        buf.mark_position();
        buf.advance(20).unwrap();
        assert!(buf.window_start > 0);
        buf.restore_mark_seeking().unwrap();
        assert_eq!(buf.absolute_offset(), 0);
        assert_eq!(buf.next().unwrap(), b'0');
    }

    #[test]
    fn restore_without_mark_errors() {
        let mut buf = StreamingBuffer::new(Cursor::new(b"abc".to_vec()), 4).unwrap();
        assert!(matches!(buf.restore_mark(), Err(StreamError::NoMarkSet)));
    }

    #[test]
    fn window_size_below_minimum_is_rejected() {
        let err = StreamingBuffer::new(Cursor::new(b"abc".to_vec()), 0).unwrap_err();
        assert!(matches!(
            err,
            StreamError::WindowTooSmall { requested: 0, minimum: MIN_WINDOW_SIZE }
        ));
        let err = StreamingBuffer::new(Cursor::new(b"abc".to_vec()), 3).unwrap_err();
        assert!(matches!(err, StreamError::WindowTooSmall { requested: 3, .. }));
    }

    #[test]
    fn empty_stream_boundary() {
        let mut buf = StreamingBuffer::with_tracker(Cursor::new(Vec::new()), 8).unwrap();
        assert!(buf.is_at_end());
        assert!(matches!(buf.peek(), Err(StreamError::EndOfStream)));
    }

    proptest::proptest! {
        #[test]
        fn streaming_matches_in_memory_for_random_window_sizes(
            s in "[ -~\\n\\t]{0,80}", window_size in 4usize..16
        ) {
            let source = s.as_bytes().to_vec();
            let mut mem = crate::buffer::Buffer::with_tracker(&source);
            let mut stream = StreamingBuffer::with_tracker(Cursor::new(source.clone()), window_size).unwrap();
            let line_ending = mem.tracker().unwrap().line_ending();
            stream.tracker.as_mut().unwrap().set_line_ending(line_ending);
            for _ in 0..source.len() {
                let a = mem.next();
                let b = stream.next();
                proptest::prop_assert_eq!(a.is_ok(), b.is_ok());
                if let (Ok(a), Ok(b)) = (a, b) {
                    proptest::prop_assert_eq!(a, b);
                    proptest::prop_assert_eq!(mem.tracker().unwrap().current(), stream.tracker().unwrap().current());
                }
            }
        }
    }
}
