//! `PositionTracker` — the mutable cursor that turns raw byte consumption
//! into a `(line, column, byte_offset)` trajectory, handling tab stops and
//! the three line-ending conventions.

use crate::codec;
use crate::error::TrackerError;
use crate::position::Position;
use crate::range::Range;

/// Which line-ending convention governs how `\r`/`\n` pairs are collapsed
/// into a single line increment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LineEnding {
    /// `\n` alone ends a line.
    Lf,
    /// `\r` alone ends a line.
    Cr,
    /// `\r\n` together end a line; the increment is committed on the `\n`.
    Crlf,
}

impl Default for LineEnding {
    fn default() -> Self {
        LineEnding::Lf
    }
}

/// `{ lines, columns, bytes }` delta between two positions, as returned by
/// [`PositionTracker::position_difference`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PositionDifference {
    /// `b.line - a.line`.
    pub lines: i64,
    /// `b.column - a.column`.
    pub columns: i64,
    /// `b.byte_offset - a.byte_offset`.
    pub bytes: i64,
}

/// Drives a [`Position`] forward through a byte stream, tracking tab stops,
/// line endings, and a stack of restorable marks.
#[derive(Debug, Clone)]
pub struct PositionTracker {
    current: Position,
    marks: Vec<Position>,
    tab_width: u32,
    line_ending: LineEnding,
    /// Set after consuming a `\r` whose pairing with a following `\n` (or
    /// lack thereof) hasn't been resolved yet. Carried across
    /// `StreamingBuffer` window slides so a CRLF split at the window
    /// boundary is still recognized as one line break.
    pending_cr: bool,
}

impl PositionTracker {
    /// Creates a tracker at the initial position with `tab_width = 4` and
    /// `line_ending = LF`.
    #[must_use]
    pub fn new() -> Self {
        Self {
            current: Position::new(),
            marks: Vec::new(),
            tab_width: 4,
            line_ending: LineEnding::Lf,
            pending_cr: false,
        }
    }

    /// Builds a tracker with an explicit tab width.
    #[must_use]
    pub fn with_tab_width(tab_width: u32) -> Self {
        Self {
            tab_width,
            ..Self::new()
        }
    }

    /// Resets to the initial position, clears marks, but leaves
    /// `tab_width`/`line_ending` configuration untouched.
    pub fn reset(&mut self) {
        self.current = Position::new();
        self.marks.clear();
        self.pending_cr = false;
    }

    /// The tracker's current position.
    #[must_use]
    pub fn current(&self) -> Position {
        self.current
    }

    /// The configured tab width.
    #[must_use]
    pub fn tab_width(&self) -> u32 {
        self.tab_width
    }

    /// The configured line-ending convention.
    #[must_use]
    pub fn line_ending(&self) -> LineEnding {
        self.line_ending
    }

    /// Overrides the line-ending convention, e.g. after [`Self::detect`].
    pub fn set_line_ending(&mut self, line_ending: LineEnding) {
        self.line_ending = line_ending;
    }

    /// Scans `bytes` for the first line-ending sequence and returns the
    /// convention it implies: `\r\n` first wins CRLF, a lone `\r` wins CR, a
    /// lone `\n` wins LF; no line ending at all defaults to LF.
    #[must_use]
    pub fn detect(bytes: &[u8]) -> LineEnding {
        let mut i = 0;
        while i < bytes.len() {
            match bytes[i] {
                b'\r' => {
                    return if bytes.get(i + 1) == Some(&b'\n') {
                        LineEnding::Crlf
                    } else {
                        LineEnding::Cr
                    };
                }
                b'\n' => return LineEnding::Lf,
                _ => i += 1,
            }
        }
        LineEnding::Lf
    }

    /// Advances past one raw byte, applying the configured line-ending
    /// policy.
    ///
    /// A `\r` always advances `byte_offset`. Under `LineEnding::Cr` the line
    /// increment is committed immediately (a lone CR is itself the line
    /// terminator, so there is nothing to wait for). Under `LineEnding::Crlf`
    /// the increment is deferred to the following `\n`; any other mode or
    /// any byte other than `\n` following the `\r` simply leaves the CR as a
    /// non-newline byte.
    pub fn advance(&mut self, b: u8) {
        match b {
            b'\r' => {
                self.current.byte_offset += 1;
                if self.line_ending == LineEnding::Cr {
                    self.current.line += 1;
                    self.current.column = 1;
                }
                self.pending_cr = true;
            }
            b'\n' => {
                if self.pending_cr && self.line_ending == LineEnding::Crlf {
                    self.current.line += 1;
                    self.current.column = 1;
                    self.current.byte_offset += 1;
                } else if self.line_ending == LineEnding::Cr {
                    // Under CR-only mode a `\n` is never itself a
                    // terminator: either it trails a `\r` that already
                    // committed the line bump, or it's a bare `\n` that
                    // CR mode doesn't recognize as one. Either way it's
                    // just an ordinary byte here.
                    self.current.byte_offset += 1;
                } else {
                    self.current.advance_byte(b, self.tab_width);
                }
                self.pending_cr = false;
            }
            _ => {
                self.current.advance_byte(b, self.tab_width);
                self.pending_cr = false;
            }
        }
    }

    /// Advances past one decoded codepoint, applying the same line-ending
    /// policy as [`Self::advance`].
    pub fn advance_codepoint(&mut self, cp: u32) {
        let len = codec::utf8_len(cp);
        match cp {
            0x0D => {
                self.current.byte_offset += len;
                if self.line_ending == LineEnding::Cr {
                    self.current.line += 1;
                    self.current.column = 1;
                }
                self.pending_cr = true;
            }
            0x0A => {
                if self.pending_cr && self.line_ending == LineEnding::Crlf {
                    self.current.line += 1;
                    self.current.column = 1;
                    self.current.byte_offset += len;
                } else if self.line_ending == LineEnding::Cr {
                    self.current.byte_offset += len;
                } else {
                    self.current.advance_codepoint(cp, self.tab_width);
                }
                self.pending_cr = false;
            }
            _ => {
                self.current.advance_codepoint(cp, self.tab_width);
                self.pending_cr = false;
            }
        }
    }

    /// Advances through a slice of already-validated UTF-8 bytes,
    /// codepoint by codepoint.
    pub fn advance_utf8_bytes(&mut self, bytes: &[u8]) {
        let mut rest = bytes;
        while let Ok(decoded) = codec::decode_one(rest) {
            self.advance_codepoint(decoded.codepoint);
            rest = &rest[decoded.bytes_consumed..];
        }
    }

    /// Whether the previously consumed byte was a `\r` whose newline
    /// pairing is still unresolved. Exposed so [`crate::streaming`] can
    /// carry this flag across a window slide.
    #[must_use]
    pub fn pending_cr(&self) -> bool {
        self.pending_cr
    }

    /// Restores the "last byte was CR" flag, used by [`crate::streaming`]
    /// after reinstalling `(line, column)` post-slide.
    pub fn set_pending_cr(&mut self, pending_cr: bool) {
        self.pending_cr = pending_cr;
    }

    /// Pushes the current position onto the mark stack.
    pub fn mark(&mut self) {
        self.marks.push(self.current);
    }

    /// Pops the mark stack and overwrites the current position with it.
    ///
    /// # Errors
    ///
    /// Returns [`TrackerError::NoMarkToRestore`] if no mark is set.
    pub fn restore(&mut self) -> Result<(), TrackerError> {
        self.current = self.marks.pop().ok_or(TrackerError::NoMarkToRestore)?;
        self.pending_cr = false;
        Ok(())
    }

    /// Returns the range from the top of the mark stack (without popping)
    /// to the current position.
    ///
    /// # Errors
    ///
    /// Returns [`TrackerError::NoMarkToRestore`] if no mark is set.
    pub fn get_range_from_mark(&self) -> Result<Range, TrackerError> {
        let start = *self.marks.last().ok_or(TrackerError::NoMarkToRestore)?;
        Ok(Range::new(start, self.current))
    }

    /// Pops the mark stack and returns the range from it to the current
    /// position.
    ///
    /// # Errors
    ///
    /// Returns [`TrackerError::NoMarkToRestore`] if no mark is set.
    pub fn pop_mark_to_range(&mut self) -> Result<Range, TrackerError> {
        let start = self.marks.pop().ok_or(TrackerError::NoMarkToRestore)?;
        Ok(Range::new(start, self.current))
    }

    /// Number of marks currently pushed.
    #[must_use]
    pub fn mark_depth(&self) -> usize {
        self.marks.len()
    }

    /// Scans `source` from byte 0, replaying the same advance rules this
    /// tracker uses, and returns the `Position` at `target`.
    ///
    /// This does not mutate `self`; it builds a fresh tracker with the same
    /// configuration. Cost is O(target).
    ///
    /// # Errors
    ///
    /// Returns [`TrackerError::OffsetOutOfBounds`] if `target > source.len()`.
    pub fn offset_to_position(
        &self,
        source: &[u8],
        target: usize,
    ) -> Result<Position, TrackerError> {
        if target > source.len() {
            return Err(TrackerError::OffsetOutOfBounds {
                offset: target,
                len: source.len(),
            });
        }
        let mut scratch = PositionTracker {
            current: Position::new(),
            marks: Vec::new(),
            tab_width: self.tab_width,
            line_ending: self.line_ending,
            pending_cr: false,
        };
        let mut rest = &source[..target];
        while let Ok(decoded) = codec::decode_one(rest) {
            scratch.advance_codepoint(decoded.codepoint);
            rest = &rest[decoded.bytes_consumed..];
        }
        Ok(scratch.current)
    }

    /// Advances through `source` (starting at `self.current().byte_offset`)
    /// while the decoded codepoint satisfies `codec::is_whitespace`.
    /// Returns the number of bytes skipped.
    pub fn skip_whitespace(&mut self, source: &[u8]) -> usize {
        self.skip_while_codepoint(source, codec::is_whitespace)
    }

    /// Advances through `source` while the decoded codepoint does not
    /// satisfy "is a newline" under the current configuration, stopping
    /// before the line-ending sequence. Returns the number of bytes
    /// skipped.
    ///
    /// Uses `memchr` to jump straight to the next `\r`/`\n` rather than
    /// testing every byte, then replays just that span through
    /// [`Self::advance`] for the tab/column bookkeeping a plain
    /// byte-position jump can't skip.
    pub fn skip_to_line_end(&mut self, source: &[u8]) -> usize {
        let start = self.current.byte_offset;
        let rest = &source[start..];
        let stop = memchr::memchr2(b'\n', b'\r', rest).unwrap_or(rest.len());
        for &b in &rest[..stop] {
            self.advance(b);
        }
        stop
    }

    /// Like [`Self::skip_to_line_end`], but also consumes the line-ending
    /// sequence itself, treating a trailing `\r\n` as a single unit under
    /// `LineEnding::Crlf`. Returns the number of bytes skipped.
    pub fn skip_to_next_line(&mut self, source: &[u8]) -> usize {
        let start = self.current.byte_offset;
        self.skip_to_line_end(source);
        if self.current.byte_offset < source.len() {
            let b = source[self.current.byte_offset];
            if b == b'\r' {
                self.advance(b);
                if self.line_ending == LineEnding::Crlf
                    && self.current.byte_offset < source.len()
                    && source[self.current.byte_offset] == b'\n'
                {
                    self.advance(b'\n');
                }
            } else if b == b'\n' {
                self.advance(b);
            }
        }
        self.current.byte_offset - start
    }

    fn skip_while_codepoint(&mut self, source: &[u8], pred: impl Fn(u32) -> bool) -> usize {
        let start = self.current.byte_offset;
        loop {
            let rest = &source[self.current.byte_offset..];
            let Ok(decoded) = codec::decode_one(rest) else {
                break;
            };
            if !pred(decoded.codepoint) {
                break;
            }
            self.advance_codepoint(decoded.codepoint);
        }
        self.current.byte_offset - start
    }

    /// Captures the current position without pushing the mark stack.
    #[must_use]
    pub fn snapshot(&self) -> Position {
        self.current
    }

    /// Restores a previously captured [`Self::snapshot`].
    ///
    /// The `pending_cr` flag is not part of a snapshot; restoring always
    /// clears it, which is correct as long as a snapshot is never taken
    /// mid-way through a CR/LF pair.
    pub fn restore_snapshot(&mut self, position: Position) {
        self.current = position;
        self.pending_cr = false;
    }

    /// Whether the cursor sits at the first column of its line.
    #[must_use]
    pub fn is_at_line_start(&self) -> bool {
        self.current.column == 1
    }

    /// Whether the next byte in `source` is a line-ending byte, or the
    /// cursor is already at the end of `source`.
    #[must_use]
    pub fn is_at_line_end(&self, source: &[u8]) -> bool {
        match source.get(self.current.byte_offset) {
            None => true,
            Some(&b'\n' | &b'\r') => true,
            Some(_) => false,
        }
    }

    /// Whether the cursor sits at the very beginning of the source.
    #[must_use]
    pub fn is_at_start(&self) -> bool {
        self.current.byte_offset == 0
    }

    /// Whether the cursor has consumed all of `source`.
    #[must_use]
    pub fn is_at_end(&self, source: &[u8]) -> bool {
        self.current.byte_offset >= source.len()
    }

    /// The current visual column (alias of `current().column`).
    #[must_use]
    pub fn visual_column(&self) -> u32 {
        self.current.column
    }

    /// `{ lines, columns, bytes }` signed deltas from `a` to `b`.
    #[must_use]
    pub fn position_difference(a: Position, b: Position) -> PositionDifference {
        PositionDifference {
            lines: i64::from(b.line) - i64::from(a.line),
            columns: i64::from(b.column) - i64::from(a.column),
            bytes: b.byte_offset as i64 - a.byte_offset as i64,
        }
    }
}

impl Default for PositionTracker {
    fn default() -> Self {
        Self::new()
    }
}
