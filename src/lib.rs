//! Lexer-support primitives: a buffered and a streaming byte cursor, a
//! UTF-8- and line-ending-aware position tracker, and a generic zero-copy
//! token model.
//!
//! This crate does not implement a lexer for any particular grammar — it
//! provides the machinery a hand-written tokenizer needs underneath it:
//!
//! - [`Buffer`] and [`StreamingBuffer`] give a cursor over, respectively, a
//!   borrowed in-memory slice and a sliding window over a `Read`er. Both
//!   optionally host a [`PositionTracker`].
//! - [`PositionTracker`] turns raw byte/codepoint consumption into a
//!   `(line, column, byte_offset)` trajectory, handling tab stops and the
//!   three line-ending conventions.
//! - [`Token`] is a generic, zero-copy token parameterized over a
//!   caller-supplied kind type, with comparison helpers in
//!   [`token_cmp::TokenComparison`] and an optional categorization
//!   interface ([`token_cmp::TokenCategory`]) a caller implements over
//!   their own kind set.
//!
//! A downstream lexer combines these with its own recognizer:
//!
//! ```
//! use lexcore::{Buffer, Token};
//! use lexcore::token_cmp::DefaultKind;
//!
//! let mut buf = Buffer::with_tracker(b"let x = 1;");
//! let ident = buf.consume_identifier().unwrap();
//! let token = Token::init(DefaultKind::Keyword, ident, buf.tracker().unwrap().current());
//! assert_eq!(token.lexeme(), b"let");
//! ```

#![cfg_attr(test, allow(clippy::unwrap_used, clippy::expect_used))]

pub mod buffer;
pub mod codec;
pub mod error;
pub mod position;
pub mod range;
pub mod streaming;
pub mod token;
pub mod token_cmp;
pub mod tracker;

pub use buffer::Buffer;
pub use error::{BufferError, CodecError, StreamError, TrackerError};
pub use position::Position;
pub use range::{Range, SourceLocation};
pub use streaming::StreamingBuffer;
pub use token::{Token, TokenMetadata};
pub use tracker::{LineEnding, PositionDifference, PositionTracker};
