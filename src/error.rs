//! # Error Types
//!
//! Error handling for the binary node codec.
//!
//! Every failure the codec can hit is returned to the immediate caller as a
//! typed [`CodecError`]. The encoder and decoder never log, never retry and
//! never hand back a partially decoded tree; the surrounding layers decide
//! whether to drop a frame, wait for more bytes or close the connection.
//!
//! ## Error Categories
//! - **Framing**: a structural marker or token code did not match expectation
//! - **Truncation**: a declared length runs past the end of the buffer
//! - **Depth**: nesting exceeded the configured safety bound
//! - **Encoding**: an encode-time value cannot be represented on the wire
//! - **Dictionary / Config / I/O**: setup failures outside the hot path
//!
//! ## Example Usage
//! ```rust
//! use binary_node::error::CodecError;
//! use binary_node::{decode, TokenDictionary};
//!
//! let dictionary = TokenDictionary::empty();
//! match decode(&[0xF8, 0x00], &dictionary) {
//!     Err(e) if e.is_truncated() => { /* wait for more bytes */ }
//!     Err(e) => panic!("unexpected error: {e}"),
//!     Ok(node) => panic!("unexpected node: {node:?}"),
//! }
//! ```

use std::borrow::Cow;
use std::io;
use thiserror::Error;

/// Error message constants to reduce allocations in error paths.
pub mod constants {
    /// Framing errors
    pub const ERR_EXPECTED_LIST_START: &str = "expected list-start";
    pub const ERR_EXPECTED_LIST_END: &str = "expected list-end";
    pub const ERR_UNKNOWN_TOKEN: &str = "unknown token";
    pub const ERR_DUPLICATE_ATTRIBUTE: &str = "duplicate attribute";
    pub const ERR_INVALID_UTF8: &str = "invalid utf-8";
    pub const ERR_TRAILING_BYTES: &str = "trailing bytes after node";
    pub const ERR_LENGTH_OVERFLOW: &str = "declared length does not fit in memory";

    /// Encoding errors
    pub const ERR_VALUE_TOO_LONG: &str = "value exceeds maximum representable length";

    /// Dictionary errors
    pub const ERR_SINGLE_BYTE_FULL: &str = "too many single-byte tokens";
    pub const ERR_DOUBLE_BYTE_FULL: &str = "too many double-byte tokens";
    pub const ERR_EMPTY_TOKEN: &str = "empty string is reserved for token 0";
}

/// CodecError is the error type for all encode, decode and setup operations
#[derive(Error, Debug)]
pub enum CodecError {
    #[error("Framing error: {0}")]
    Framing(Cow<'static, str>),

    #[error("Truncated input: needed {needed} bytes, {remaining} remaining")]
    TruncatedInput { needed: usize, remaining: usize },

    #[error("Nesting depth exceeded limit of {0}")]
    DepthExceeded(usize),

    #[error("Encoding error: {0}")]
    Encoding(String),

    #[error("Dictionary error: {0}")]
    Dictionary(String),

    #[error("Frame too large: {0} bytes")]
    OversizedFrame(usize),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

impl CodecError {
    /// Framing error with a static message
    #[inline]
    pub(crate) fn framing(msg: &'static str) -> Self {
        CodecError::Framing(Cow::Borrowed(msg))
    }

    /// True when more input may complete the frame.
    ///
    /// Streaming readers use this to tell "wait for the next chunk" apart
    /// from a frame that can never decode.
    pub fn is_truncated(&self) -> bool {
        matches!(self, CodecError::TruncatedInput { .. })
    }

    /// True for errors caused by the bytes themselves rather than setup
    pub fn is_malformed_input(&self) -> bool {
        matches!(
            self,
            CodecError::Framing(_)
                | CodecError::TruncatedInput { .. }
                | CodecError::DepthExceeded(_)
                | CodecError::OversizedFrame(_)
        )
    }
}

/// Type alias for Results using CodecError
pub type Result<T> = std::result::Result<T, CodecError>;
