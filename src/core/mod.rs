//! # Core Wire Components
//!
//! Byte-level encoding and decoding of node trees.
//!
//! ## Components
//! - **Marker**: Reserved byte values and length classes
//! - **Encoder**: Node to bytes, exactly sized in one allocation
//! - **Decoder**: Bytes to node over a movable cursor
//! - **Scanner**: Resumable frame-boundary scan used by the codec
//! - **Codec**: Tokio codec for framing nodes over byte streams
//!
//! ## Wire Format
//! ```text
//! [0xF8] [Tag] [AttrCount] ([Key] [Value])* [Content] [0xF9]
//! ```
//!
//! ## Security
//! - Every declared length is checked against the remaining input
//! - Token codes are checked against the dictionary before lookup
//! - Nesting depth is bounded explicitly (default 64)
//! - Streaming frames are capped at 16MB by default

pub mod codec;
pub mod decoder;
pub mod encoder;
pub mod marker;
pub(crate) mod scanner;

pub use codec::NodeCodec;
pub use decoder::{decode, decode_at, NodeDecoder};
pub use encoder::{encode, NodeEncoder};
