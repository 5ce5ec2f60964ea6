//! # binary-node
//!
//! Compact binary wire codec for tagged, attributed node trees.
//!
//! A [`Node`] carries a tag, ordered attributes and one piece of content
//! (nothing, text, opaque bytes or child nodes). The encoder writes it as a
//! dense, self-delimiting byte sequence, replacing well-known tag names with
//! one- or two-byte codes from a shared [`TokenDictionary`]. The decoder
//! validates every marker, length and token code, bounds nesting depth, and
//! never returns a partial tree.
//!
//! ## Quick Start
//! ```rust
//! use binary_node::{decode, encode, Node, TokenDictionary};
//!
//! let dictionary = TokenDictionary::new(["iq", "query"], ["offer"])?;
//! let node = Node::new("iq")
//!     .with_attr("id", "1")
//!     .with_attr("type", "get")
//!     .with_child(Node::new("query"));
//!
//! let bytes = encode(&node, &dictionary)?;
//! assert_eq!(decode(&bytes, &dictionary)?, node);
//! # Ok::<(), binary_node::CodecError>(())
//! ```
//!
//! ## Modules
//! - [`protocol`]: node model and token dictionary
//! - [`core`]: wire markers, encoder, decoder and the streaming codec
//! - [`config`]: TOML/env configuration for dictionary and limits
//! - [`utils`]: logging setup and metrics

pub mod config;
pub mod core;
pub mod error;
pub mod protocol;
pub mod utils;

pub use crate::core::{decode, decode_at, encode, NodeCodec, NodeDecoder, NodeEncoder};
pub use crate::error::{CodecError, Result};
pub use crate::protocol::{AttrValue, Attributes, Content, Node, Token, TokenDictionary};
