//! # Node Decoder
//!
//! Parses wire bytes back into a [`Node`] tree.
//!
//! The decoder walks a borrowed byte slice with a movable cursor. Every
//! length is checked against the remaining bytes before slicing, every token
//! code against the dictionary, and nesting against an explicit depth limit.
//! A failed read leaves the cursor where the node started; no partial tree
//! is ever returned.
//!
//! Running out of input at any point yields `TruncatedInput`, so a strict
//! prefix of a valid encoding is always reported as "need more bytes".

use crate::config::DEFAULT_MAX_DEPTH;
use crate::core::marker::{
    is_reserved, ContentMarker, BINARY, DOUBLE_BYTE, LARGE, LIST_END, LIST_START, LITERAL,
    MAX_SINGLE_BYTE_TOKENS, MEDIUM,
};
use crate::error::{constants, CodecError, Result};
use crate::protocol::dictionary::{Token, TokenDictionary};
use crate::protocol::node::{AttrValue, Attributes, Content, Node};
use std::collections::HashSet;

/// Attribute slots reserved up front; larger maps grow as pairs are read
const PREALLOCATED_ATTRIBUTES: usize = 32;

/// Cursor-based decoder over a borrowed buffer
#[derive(Debug, Clone)]
pub struct NodeDecoder<'a> {
    buf: &'a [u8],
    pos: usize,
    dictionary: &'a TokenDictionary,
    max_depth: usize,
}

impl<'a> NodeDecoder<'a> {
    pub fn new(buf: &'a [u8], dictionary: &'a TokenDictionary) -> Self {
        Self {
            buf,
            pos: 0,
            dictionary,
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }

    /// Reject input nested deeper than `max_depth` (the root is depth 1)
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    /// Bytes consumed so far
    pub fn position(&self) -> usize {
        self.pos
    }

    pub fn remaining(&self) -> usize {
        self.buf.len() - self.pos
    }

    pub fn is_empty(&self) -> bool {
        self.remaining() == 0
    }

    /// Decode one node and advance past it.
    ///
    /// On error the cursor is restored to where the node started.
    pub fn read_node(&mut self) -> Result<Node> {
        let start = self.pos;
        let result = self.node(1);
        if result.is_err() {
            self.pos = start;
        }
        result
    }

    /// Fail if any bytes are left after the last node
    pub fn finish(&self) -> Result<()> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(CodecError::framing(constants::ERR_TRAILING_BYTES))
        }
    }

    fn node(&mut self, depth: usize) -> Result<Node> {
        if depth > self.max_depth {
            return Err(CodecError::DepthExceeded(self.max_depth));
        }

        if self.read_u8()? != LIST_START {
            return Err(CodecError::framing(constants::ERR_EXPECTED_LIST_START));
        }

        let tag = self.read_tag()?;
        let attrs = self.read_attributes()?;

        let content = match ContentMarker::from(self.peek_u8()?) {
            ContentMarker::Children => {
                let mut children = Vec::new();
                while self.peek_u8()? == LIST_START {
                    children.push(self.node(depth + 1)?);
                }
                Content::Children(children)
            }
            ContentMarker::EmptyChildren => {
                self.pos += 1;
                Content::Children(Vec::new())
            }
            ContentMarker::Binary => {
                self.pos += 1;
                Content::Binary(self.read_bytes()?.to_vec())
            }
            ContentMarker::Absent => Content::Absent,
            ContentMarker::Text => Content::Text(self.read_str()?.to_string()),
        };

        if self.read_u8()? != LIST_END {
            return Err(CodecError::framing(constants::ERR_EXPECTED_LIST_END));
        }

        Ok(Node {
            tag,
            attrs,
            content,
        })
    }

    fn read_tag(&mut self) -> Result<String> {
        let resolved = match self.read_u8()? {
            LITERAL => return Ok(self.read_str()?.to_string()),
            DOUBLE_BYTE => {
                let idx = self.read_u8()?;
                self.dictionary.resolve(Token::Double(idx))
            }
            code if (code as usize) < MAX_SINGLE_BYTE_TOKENS => {
                self.dictionary.resolve(Token::Single(code))
            }
            _ => None,
        };
        resolved
            .map(str::to_string)
            .ok_or_else(|| CodecError::framing(constants::ERR_UNKNOWN_TOKEN))
    }

    fn read_attributes(&mut self) -> Result<Attributes> {
        let count = self.read_length()?;

        // Each pair takes at least two bytes; refuse counts the buffer cannot
        // hold before sizing anything from them.
        let min_needed = count.saturating_mul(2);
        if min_needed > self.remaining() {
            return Err(CodecError::TruncatedInput {
                needed: min_needed,
                remaining: self.remaining(),
            });
        }

        let capacity = count.min(PREALLOCATED_ATTRIBUTES);
        let mut attrs = Attributes::with_capacity(capacity);
        let mut seen: HashSet<&'a str> = HashSet::with_capacity(capacity);
        for _ in 0..count {
            let key = self.read_str()?;
            if !seen.insert(key) {
                return Err(CodecError::Framing(
                    format!("{}: {key:?}", constants::ERR_DUPLICATE_ATTRIBUTE).into(),
                ));
            }
            let value = if self.peek_u8()? == BINARY {
                self.pos += 1;
                AttrValue::Binary(self.read_bytes()?.to_vec())
            } else {
                AttrValue::Text(self.read_str()?.to_string())
            };
            attrs.push_unique(key.to_string(), value);
        }
        Ok(attrs)
    }

    fn read_length(&mut self) -> Result<usize> {
        match self.read_u8()? {
            MEDIUM => {
                let raw = self.take(2)?;
                Ok(u16::from_be_bytes([raw[0], raw[1]]) as usize)
            }
            LARGE => {
                let raw = self.take(4)?;
                let len = u32::from_be_bytes([raw[0], raw[1], raw[2], raw[3]]);
                usize::try_from(len)
                    .map_err(|_| CodecError::framing(constants::ERR_LENGTH_OVERFLOW))
            }
            byte if is_reserved(byte) => Err(CodecError::Framing(
                format!("unexpected marker 0x{byte:02X} in length").into(),
            )),
            byte => Ok(byte as usize),
        }
    }

    fn read_bytes(&mut self) -> Result<&'a [u8]> {
        let len = self.read_length()?;
        self.take(len)
    }

    fn read_str(&mut self) -> Result<&'a str> {
        let raw = self.read_bytes()?;
        std::str::from_utf8(raw).map_err(|_| CodecError::framing(constants::ERR_INVALID_UTF8))
    }

    #[inline]
    fn peek_u8(&self) -> Result<u8> {
        self.buf
            .get(self.pos)
            .copied()
            .ok_or(CodecError::TruncatedInput {
                needed: 1,
                remaining: 0,
            })
    }

    #[inline]
    fn read_u8(&mut self) -> Result<u8> {
        let byte = self.peek_u8()?;
        self.pos += 1;
        Ok(byte)
    }

    fn take(&mut self, len: usize) -> Result<&'a [u8]> {
        let remaining = self.remaining();
        if len > remaining {
            return Err(CodecError::TruncatedInput {
                needed: len,
                remaining,
            });
        }
        let buf: &'a [u8] = self.buf;
        let slice = &buf[self.pos..self.pos + len];
        self.pos += len;
        Ok(slice)
    }
}

/// Decode a buffer holding exactly one node
pub fn decode(buf: &[u8], dictionary: &TokenDictionary) -> Result<Node> {
    let mut decoder = NodeDecoder::new(buf, dictionary);
    let node = decoder.read_node()?;
    decoder.finish()?;
    Ok(node)
}

/// Decode one node starting at `*cursor`, advancing the cursor past it.
/// The cursor is left untouched on error.
pub fn decode_at(buf: &[u8], cursor: &mut usize, dictionary: &TokenDictionary) -> Result<Node> {
    let rest = buf.get(*cursor..).ok_or(CodecError::TruncatedInput {
        needed: *cursor,
        remaining: buf.len(),
    })?;
    let mut decoder = NodeDecoder::new(rest, dictionary);
    let node = decoder.read_node()?;
    *cursor += decoder.position();
    Ok(node)
}
