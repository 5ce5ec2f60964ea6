//! # Node Encoder
//!
//! Turns a [`Node`] tree into wire bytes.
//!
//! Encoding runs in two passes over the same rules: [`NodeEncoder::encoded_len`]
//! computes the exact output size, then the write pass fills a buffer
//! allocated once with that capacity. Both passes must stay in lockstep; any
//! branch added to one belongs in the other.
//!
//! ## Wire Layout
//! ```text
//! LIST_START <tag> <attr count> (<key> <value>)* <content> LIST_END
//! ```

use crate::config::DEFAULT_MAX_DEPTH;
use crate::core::marker::{
    LengthClass, BINARY, DOUBLE_BYTE, LARGE, LIST_EMPTY, LIST_END, LIST_START, LITERAL, MEDIUM,
};
use crate::error::{CodecError, Result};
use crate::protocol::dictionary::{Token, TokenDictionary};
use crate::protocol::node::{AttrValue, Content, Node};
use bytes::{BufMut, BytesMut};

/// Encoder bound to a token dictionary
#[derive(Debug, Clone, Copy)]
pub struct NodeEncoder<'d> {
    dictionary: &'d TokenDictionary,
    max_depth: usize,
}

impl<'d> NodeEncoder<'d> {
    pub fn new(dictionary: &'d TokenDictionary) -> Self {
        Self {
            dictionary,
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }

    /// Reject trees nested deeper than `max_depth` (the root is depth 1)
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    /// Exact number of bytes `node` encodes to.
    ///
    /// # Errors
    /// `DepthExceeded` for trees deeper than the limit, `Encoding` for a
    /// value longer than `u32::MAX` bytes.
    pub fn encoded_len(&self, node: &Node) -> Result<usize> {
        self.node_len(node, 1)
    }

    /// Encode into a freshly allocated, exactly sized buffer
    pub fn encode(&self, node: &Node) -> Result<Vec<u8>> {
        let len = self.encoded_len(node)?;
        let mut buf = Vec::with_capacity(len);
        self.write_node(node, &mut buf, 1)?;
        debug_assert_eq!(buf.len(), len);
        Ok(buf)
    }

    /// Append the encoding of `node` to `dst`, reserving the exact size
    /// first. Returns the number of bytes written.
    pub fn encode_into(&self, node: &Node, dst: &mut BytesMut) -> Result<usize> {
        let len = self.encoded_len(node)?;
        dst.reserve(len);
        self.put_node(node, dst)?;
        Ok(len)
    }

    /// Write `node` to any buffer. The tree is checked first, so nothing is
    /// written when encoding fails.
    pub fn write<B: BufMut>(&self, node: &Node, dst: &mut B) -> Result<()> {
        self.encoded_len(node)?;
        self.put_node(node, dst)
    }

    /// Write a node that already passed `encoded_len`
    pub(crate) fn put_node<B: BufMut>(&self, node: &Node, dst: &mut B) -> Result<()> {
        self.write_node(node, dst, 1)
    }

    fn check_depth(&self, depth: usize) -> Result<()> {
        if depth > self.max_depth {
            return Err(CodecError::DepthExceeded(self.max_depth));
        }
        Ok(())
    }

    fn node_len(&self, node: &Node, depth: usize) -> Result<usize> {
        self.check_depth(depth)?;

        // list-start + list-end
        let mut len = 2;
        len += self.tag_len(&node.tag)?;
        len += LengthClass::for_len(node.attrs.len())?.prefix_len();
        for (key, value) in node.attrs.iter() {
            len += string_len(key)?;
            len += match value {
                AttrValue::Text(s) => string_len(s)?,
                AttrValue::Binary(b) => binary_len(b)?,
            };
        }

        len += match &node.content {
            Content::Absent => 0,
            Content::Text(s) => string_len(s)?,
            Content::Binary(b) => binary_len(b)?,
            Content::Children(children) if children.is_empty() => 1,
            Content::Children(children) => {
                let mut total = 0;
                for child in children {
                    total += self.node_len(child, depth + 1)?;
                }
                total
            }
        };
        Ok(len)
    }

    fn tag_len(&self, tag: &str) -> Result<usize> {
        match self.dictionary.token(tag) {
            Some(Token::Single(_)) => Ok(1),
            Some(Token::Double(_)) => Ok(2),
            None => Ok(1 + string_len(tag)?),
        }
    }

    fn write_node<B: BufMut>(&self, node: &Node, buf: &mut B, depth: usize) -> Result<()> {
        self.check_depth(depth)?;

        buf.put_u8(LIST_START);
        self.write_tag(&node.tag, buf)?;

        put_length(buf, node.attrs.len())?;
        for (key, value) in node.attrs.iter() {
            put_string(buf, key)?;
            match value {
                AttrValue::Text(s) => put_string(buf, s)?,
                AttrValue::Binary(b) => put_binary(buf, b)?,
            }
        }

        match &node.content {
            Content::Absent => {}
            Content::Text(s) => put_string(buf, s)?,
            Content::Binary(b) => put_binary(buf, b)?,
            Content::Children(children) if children.is_empty() => buf.put_u8(LIST_EMPTY),
            Content::Children(children) => {
                for child in children {
                    self.write_node(child, buf, depth + 1)?;
                }
            }
        }

        buf.put_u8(LIST_END);
        Ok(())
    }

    fn write_tag<B: BufMut>(&self, tag: &str, buf: &mut B) -> Result<()> {
        match self.dictionary.token(tag) {
            Some(Token::Single(code)) => buf.put_u8(code),
            Some(Token::Double(idx)) => {
                buf.put_u8(DOUBLE_BYTE);
                buf.put_u8(idx);
            }
            None => {
                buf.put_u8(LITERAL);
                put_string(buf, tag)?;
            }
        }
        Ok(())
    }
}

/// Encode `node` with the default depth limit
pub fn encode(node: &Node, dictionary: &TokenDictionary) -> Result<Vec<u8>> {
    NodeEncoder::new(dictionary).encode(node)
}

fn string_len(s: &str) -> Result<usize> {
    Ok(LengthClass::for_len(s.len())?.prefix_len() + s.len())
}

fn binary_len(b: &[u8]) -> Result<usize> {
    Ok(1 + LengthClass::for_len(b.len())?.prefix_len() + b.len())
}

fn put_length<B: BufMut>(buf: &mut B, len: usize) -> Result<()> {
    match LengthClass::for_len(len)? {
        LengthClass::Small => buf.put_u8(len as u8),
        LengthClass::Medium => {
            buf.put_u8(MEDIUM);
            buf.put_u16(len as u16);
        }
        LengthClass::Large => {
            buf.put_u8(LARGE);
            buf.put_u32(len as u32);
        }
    }
    Ok(())
}

fn put_string<B: BufMut>(buf: &mut B, s: &str) -> Result<()> {
    put_length(buf, s.len())?;
    buf.put_slice(s.as_bytes());
    Ok(())
}

fn put_binary<B: BufMut>(buf: &mut B, b: &[u8]) -> Result<()> {
    buf.put_u8(BINARY);
    put_length(buf, b.len())?;
    buf.put_slice(b);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dict() -> TokenDictionary {
        TokenDictionary::new(["iq", "query"], ["offer"]).unwrap()
    }

    #[test]
    fn test_minimal_node() {
        let bytes = encode(&Node::new("iq"), &dict()).unwrap();
        assert_eq!(bytes, vec![LIST_START, 1, 0, LIST_END]);
    }

    #[test]
    fn test_empty_tag_is_zero_byte() {
        let bytes = encode(&Node::new(""), &dict()).unwrap();
        assert_eq!(bytes, vec![LIST_START, 0x00, 0, LIST_END]);
    }

    #[test]
    fn test_double_byte_tag() {
        let bytes = encode(&Node::new("offer"), &dict()).unwrap();
        assert_eq!(bytes, vec![LIST_START, DOUBLE_BYTE, 0, 0, LIST_END]);
    }

    #[test]
    fn test_literal_tag() {
        let bytes = encode(&Node::new("ab"), &dict()).unwrap();
        assert_eq!(bytes, vec![LIST_START, LITERAL, 2, b'a', b'b', 0, LIST_END]);
    }

    #[test]
    fn test_binary_attribute() {
        let node = Node::new("iq").with_attr("k", vec![9u8, 8]);
        let bytes = encode(&node, &dict()).unwrap();
        assert_eq!(
            bytes,
            vec![LIST_START, 1, 1, 1, b'k', BINARY, 2, 9, 8, LIST_END]
        );
    }

    #[test]
    fn test_empty_children_marker() {
        let node = Node::new("iq").with_children(Vec::new());
        let bytes = encode(&node, &dict()).unwrap();
        assert_eq!(bytes, vec![LIST_START, 1, 0, LIST_EMPTY, LIST_END]);
    }

    #[test]
    fn test_reserved_length_uses_medium_form() {
        let text = "x".repeat(LIST_START as usize);
        let bytes = encode(&Node::new("iq").with_text(text), &dict()).unwrap();
        assert_eq!(&bytes[..6], &[LIST_START, 1, 0, MEDIUM, 0x00, 0xF8]);
        assert_eq!(bytes.len(), 3 + 3 + 248 + 1);
    }

    #[test]
    fn test_encoded_len_matches_output() {
        let node = Node::new("iq")
            .with_attr("id", "42")
            .with_attr("blob", vec![0u8; 300])
            .with_child(Node::new("query").with_text("a".repeat(70_000)))
            .with_child(Node::new("unknown").with_binary(vec![1u8; 249]));
        let dictionary = dict();
        let encoder = NodeEncoder::new(&dictionary);
        let bytes = encoder.encode(&node).unwrap();
        assert_eq!(encoder.encoded_len(&node).unwrap(), bytes.len());
        assert_eq!(bytes.capacity(), bytes.len());
    }

    #[test]
    fn test_encode_into_appends() {
        let dictionary = dict();
        let encoder = NodeEncoder::new(&dictionary);
        let mut dst = BytesMut::from(&b"prefix"[..]);
        let written = encoder.encode_into(&Node::new("query"), &mut dst).unwrap();
        assert_eq!(written, 4);
        assert_eq!(&dst[..], &[b'p', b'r', b'e', b'f', b'i', b'x', LIST_START, 2, 0, LIST_END]);
    }

    #[test]
    fn test_depth_limit_on_encode() {
        let mut node = Node::new("leaf");
        for _ in 0..4 {
            node = Node::new("wrap").with_child(node);
        }
        let dictionary = dict();
        let encoder = NodeEncoder::new(&dictionary).with_max_depth(4);
        assert!(matches!(
            encoder.encode(&node),
            Err(CodecError::DepthExceeded(4))
        ));
        assert!(NodeEncoder::new(&dictionary).with_max_depth(5).encode(&node).is_ok());
    }

    #[test]
    fn test_write_leaves_buffer_untouched_on_error() {
        let mut node = Node::new("leaf").with_text("payload");
        for _ in 0..4 {
            node = Node::new("wrap").with_attr("k", "v").with_child(node);
        }
        let dictionary = dict();
        let encoder = NodeEncoder::new(&dictionary).with_max_depth(3);

        let mut dst = b"keep".to_vec();
        assert!(matches!(
            encoder.write(&node, &mut dst),
            Err(CodecError::DepthExceeded(3))
        ));
        assert_eq!(dst, b"keep");

        let mut dst = BytesMut::new();
        assert!(encoder.write(&node, &mut dst).is_err());
        assert!(dst.is_empty());
    }
}
