//! # Streaming Node Codec
//!
//! `tokio_util` framing for a byte stream carrying back-to-back encoded nodes.
//!
//! Encoded nodes are self-delimiting, so no outer length header is needed.
//! A resumable frame scanner walks incoming bytes
//! once, across reads, and the full decoder runs only when the scanner has
//! seen a whole frame (or bytes that can never form one). Reassembling a
//! frame from many small reads therefore costs time linear in its size. A
//! buffered frame that grows past `max_frame_size` without completing is
//! rejected.
//!
//! The decoder expects each call's buffer to extend the previous one, minus
//! whatever it consumed itself, which is how `FramedRead` drives it.
//!
//! ## Usage
//! ```rust,no_run
//! use binary_node::core::codec::NodeCodec;
//! use binary_node::TokenDictionary;
//! use std::sync::Arc;
//! use tokio_util::codec::FramedRead;
//!
//! # async fn run(socket: tokio::net::TcpStream) {
//! let dictionary = Arc::new(TokenDictionary::new(["iq", "query"], ["offer"]).unwrap());
//! let _frames = FramedRead::new(socket, NodeCodec::new(dictionary));
//! # }
//! ```

use crate::config::{DEFAULT_MAX_DEPTH, MAX_FRAME_SIZE};
use crate::core::decoder::NodeDecoder;
use crate::core::encoder::NodeEncoder;
use crate::core::scanner::{FrameScanner, Scan};
use crate::error::{CodecError, Result};
use crate::protocol::dictionary::TokenDictionary;
use crate::protocol::node::Node;
use crate::utils::metrics::CodecMetrics;
use bytes::{Buf, BytesMut};
use std::sync::Arc;
use tokio_util::codec::{Decoder, Encoder};
use tracing::{debug, trace};

/// Frames encoded nodes on a byte stream
#[derive(Debug, Clone)]
pub struct NodeCodec {
    dictionary: Arc<TokenDictionary>,
    max_depth: usize,
    max_frame_size: usize,
    metrics: Option<Arc<CodecMetrics>>,
    scanner: FrameScanner,
}

impl NodeCodec {
    pub fn new(dictionary: Arc<TokenDictionary>) -> Self {
        Self {
            dictionary,
            max_depth: DEFAULT_MAX_DEPTH,
            max_frame_size: MAX_FRAME_SIZE,
            metrics: None,
            scanner: FrameScanner::new(),
        }
    }

    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    pub fn with_max_frame_size(mut self, max_frame_size: usize) -> Self {
        self.max_frame_size = max_frame_size;
        self
    }

    /// Count frames, bytes and failures into a shared collector
    pub fn with_metrics(mut self, metrics: Arc<CodecMetrics>) -> Self {
        self.metrics = Some(metrics);
        self
    }

    pub fn dictionary(&self) -> &Arc<TokenDictionary> {
        &self.dictionary
    }

    pub fn max_frame_size(&self) -> usize {
        self.max_frame_size
    }

    fn reject(&mut self, err: CodecError) -> CodecError {
        self.scanner.reset();
        if let Some(metrics) = &self.metrics {
            metrics.decode_error(&err);
        }
        debug!(error = %err, "Dropping undecodable frame");
        err
    }
}

impl Decoder for NodeCodec {
    type Item = Node;
    type Error = CodecError;

    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<Node>> {
        if src.is_empty() {
            self.scanner.reset();
            return Ok(None);
        }

        if self.scanner.scan(&src[..], self.max_depth) == Scan::Incomplete {
            if src.len() > self.max_frame_size {
                return Err(self.reject(CodecError::OversizedFrame(src.len())));
            }
            if let Some(metrics) = &self.metrics {
                metrics.partial_read();
            }
            trace!(buffered = src.len(), "Incomplete node frame, waiting for more bytes");
            return Ok(None);
        }
        self.scanner.reset();

        let (result, consumed) = {
            let mut reader =
                NodeDecoder::new(&src[..], &self.dictionary).with_max_depth(self.max_depth);
            let result = reader.read_node();
            (result, reader.position())
        };

        match result {
            Ok(node) => {
                if consumed > self.max_frame_size {
                    return Err(self.reject(CodecError::OversizedFrame(consumed)));
                }
                src.advance(consumed);
                if let Some(metrics) = &self.metrics {
                    metrics.node_decoded(consumed as u64);
                }
                trace!(bytes = consumed, tag = %node.tag, "Decoded node frame");
                Ok(Some(node))
            }
            Err(err) if err.is_truncated() => {
                if src.len() > self.max_frame_size {
                    return Err(self.reject(CodecError::OversizedFrame(src.len())));
                }
                if let Some(metrics) = &self.metrics {
                    metrics.partial_read();
                }
                trace!(buffered = src.len(), "Incomplete node frame, waiting for more bytes");
                Ok(None)
            }
            Err(err) => Err(self.reject(err)),
        }
    }
}

impl<'a> Encoder<&'a Node> for NodeCodec {
    type Error = CodecError;

    fn encode(&mut self, item: &'a Node, dst: &mut BytesMut) -> Result<()> {
        let encoder = NodeEncoder::new(&self.dictionary).with_max_depth(self.max_depth);
        let len = encoder.encoded_len(item).and_then(|len| {
            if len > self.max_frame_size {
                Err(CodecError::OversizedFrame(len))
            } else {
                Ok(len)
            }
        });
        let len = match len {
            Ok(len) => len,
            Err(err) => {
                if let Some(metrics) = &self.metrics {
                    metrics.encode_error();
                }
                return Err(err);
            }
        };

        dst.reserve(len);
        encoder.put_node(item, dst)?;
        if let Some(metrics) = &self.metrics {
            metrics.node_encoded(len as u64);
        }
        trace!(bytes = len, tag = %item.tag, "Encoded node frame");
        Ok(())
    }
}

impl Encoder<Node> for NodeCodec {
    type Error = CodecError;

    fn encode(&mut self, item: Node, dst: &mut BytesMut) -> Result<()> {
        Encoder::<&Node>::encode(self, &item, dst)
    }
}
