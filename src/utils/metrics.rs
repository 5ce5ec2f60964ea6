//! Observability and Metrics
//!
//! Counters for the streaming codec: frames and bytes through each
//! direction, incomplete reads, and failures by kind.
//!
//! Uses atomic counters so one collector can be shared across connections
//! behind an `Arc`.

use crate::error::CodecError;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Instant;
use tracing::info;

/// Metrics collector for codec operations
#[derive(Debug)]
pub struct CodecMetrics {
    /// Nodes written to the wire
    pub nodes_encoded: AtomicU64,
    /// Nodes read from the wire
    pub nodes_decoded: AtomicU64,
    /// Bytes written
    pub bytes_encoded: AtomicU64,
    /// Bytes consumed by successful decodes
    pub bytes_decoded: AtomicU64,
    /// Decode attempts that needed more input
    pub partial_reads: AtomicU64,
    /// Framing failures
    pub framing_errors: AtomicU64,
    /// Depth limit hits
    pub depth_errors: AtomicU64,
    /// Frames over the size limit
    pub oversized_frames: AtomicU64,
    /// Encode-side failures
    pub encode_errors: AtomicU64,
    start_time: Instant,
}

impl CodecMetrics {
    /// Create a new metrics collector
    pub fn new() -> Self {
        Self {
            nodes_encoded: AtomicU64::new(0),
            nodes_decoded: AtomicU64::new(0),
            bytes_encoded: AtomicU64::new(0),
            bytes_decoded: AtomicU64::new(0),
            partial_reads: AtomicU64::new(0),
            framing_errors: AtomicU64::new(0),
            depth_errors: AtomicU64::new(0),
            oversized_frames: AtomicU64::new(0),
            encode_errors: AtomicU64::new(0),
            start_time: Instant::now(),
        }
    }

    /// Record a node written to the wire
    pub fn node_encoded(&self, byte_count: u64) {
        self.nodes_encoded.fetch_add(1, Ordering::Relaxed);
        self.bytes_encoded.fetch_add(byte_count, Ordering::Relaxed);
    }

    /// Record a node read from the wire
    pub fn node_decoded(&self, byte_count: u64) {
        self.nodes_decoded.fetch_add(1, Ordering::Relaxed);
        self.bytes_decoded.fetch_add(byte_count, Ordering::Relaxed);
    }

    /// Record a decode attempt that stopped for lack of input
    pub fn partial_read(&self) {
        self.partial_reads.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a decode failure under the matching counter
    pub fn decode_error(&self, err: &CodecError) {
        let counter = match err {
            CodecError::DepthExceeded(_) => &self.depth_errors,
            CodecError::OversizedFrame(_) => &self.oversized_frames,
            _ => &self.framing_errors,
        };
        counter.fetch_add(1, Ordering::Relaxed);
    }

    /// Record an encode failure
    pub fn encode_error(&self) {
        self.encode_errors.fetch_add(1, Ordering::Relaxed);
    }

    /// Get current metrics snapshot
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            nodes_encoded: self.nodes_encoded.load(Ordering::Relaxed),
            nodes_decoded: self.nodes_decoded.load(Ordering::Relaxed),
            bytes_encoded: self.bytes_encoded.load(Ordering::Relaxed),
            bytes_decoded: self.bytes_decoded.load(Ordering::Relaxed),
            partial_reads: self.partial_reads.load(Ordering::Relaxed),
            framing_errors: self.framing_errors.load(Ordering::Relaxed),
            depth_errors: self.depth_errors.load(Ordering::Relaxed),
            oversized_frames: self.oversized_frames.load(Ordering::Relaxed),
            encode_errors: self.encode_errors.load(Ordering::Relaxed),
            uptime_seconds: self.start_time.elapsed().as_secs(),
        }
    }

    /// Log current metrics
    pub fn log_metrics(&self) {
        let snapshot = self.snapshot();
        info!(
            nodes_encoded = snapshot.nodes_encoded,
            nodes_decoded = snapshot.nodes_decoded,
            bytes_encoded = snapshot.bytes_encoded,
            bytes_decoded = snapshot.bytes_decoded,
            partial_reads = snapshot.partial_reads,
            framing_errors = snapshot.framing_errors,
            depth_errors = snapshot.depth_errors,
            oversized_frames = snapshot.oversized_frames,
            encode_errors = snapshot.encode_errors,
            uptime_seconds = snapshot.uptime_seconds,
            "Codec metrics snapshot"
        );
    }
}

impl Default for CodecMetrics {
    fn default() -> Self {
        Self::new()
    }
}

/// Snapshot of metrics at a point in time
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MetricsSnapshot {
    pub nodes_encoded: u64,
    pub nodes_decoded: u64,
    pub bytes_encoded: u64,
    pub bytes_decoded: u64,
    pub partial_reads: u64,
    pub framing_errors: u64,
    pub depth_errors: u64,
    pub oversized_frames: u64,
    pub encode_errors: u64,
    pub uptime_seconds: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counters_accumulate() {
        let metrics = CodecMetrics::new();
        metrics.node_encoded(10);
        metrics.node_encoded(5);
        metrics.node_decoded(7);
        metrics.partial_read();

        let snap = metrics.snapshot();
        assert_eq!(snap.nodes_encoded, 2);
        assert_eq!(snap.bytes_encoded, 15);
        assert_eq!(snap.nodes_decoded, 1);
        assert_eq!(snap.bytes_decoded, 7);
        assert_eq!(snap.partial_reads, 1);
    }

    #[test]
    fn test_errors_bucketed_by_kind() {
        let metrics = CodecMetrics::new();
        metrics.decode_error(&CodecError::DepthExceeded(8));
        metrics.decode_error(&CodecError::OversizedFrame(1 << 30));
        metrics.decode_error(&CodecError::Framing("expected list-end".into()));
        metrics.encode_error();

        let snap = metrics.snapshot();
        assert_eq!(snap.depth_errors, 1);
        assert_eq!(snap.oversized_frames, 1);
        assert_eq!(snap.framing_errors, 1);
        assert_eq!(snap.encode_errors, 1);
    }
}
