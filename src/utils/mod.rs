//! # Utility Modules
//!
//! Supporting utilities around the codec.
//!
//! ## Components
//! - **Logging**: Structured logging setup via `tracing-subscriber`
//! - **Metrics**: Thread-safe counters for the streaming codec

pub mod logging;
pub mod metrics;

pub use metrics::{CodecMetrics, MetricsSnapshot};
