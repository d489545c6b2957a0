//! Prometheus metrics for the watch loop.
//!
//! Gated behind the `metrics` feature. The loop stays synchronous; the
//! HTTP exporter runs on its own thread with a tokio runtime, reading
//! from the shared registry.

mod collector;
mod server;

pub use collector::{MetricsError, MetricsRegistry, MetricsSnapshot};
pub use server::{MetricsServer, MetricsServerConfig, ServerError};
