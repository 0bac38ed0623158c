//! Metrics and structured logging for the Cosmos IBC pathfinder.
//!
//! This crate provides Prometheus metrics for the config-manager build
//! pipeline and the planner's request path, plus a `tracing` initialization
//! helper that wires a JSON-formatted subscriber together with the metrics
//! registry.
//!
//! # Example
//!
//! ```no_run
//! use pathfinder_metrics::{MetricsCollector, MetricsServer};
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() {
//!     let collector = Arc::new(MetricsCollector::new());
//!     collector.record_build_started();
//!
//!     let server = MetricsServer::new(collector.clone(), "0.0.0.0:9090".to_string());
//!     server.serve().await.unwrap();
//! }
//! ```

pub mod collector;
pub mod http;
pub mod metrics;
pub mod tracing;

pub use collector::{MetricsCollector, MetricsError};
pub use tracing::{init_tracing_with_metrics, CorrelationId, ErrorContext, RequestSpan, TracingError};
