use std::time::Duration;

use prometheus::{Encoder, Registry, TextEncoder};

use crate::metrics::*;

/// Metrics collector for the pathfinder: build-phase outcomes, planner
/// outcomes, and broker-client health, exported in Prometheus text format.
pub struct MetricsCollector {
    registry: Registry,
}

impl MetricsCollector {
    /// Create a new metrics collector with default registry
    pub fn new() -> Self {
        let registry = Registry::new();
        Self { registry }
    }

    /// Create a new metrics collector with custom registry
    pub fn with_registry(registry: Registry) -> Self {
        Self { registry }
    }

    // ═══════════════════════════════════════════════════════════════════════════
    // BUILD-PHASE METRICS
    // ═══════════════════════════════════════════════════════════════════════════

    pub fn record_build_started(&self) {
        BUILDS_STARTED.inc();
    }

    pub fn record_build_succeeded(&self, chains: i64, routes: i64) {
        BUILDS_SUCCEEDED.inc();
        CHAINS_ENRICHED.set(chains);
        ROUTES_ENRICHED.set(routes);
    }

    pub fn record_build_failed(&self) {
        BUILDS_FAILED.inc();
    }

    pub fn record_build_phase_duration(&self, phase: &str, duration: Duration) {
        BUILD_PHASE_DURATION
            .with_label_values(&[phase])
            .observe(duration.as_millis() as f64);
    }

    pub fn record_endpoint_excluded(&self, chain_id: &str, reason: &str) {
        ENDPOINTS_EXCLUDED.with_label_values(&[chain_id, reason]).inc();
    }

    pub fn record_build_warning(&self, kind: &str) {
        BUILD_WARNINGS.with_label_values(&[kind]).inc();
    }

    // ═══════════════════════════════════════════════════════════════════════════
    // PLANNER METRICS
    // ═══════════════════════════════════════════════════════════════════════════

    pub fn record_route_request(&self) {
        ROUTE_REQUESTS.inc();
    }

    pub fn record_route_outcome(&self, route_type: &str, latency: Duration) {
        ROUTE_OUTCOMES.with_label_values(&[route_type]).inc();
        PLANNER_LATENCY.observe(latency.as_millis() as f64);
    }

    // ═══════════════════════════════════════════════════════════════════════════
    // BROKER CLIENT METRICS
    // ═══════════════════════════════════════════════════════════════════════════

    pub fn record_broker_quote_requested(&self, broker_id: &str) {
        BROKER_QUOTES_REQUESTED.with_label_values(&[broker_id]).inc();
    }

    pub fn record_broker_quote_latency(&self, broker_id: &str, latency: Duration) {
        BROKER_QUOTE_LATENCY
            .with_label_values(&[broker_id])
            .observe(latency.as_millis() as f64);
    }

    pub fn record_broker_quote_failure(&self, broker_id: &str, reason: &str) {
        BROKER_QUOTE_FAILURES.with_label_values(&[broker_id, reason]).inc();
    }

    pub fn set_broker_endpoint_health(&self, broker_id: &str, url: &str, healthy: bool) {
        BROKER_ENDPOINT_HEALTH
            .with_label_values(&[broker_id, url])
            .set(if healthy { 1 } else { 0 });
    }

    // ═══════════════════════════════════════════════════════════════════════════
    // SYSTEM METRICS
    // ═══════════════════════════════════════════════════════════════════════════

    pub fn set_route_index_size(&self, direct_edges: i64) {
        ROUTE_INDEX_DIRECT_EDGES.set(direct_edges);
    }

    pub fn increment_uptime(&self) {
        SYSTEM_UPTIME.inc();
    }

    // ═══════════════════════════════════════════════════════════════════════════
    // EXPORT
    // ═══════════════════════════════════════════════════════════════════════════

    /// Export metrics in Prometheus text format
    pub fn export_metrics(&self) -> Result<String, MetricsError> {
        let encoder = TextEncoder::new();
        let metric_families = prometheus::gather();
        let mut buffer = Vec::new();
        encoder
            .encode(&metric_families, &mut buffer)
            .map_err(|e| MetricsError::EncodingError(e.to_string()))?;

        String::from_utf8(buffer).map_err(|e| MetricsError::EncodingError(e.to_string()))
    }

    /// Direct access to the custom registry, for collectors that register
    /// their own metric families instead of the process-global default.
    pub fn registry(&self) -> &Registry {
        &self.registry
    }
}

impl Default for MetricsCollector {
    fn default() -> Self {
        Self::new()
    }
}

/// Metrics error types
#[derive(Debug, thiserror::Error)]
pub enum MetricsError {
    #[error("encoding error: {0}")]
    EncodingError(String),
    #[error("registry error: {0}")]
    RegistryError(String),
}
