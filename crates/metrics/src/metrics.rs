use lazy_static::lazy_static;
use prometheus::{
    register_histogram, register_histogram_vec, register_int_counter, register_int_counter_vec,
    register_int_gauge, register_int_gauge_vec, Histogram, HistogramVec, IntCounter, IntCounterVec,
    IntGauge, IntGaugeVec,
};

lazy_static! {
    // ═══════════════════════════════════════════════════════════════════════════
    // BUILD-PHASE METRICS (config-manager pipeline, spec §4.4)
    // ═══════════════════════════════════════════════════════════════════════════

    /// Total number of config builds started
    pub static ref BUILDS_STARTED: IntCounter = register_int_counter!(
        "pathfinder_builds_started_total",
        "Total number of enriched-config builds started"
    )
    .unwrap();

    /// Total number of config builds completed successfully
    pub static ref BUILDS_SUCCEEDED: IntCounter = register_int_counter!(
        "pathfinder_builds_succeeded_total",
        "Total number of enriched-config builds that completed successfully"
    )
    .unwrap();

    /// Total number of config builds that aborted
    pub static ref BUILDS_FAILED: IntCounter = register_int_counter!(
        "pathfinder_builds_failed_total",
        "Total number of enriched-config builds that aborted"
    )
    .unwrap();

    /// Build-phase duration histogram (in milliseconds), labeled by phase
    pub static ref BUILD_PHASE_DURATION: HistogramVec = register_histogram_vec!(
        "pathfinder_build_phase_duration_ms",
        "Duration of each config-manager build phase in milliseconds",
        &["phase"],
        vec![10.0, 50.0, 100.0, 500.0, 1000.0, 5000.0, 30000.0]
    )
    .unwrap();

    /// Endpoints excluded by the consensus verifier, by reason
    pub static ref ENDPOINTS_EXCLUDED: IntCounterVec = register_int_counter_vec!(
        "pathfinder_endpoints_excluded_total",
        "Total candidate endpoints excluded by the consensus verifier",
        &["chain_id", "reason"]
    )
    .unwrap();

    /// Chains admitted into the enriched graph
    pub static ref CHAINS_ENRICHED: IntGauge = register_int_gauge!(
        "pathfinder_chains_enriched",
        "Number of chains present in the most recently built enriched graph"
    )
    .unwrap();

    /// Routes admitted into the enriched graph
    pub static ref ROUTES_ENRICHED: IntGauge = register_int_gauge!(
        "pathfinder_routes_enriched",
        "Number of IBC routes present in the most recently built enriched graph"
    )
    .unwrap();

    /// Build warnings, by kind (e.g. "broker_missing_contract")
    pub static ref BUILD_WARNINGS: IntCounterVec = register_int_counter_vec!(
        "pathfinder_build_warnings_total",
        "Total non-fatal warnings surfaced during a config build",
        &["kind"]
    )
    .unwrap();

    // ═══════════════════════════════════════════════════════════════════════════
    // PLANNER METRICS (route requests, spec §4.6)
    // ═══════════════════════════════════════════════════════════════════════════

    /// Total number of route requests received
    pub static ref ROUTE_REQUESTS: IntCounter = register_int_counter!(
        "pathfinder_route_requests_total",
        "Total number of SolveRoute requests received"
    )
    .unwrap();

    /// Route requests by outcome (direct / indirect / broker_swap / impossible)
    pub static ref ROUTE_OUTCOMES: IntCounterVec = register_int_counter_vec!(
        "pathfinder_route_outcomes_total",
        "Total route requests by resolved outcome",
        &["route_type"]
    )
    .unwrap();

    /// Planner end-to-end latency histogram (in milliseconds)
    pub static ref PLANNER_LATENCY: Histogram = register_histogram!(
        "pathfinder_planner_latency_ms",
        "SolveRoute planning latency in milliseconds",
        vec![1.0, 5.0, 10.0, 50.0, 100.0, 250.0, 500.0, 1000.0]
    )
    .unwrap();

    // ═══════════════════════════════════════════════════════════════════════════
    // BROKER CLIENT METRICS (spec §4.8)
    // ═══════════════════════════════════════════════════════════════════════════

    /// Total number of broker quote requests issued
    pub static ref BROKER_QUOTES_REQUESTED: IntCounterVec = register_int_counter_vec!(
        "pathfinder_broker_quotes_requested_total",
        "Total number of broker quote requests issued",
        &["broker_id"]
    )
    .unwrap();

    /// Broker quote request latency histogram (in milliseconds), per broker
    pub static ref BROKER_QUOTE_LATENCY: HistogramVec = register_histogram_vec!(
        "pathfinder_broker_quote_latency_ms",
        "Broker quote request latency in milliseconds",
        &["broker_id"],
        vec![10.0, 50.0, 100.0, 250.0, 500.0, 1000.0, 2000.0, 10000.0]
    )
    .unwrap();

    /// Broker quote failures, by broker and reason
    pub static ref BROKER_QUOTE_FAILURES: IntCounterVec = register_int_counter_vec!(
        "pathfinder_broker_quote_failures_total",
        "Total broker quote failures",
        &["broker_id", "reason"]
    )
    .unwrap();

    /// Broker endpoint health, per broker and URL (1=healthy, 0=unhealthy)
    pub static ref BROKER_ENDPOINT_HEALTH: IntGaugeVec = register_int_gauge_vec!(
        "pathfinder_broker_endpoint_health",
        "Broker endpoint health status (1=healthy, 0=unhealthy)",
        &["broker_id", "url"]
    )
    .unwrap();

    // ═══════════════════════════════════════════════════════════════════════════
    // SYSTEM METRICS
    // ═══════════════════════════════════════════════════════════════════════════

    /// Route index size: number of direct-route entries currently installed
    pub static ref ROUTE_INDEX_DIRECT_EDGES: IntGauge = register_int_gauge!(
        "pathfinder_route_index_direct_edges",
        "Number of direct-route entries in the currently installed route index"
    )
    .unwrap();

    /// System uptime in seconds
    pub static ref SYSTEM_UPTIME: IntCounter = register_int_counter!(
        "pathfinder_system_uptime_seconds",
        "System uptime in seconds"
    )
    .unwrap();
}
