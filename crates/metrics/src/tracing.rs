use std::sync::Arc;
use tracing::{field::Visit, span, Event, Level, Subscriber};
use tracing_subscriber::{
    fmt,
    layer::{Context, SubscriberExt},
    registry::LookupSpan,
    util::SubscriberInitExt,
    EnvFilter, Layer,
};

use crate::collector::MetricsCollector;

/// Initialize tracing with metrics integration: a JSON-formatted fmt layer,
/// an `EnvFilter` defaulting to `info`, and a layer that counts `ERROR`-level
/// events against the build-warning metric so dashboards can alert on log
/// volume without a separate log-scraping pipeline.
pub fn init_tracing_with_metrics(collector: Arc<MetricsCollector>) -> Result<(), TracingError> {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,pathfinder=debug"));

    let fmt_layer = fmt::layer()
        .with_target(true)
        .with_thread_ids(true)
        .with_level(true)
        .json();

    let metrics_layer = MetricsLayer::new(collector);

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer)
        .with(metrics_layer)
        .try_init()
        .map_err(|e| TracingError::InitError(e.to_string()))?;

    Ok(())
}

/// Tracing layer that records a build-warning metric for every `ERROR`-level
/// event carrying a `kind` field, so structured logs and metrics stay
/// consistent without duplicating call sites.
pub struct MetricsLayer {
    collector: Arc<MetricsCollector>,
}

impl MetricsLayer {
    pub fn new(collector: Arc<MetricsCollector>) -> Self {
        Self { collector }
    }
}

impl<S> Layer<S> for MetricsLayer
where
    S: Subscriber + for<'a> LookupSpan<'a>,
{
    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        let metadata = event.metadata();
        if *metadata.level() == Level::ERROR {
            let mut visitor = KindVisitor::default();
            event.record(&mut visitor);
            let kind = visitor.kind.unwrap_or_else(|| metadata.target().to_string());
            self.collector.record_build_warning(&kind);
        }
    }
}

#[derive(Default)]
struct KindVisitor {
    kind: Option<String>,
}

impl Visit for KindVisitor {
    fn record_debug(&mut self, field: &tracing::field::Field, value: &dyn std::fmt::Debug) {
        if field.name() == "kind" {
            self.kind = Some(format!("{value:?}"));
        }
    }

    fn record_str(&mut self, field: &tracing::field::Field, value: &str) {
        if field.name() == "kind" {
            self.kind = Some(value.to_string());
        }
    }
}

/// Correlation ID for tracking a single route request across components.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CorrelationId(uuid::Uuid);

impl CorrelationId {
    pub fn new() -> Self {
        Self(uuid::Uuid::new_v4())
    }

    pub fn as_str(&self) -> String {
        self.0.to_string()
    }
}

impl Default for CorrelationId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for CorrelationId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Span context for a single `SolveRoute` call, entered once at the RPC
/// boundary so every log line the planner emits carries the same
/// correlation id and chain pair.
#[derive(Debug, Clone)]
pub struct RequestSpan {
    pub correlation_id: CorrelationId,
    pub from_chain: String,
    pub to_chain: String,
}

impl RequestSpan {
    pub fn new(from_chain: String, to_chain: String) -> Self {
        Self {
            correlation_id: CorrelationId::new(),
            from_chain,
            to_chain,
        }
    }

    pub fn enter(&self) -> tracing::span::EnteredSpan {
        tracing::info_span!(
            "solve_route",
            correlation_id = %self.correlation_id,
            from_chain = %self.from_chain,
            to_chain = %self.to_chain,
        )
        .entered()
    }
}

/// Error enrichment for adding request context to a propagated error.
pub trait ErrorContext {
    fn with_correlation_id(self, correlation_id: CorrelationId) -> Self;
    fn with_chain_pair(self, from_chain: &str, to_chain: &str) -> Self;
}

impl<T, E> ErrorContext for Result<T, E>
where
    E: std::fmt::Display,
{
    fn with_correlation_id(self, correlation_id: CorrelationId) -> Self {
        self.map_err(|e| {
            tracing::error!(correlation_id = %correlation_id, error = %e, "error occurred");
            e
        })
    }

    fn with_chain_pair(self, from_chain: &str, to_chain: &str) -> Self {
        self.map_err(|e| {
            tracing::error!(from_chain = %from_chain, to_chain = %to_chain, error = %e, "error occurred");
            e
        })
    }
}

/// Tracing error types
#[derive(Debug, thiserror::Error)]
pub enum TracingError {
    #[error("tracing initialization error: {0}")]
    InitError(String),
}
