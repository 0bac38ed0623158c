//! The transport-agnostic service facade (spec §6): the four operations a
//! wire handler exposes over the engine (`solve_route`, `lookup_denom`,
//! `get_chain_info`, `get_supported_chains`). A thin tonic/Connect layer is
//! out of scope; this facade is what such a layer would wrap, so it already
//! returns the engine's typed errors rather than wire status codes.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;

use pathfinder_metrics::MetricsCollector;
use pathfinder_types::{Chain, DenomInfo, RouteRequest, RouteResponse};

use crate::denom::{DenomError, DenomResolver};
use crate::error::PlannerError;
use crate::graph::ChainGraph;
use crate::planner::Planner;
use crate::route_index::RouteIndex;
use crate::traits::BrokerClient;

/// Owns the graph, route index, and broker clients built by the Enriched
/// Config Builder for the lifetime of the process, and hands out the four
/// read-only operations a request handler needs.
pub struct PathfinderService {
    graph: ChainGraph,
    index: RouteIndex,
    brokers: HashMap<String, Arc<dyn BrokerClient>>,
    allow_live_denom_lookup: bool,
    metrics: Option<Arc<MetricsCollector>>,
}

impl PathfinderService {
    pub fn new(
        graph: ChainGraph,
        index: RouteIndex,
        brokers: HashMap<String, Arc<dyn BrokerClient>>,
        allow_live_denom_lookup: bool,
    ) -> Self {
        Self { graph, index, brokers, allow_live_denom_lookup, metrics: None }
    }

    pub fn with_metrics(mut self, metrics: Arc<MetricsCollector>) -> Self {
        self.metrics = Some(metrics);
        self
    }

    pub async fn solve_route(&self, request: &RouteRequest) -> Result<RouteResponse, PlannerError> {
        if let Some(m) = &self.metrics {
            m.record_route_request();
        }
        let started = Instant::now();
        let planner = Planner::new(&self.graph, &self.index, &self.brokers);
        let result = planner.plan(request).await;
        if let Some(m) = &self.metrics {
            if let Ok(response) = &result {
                m.record_route_outcome(route_type_label(response), started.elapsed());
            }
        }
        result
    }

    pub fn lookup_denom(&self, chain_id: &str, denom: &str) -> Result<DenomInfo, DenomError> {
        let resolver = DenomResolver::new(self.graph.as_map(), self.allow_live_denom_lookup);
        resolver.resolve(chain_id, denom).ok_or_else(|| DenomError::Unknown(denom.to_string(), chain_id.to_string()))
    }

    pub fn get_chain_info(&self, chain_id: &str) -> Option<&Chain> {
        self.graph.get(chain_id)
    }

    pub fn get_supported_chains(&self) -> Vec<&str> {
        let mut ids: Vec<&str> = self.graph.chain_ids().collect();
        ids.sort_unstable();
        ids
    }
}

fn route_type_label(response: &RouteResponse) -> &'static str {
    match response {
        RouteResponse::Direct { .. } => "direct",
        RouteResponse::Indirect { .. } => "indirect",
        RouteResponse::BrokerSwap { .. } => "broker_swap",
        RouteResponse::Impossible { .. } => "impossible",
    }
}
