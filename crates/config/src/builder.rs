//! The Enriched Config Builder (spec §4.4) and Output Converters (spec §4.6,
//! §6): joins human TOML + the IBC/wallet registries + verified endpoints
//! into the runtime [`ChainGraph`], then serialises it into the pathfinder
//! runtime config and the client-display config.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::time::Instant;

use pathfinder_engine::{compute_ibc_denom, extend_trace, ChainGraph};
use pathfinder_metrics::MetricsCollector;
use pathfinder_registry::{EndpointConsensusVerifier, RegistryIngestor};
use pathfinder_types::{Chain, IbcRoute, Token, TokenInfo};
use tracing::warn;

use crate::config::{
    ClientChain, ClientConfig, ClientToken, ConfigError, InputChainToml, PathfinderRuntimeConfig, Result,
    RuntimeChain, RuntimeRoute,
};
use crate::validation::validate_input_chains;

/// Non-fatal issues surfaced alongside a successful build (spec §4.4: "a
/// chain flagged broker without a contract address" and similar).
#[derive(Debug, Clone)]
pub struct BuildWarning(pub String);

pub struct BuildOptions {
    /// Skip endpoint consensus verification entirely and trust the first
    /// declared REST/RPC URL for each chain (CLI `--skip-network`).
    pub skip_network: bool,
    pub registry_dir: std::path::PathBuf,
    pub wallet_dir: std::path::PathBuf,
}

pub struct EnrichedConfigBuilder {
    ingestor: RegistryIngestor,
    verifier: EndpointConsensusVerifier,
    options: BuildOptions,
    metrics: Option<Arc<MetricsCollector>>,
}

impl EnrichedConfigBuilder {
    pub fn new(options: BuildOptions) -> Self {
        Self {
            ingestor: RegistryIngestor::new(&options.registry_dir, &options.wallet_dir),
            verifier: EndpointConsensusVerifier::new(),
            options,
            metrics: None,
        }
    }

    /// Attaches a metrics collector so build-phase durations, endpoint
    /// exclusions, and the overall build outcome are recorded (spec §15).
    pub fn with_metrics(mut self, metrics: Arc<MetricsCollector>) -> Self {
        self.metrics = Some(metrics);
        self
    }

    /// Runs the full build pipeline (spec §4.4). Validation errors abort
    /// the whole build (collected and reported together); an unrecoverable
    /// graph-consistency error (missing registry file, no healthy
    /// endpoints, duplicate id) also aborts. Non-fatal issues are returned
    /// as warnings alongside the graph.
    pub async fn build(&self, inputs: Vec<InputChainToml>) -> Result<(ChainGraph, Vec<BuildWarning>)> {
        if let Some(m) = &self.metrics {
            m.record_build_started();
        }

        let phase_started = Instant::now();
        let validation_errors = validate_input_chains(&inputs);
        if let Some(m) = &self.metrics {
            m.record_build_phase_duration("validation", phase_started.elapsed());
        }
        if !validation_errors.is_empty() {
            for e in &validation_errors {
                warn!(%e, "input validation error");
            }
            if let Some(m) = &self.metrics {
                m.record_build_failed();
            }
            return Err(ConfigError::BuildFailed(validation_errors.len()));
        }

        let mut warnings = Vec::new();
        let phase_started = Instant::now();
        let keywords: HashSet<String> = inputs.iter().map(|c| c.registry.clone()).collect();
        let pair_files = match self.ingestor.load_pair_files(&keywords) {
            Ok(pair_files) => pair_files,
            Err(e) => {
                if let Some(m) = &self.metrics {
                    m.record_build_failed();
                }
                return Err(e.into());
            }
        };
        let wallet_entries = self.ingestor.load_wallet_entries().unwrap_or_default();
        if let Some(m) = &self.metrics {
            m.record_build_phase_duration("registry_ingest", phase_started.elapsed());
        }

        let phase_started = Instant::now();
        if !self.options.skip_network {
            for input in &inputs {
                let rpc_candidates: Vec<String> = input.chain.rpcs.iter().map(|e| e.url.clone()).collect();
                if let Err(e) = self.verifier.verify(&input.id, &rpc_candidates).await {
                    if let Some(m) = &self.metrics {
                        m.record_endpoint_excluded(&input.id, "consensus_failed");
                        m.record_build_failed();
                    }
                    return Err(e.into());
                }
            }
        }
        if let Some(m) = &self.metrics {
            m.record_build_phase_duration("endpoint_verification", phase_started.elapsed());
        }

        let mut chains_by_id: HashMap<String, Chain> = HashMap::new();
        for input in &inputs {
            if !wallet_entries.contains_key(&input.registry) {
                warnings.push(BuildWarning(format!(
                    "chain {} has no wallet-registry entry for keyword {}",
                    input.id, input.registry
                )));
                if let Some(m) = &self.metrics {
                    m.record_build_warning("missing_wallet_entry");
                }
            }
            if input.is_broker && input.ibc_hooks_contract.is_none() {
                warnings.push(BuildWarning(format!(
                    "chain {} is flagged is_broker but carries no ibc_hooks_contract",
                    input.id
                )));
                if let Some(m) = &self.metrics {
                    m.record_build_warning("missing_ibc_hooks_contract");
                }
            }

            let native_tokens: Vec<Token> = input
                .token
                .iter()
                .filter(|t| !t.denom.starts_with("ibc/"))
                .map(|t| Token {
                    denom: t.denom.clone(),
                    symbol: t.symbol.clone(),
                    decimals: t.exponent,
                    origin_chain_id: input.id.clone(),
                    base_denom: t.denom.clone(),
                    price_feed_id: t.coingecko_id.clone(),
                    allowed_destinations: t.allowed_destinations.clone(),
                })
                .collect();

            chains_by_id.insert(
                input.id.clone(),
                Chain {
                    id: input.id.clone(),
                    name: input.name.clone(),
                    bech32_prefix: input.bech32_prefix.clone(),
                    slip44: input.slip44,
                    has_pfm: input.has_pfm,
                    is_broker: input.is_broker,
                    broker_id: input.broker_id.clone(),
                    ibc_hooks_contract: input.ibc_hooks_contract.clone(),
                    native_tokens,
                    routes: Vec::new(),
                },
            );
        }

        // Unwind/passthrough tokens: an IBC token held on a chain whose
        // origin (or allowed_destinations) matters for edge inclusion, not
        // represented as a `native_token` since it isn't native here.
        let ibc_held_tokens: HashMap<String, Vec<&crate::config::InputToken>> = inputs
            .iter()
            .map(|c| (c.id.clone(), c.token.iter().filter(|t| t.denom.starts_with("ibc/")).collect()))
            .collect();

        let phase_started = Instant::now();
        for a in &inputs {
            for b in &inputs {
                if a.id >= b.id {
                    continue;
                }
                let Ok(pair_file) = self.ingestor.pair_file_for(&pair_files, &a.registry, &b.registry) else {
                    warnings.push(BuildWarning(format!("no registry entry for pair ({}, {})", a.id, b.id)));
                    if let Some(m) = &self.metrics {
                        m.record_build_warning("no_registry_pair");
                        m.record_endpoint_excluded(&a.id, "no_registry_pair");
                    }
                    continue;
                };
                let Ok(channel) = pair_file.select_live_channel() else {
                    warnings.push(BuildWarning(format!("no live channel for pair ({}, {})", a.id, b.id)));
                    if let Some(m) = &self.metrics {
                        m.record_build_warning("no_live_channel");
                        m.record_endpoint_excluded(&a.id, "no_live_channel");
                    }
                    continue;
                };

                let (a_side, b_side) = if pair_file.chain_1.chain_name == a.registry {
                    (&channel.chain_1, &channel.chain_2)
                } else {
                    (&channel.chain_2, &channel.chain_1)
                };

                build_edge(&mut chains_by_id, a, b, &a_side.channel_id, &a_side.port_id, &ibc_held_tokens);
                build_edge(&mut chains_by_id, b, a, &b_side.channel_id, &b_side.port_id, &ibc_held_tokens);
            }
        }
        if let Some(m) = &self.metrics {
            m.record_build_phase_duration("edge_build", phase_started.elapsed());
        }

        let chain_count = chains_by_id.len() as i64;
        let graph = match ChainGraph::from_chains(chains_by_id.into_values().collect()) {
            Ok(graph) => graph,
            Err(e) => {
                if let Some(m) = &self.metrics {
                    m.record_build_failed();
                }
                return Err(e.into());
            }
        };
        let route_count: i64 = graph.chains().map(|c| c.routes.len() as i64).sum();
        if let Some(m) = &self.metrics {
            m.record_build_succeeded(chain_count, route_count);
        }
        Ok((graph, warnings))
    }

    pub fn to_runtime_config(&self, graph: &ChainGraph, generated_at: impl Into<String>) -> PathfinderRuntimeConfig {
        let mut chains: Vec<RuntimeChain> = graph
            .chains()
            .map(|chain| RuntimeChain {
                name: chain.name.clone(),
                id: chain.id.clone(),
                has_pfm: chain.has_pfm,
                broker: chain.is_broker,
                broker_id: chain.broker_id.clone(),
                ibc_hooks_contract: chain.ibc_hooks_contract.clone(),
                bech32_prefix: chain.bech32_prefix.clone(),
                native_tokens: chain.native_tokens.clone(),
                routes: chain
                    .routes
                    .iter()
                    .map(|r| RuntimeRoute {
                        to_chain: r.to_chain_id.clone(),
                        to_chain_id: r.to_chain_id.clone(),
                        connection_id: r.connection_id.clone(),
                        channel_id: r.channel_id.clone(),
                        port_id: r.port_id.clone(),
                        allowed_tokens: r.allowed_tokens.clone(),
                    })
                    .collect(),
            })
            .collect();
        chains.sort_by(|a, b| a.id.cmp(&b.id));

        PathfinderRuntimeConfig {
            version: pathfinder_types::PROTOCOL_VERSION.to_string(),
            generated_at: generated_at.into(),
            chains,
        }
    }

    pub fn to_client_config(
        &self,
        graph: &ChainGraph,
        inputs: &[InputChainToml],
        generated_at: impl Into<String>,
    ) -> Result<ClientConfig> {
        let wallet_entries = self.ingestor.load_wallet_entries().unwrap_or_default();
        let by_id: HashMap<&str, &InputChainToml> = inputs.iter().map(|c| (c.id.as_str(), c)).collect();

        let mut chains = Vec::new();
        let mut all_tokens = Vec::new();
        let mut chain_ids: Vec<&str> = graph.chain_ids().collect();
        chain_ids.sort_unstable();

        for chain_id in chain_ids {
            let chain = graph.require(chain_id)?;
            let Some(input) = by_id.get(chain_id) else { continue };
            let wallet = wallet_entries.get(&input.registry);

            chains.push(ClientChain {
                id: chain.id.clone(),
                name: chain.name.clone(),
                bech32_prefix: chain.bech32_prefix.clone(),
                explorer_details: input.explorer_details.clone(),
                wallet_currencies: wallet.map(|w| w.currencies.clone()).unwrap_or_default(),
                rpc: wallet.and_then(|w| w.rpc.clone()),
                rest: wallet.and_then(|w| w.rest.clone()),
            });

            for token in &input.token {
                all_tokens.push(ClientToken {
                    chain_id: chain.id.clone(),
                    denom: token.denom.clone(),
                    symbol: token.symbol.clone(),
                    decimals: token.exponent,
                    icon: token.icon.clone(),
                    coingecko_id: token.coingecko_id.clone(),
                });
            }
        }

        Ok(ClientConfig {
            version: pathfinder_types::PROTOCOL_VERSION.to_string(),
            generated_at: generated_at.into(),
            chains,
            all_tokens,
        })
    }
}

/// Builds the outgoing edge `from -> to` on `chains_by_id`, applying the
/// three allow-list inclusion rules of spec §4.4 step 3: native forward,
/// unwind, and explicit passthrough.
fn build_edge(
    chains_by_id: &mut HashMap<String, Chain>,
    from: &InputChainToml,
    to: &InputChainToml,
    channel_id: &str,
    port_id: &str,
    ibc_held_tokens: &HashMap<String, Vec<&crate::config::InputToken>>,
) {
    let mut allowed_tokens = HashMap::new();

    // Rule (a): native forward.
    for token in &from.token {
        if token.denom.starts_with("ibc/") {
            continue;
        }
        if let Some(allow) = &token.allowed_destinations {
            if !allow.iter().any(|d| d == &to.id) {
                continue;
            }
        }
        let trace = extend_trace("", port_id, channel_id);
        let ibc_denom = compute_ibc_denom(&trace, &token.denom);
        allowed_tokens.insert(
            token.denom.clone(),
            TokenInfo {
                source_denom: token.denom.clone(),
                ibc_denom,
                base_denom: token.denom.clone(),
                origin_chain_id: from.id.clone(),
                symbol: token.symbol.clone(),
                decimals: token.exponent,
                is_native: true,
            },
        );
    }

    // Rules (b)/(c): IBC tokens held on `from` either unwind back to their
    // origin chain, or pass through via an explicit allow-list entry.
    if let Some(held) = ibc_held_tokens.get(&from.id) {
        for token in held {
            let origin_chain = token.origin_chain.as_deref().unwrap_or_default();
            let origin_denom = token.origin_denom.as_deref().unwrap_or_default();

            let is_unwind = origin_chain == to.id;
            let is_passthrough = token
                .allowed_destinations
                .as_ref()
                .map(|d| d.iter().any(|dest| dest == &to.id))
                .unwrap_or(false);

            if !is_unwind && !is_passthrough {
                continue;
            }

            let ibc_denom = if is_unwind {
                origin_denom.to_string()
            } else {
                let trace = extend_trace("", port_id, channel_id);
                compute_ibc_denom(&trace, origin_denom)
            };

            allowed_tokens.insert(
                token.denom.clone(),
                TokenInfo {
                    source_denom: token.denom.clone(),
                    ibc_denom,
                    base_denom: origin_denom.to_string(),
                    origin_chain_id: origin_chain.to_string(),
                    symbol: token.symbol.clone(),
                    decimals: token.exponent,
                    is_native: is_unwind,
                },
            );
        }
    }

    if let Some(chain) = chains_by_id.get_mut(&from.id) {
        chain.routes.push(IbcRoute {
            to_chain_id: to.id.clone(),
            connection_id: format!("connection-{channel_id}"),
            channel_id: channel_id.to_string(),
            port_id: port_id.to_string(),
            allowed_tokens,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{ChainEndpoints, EndpointEntry, InputToken};

    fn cosmoshub() -> InputChainToml {
        InputChainToml {
            name: "Cosmos Hub".to_string(),
            id: "cosmoshub-4".to_string(),
            chain_type: "cosmos".to_string(),
            registry: "cosmoshub".to_string(),
            bech32_prefix: "cosmos".to_string(),
            slip44: 118,
            cosmos_sdk_version: "0.50".to_string(),
            is_broker: false,
            broker_id: None,
            has_pfm: true,
            ibc_hooks_contract: None,
            explorer_details: None,
            chain: ChainEndpoints {
                rest: vec![EndpointEntry { url: "https://rest.cosmos.example".to_string(), provider: None }],
                rpcs: vec![EndpointEntry { url: "https://rpc.cosmos.example".to_string(), provider: None }],
            },
            token: vec![InputToken {
                denom: "uatom".to_string(),
                name: "Cosmos Hub Atom".to_string(),
                symbol: "ATOM".to_string(),
                exponent: 6,
                icon: String::new(),
                origin_chain: None,
                origin_denom: None,
                allowed_destinations: None,
                coingecko_id: Some("cosmos".to_string()),
            }],
        }
    }

    fn osmosis() -> InputChainToml {
        InputChainToml {
            name: "Osmosis".to_string(),
            id: "osmosis-1".to_string(),
            chain_type: "cosmos".to_string(),
            registry: "osmosis".to_string(),
            bech32_prefix: "osmo".to_string(),
            slip44: 118,
            cosmos_sdk_version: "0.50".to_string(),
            is_broker: true,
            broker_id: Some("osmosis-sqs".to_string()),
            has_pfm: true,
            ibc_hooks_contract: Some("osmo1contract".to_string()),
            explorer_details: None,
            chain: ChainEndpoints {
                rest: vec![EndpointEntry { url: "https://rest.osmosis.example".to_string(), provider: None }],
                rpcs: vec![EndpointEntry { url: "https://rpc.osmosis.example".to_string(), provider: None }],
            },
            token: vec![],
        }
    }

    #[test]
    fn build_edge_computes_native_forward_ibc_denom() {
        let mut chains_by_id = HashMap::new();
        chains_by_id.insert(
            "cosmoshub-4".to_string(),
            Chain {
                id: "cosmoshub-4".to_string(),
                name: "Cosmos Hub".to_string(),
                bech32_prefix: "cosmos".to_string(),
                slip44: 118,
                has_pfm: true,
                is_broker: false,
                broker_id: None,
                ibc_hooks_contract: None,
                native_tokens: vec![],
                routes: vec![],
            },
        );
        let from = cosmoshub();
        let to = osmosis();
        let ibc_held = HashMap::new();

        build_edge(&mut chains_by_id, &from, &to, "channel-141", "transfer", &ibc_held);

        let chain = &chains_by_id["cosmoshub-4"];
        assert_eq!(chain.routes.len(), 1);
        let info = &chain.routes[0].allowed_tokens["uatom"];
        assert_eq!(info.ibc_denom, compute_ibc_denom("transfer/channel-141", "uatom"));
        assert!(info.is_native);
    }

    #[test]
    fn build_edge_respects_allowed_destinations_exclusion() {
        let mut chains_by_id = HashMap::new();
        chains_by_id.insert(
            "cosmoshub-4".to_string(),
            Chain {
                id: "cosmoshub-4".to_string(),
                name: "Cosmos Hub".to_string(),
                bech32_prefix: "cosmos".to_string(),
                slip44: 118,
                has_pfm: true,
                is_broker: false,
                broker_id: None,
                ibc_hooks_contract: None,
                native_tokens: vec![],
                routes: vec![],
            },
        );
        let mut from = cosmoshub();
        from.token[0].allowed_destinations = Some(vec!["juno-1".to_string()]);
        let to = osmosis();
        let ibc_held = HashMap::new();

        build_edge(&mut chains_by_id, &from, &to, "channel-141", "transfer", &ibc_held);

        let chain = &chains_by_id["cosmoshub-4"];
        assert!(chain.routes[0].allowed_tokens.is_empty());
    }
}
