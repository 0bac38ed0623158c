//! The route index (spec §4.5): the pathfinder's query-time index, built
//! once from the enriched [`ChainGraph`] and read-only thereafter.

use crate::graph::ChainGraph;
use pathfinder_types::{IbcRoute, TokenInfo};
use std::collections::{HashMap, HashSet, VecDeque};

fn direct_key(from: &str, to: &str, denom: &str) -> String {
    format!("{}|{}|{}", from, to, denom)
}

/// Immutable post-build maps over the chain graph. All lookups are O(1) map
/// accesses except the bounded multi-hop search, which is BFS.
#[derive(Debug, Default)]
pub struct RouteIndex {
    direct_routes: HashMap<String, IbcRoute>,
    broker_routes: HashMap<String, HashMap<String, IbcRoute>>,
    chain_to_broker_routes: HashMap<String, HashMap<String, IbcRoute>>,
    denom_to_token_info: HashMap<String, HashMap<String, TokenInfo>>,
    pfm_chains: HashSet<String>,
    broker_chains: HashMap<String, String>,
}

/// One hop of a discovered multi-hop path: the route taken and the denom the
/// transferred token carries once it lands on `route.to_chain_id`.
#[derive(Debug, Clone)]
pub struct PathHop {
    pub route: IbcRoute,
    pub denom_on_arrival: String,
}

impl RouteIndex {
    pub fn build(graph: &ChainGraph) -> Self {
        let mut index = RouteIndex::default();

        let mut chain_ids: Vec<&str> = graph.chain_ids().collect();
        chain_ids.sort_unstable();

        for chain_id in &chain_ids {
            let chain = graph.get(chain_id).expect("chain_ids come from the graph");

            if chain.has_pfm {
                index.pfm_chains.insert(chain.id.clone());
            }
            if chain.is_broker {
                if let Some(broker_id) = &chain.broker_id {
                    index.broker_chains.insert(chain.id.clone(), broker_id.clone());
                }
            }

            let denom_map = index.denom_to_token_info.entry(chain.id.clone()).or_default();
            for token in &chain.native_tokens {
                denom_map.insert(
                    token.denom.clone(),
                    TokenInfo {
                        source_denom: token.denom.clone(),
                        ibc_denom: token.denom.clone(),
                        base_denom: token.base_denom.clone(),
                        origin_chain_id: token.origin_chain_id.clone(),
                        symbol: token.symbol.clone(),
                        decimals: token.decimals,
                        is_native: true,
                    },
                );
            }

            let mut routes = chain.routes.clone();
            routes.sort_by(|a, b| a.to_chain_id.cmp(&b.to_chain_id));

            for route in &routes {
                let mut denoms: Vec<&String> = route.allowed_tokens.keys().collect();
                denoms.sort_unstable();

                for denom in denoms {
                    let info = &route.allowed_tokens[denom];
                    index
                        .direct_routes
                        .insert(direct_key(&chain.id, &route.to_chain_id, denom), route.clone());

                    index
                        .denom_to_token_info
                        .entry(chain.id.clone())
                        .or_default()
                        .entry(denom.clone())
                        .or_insert_with(|| TokenInfo {
                            source_denom: denom.clone(),
                            ibc_denom: denom.clone(),
                            base_denom: info.base_denom.clone(),
                            origin_chain_id: info.origin_chain_id.clone(),
                            symbol: info.symbol.clone(),
                            decimals: info.decimals,
                            is_native: info.is_native,
                        });

                    if let Some(dest) = graph.get(&route.to_chain_id) {
                        if dest.is_broker {
                            index
                                .chain_to_broker_routes
                                .entry(chain.id.clone())
                                .or_default()
                                .entry(dest.id.clone())
                                .or_insert_with(|| route.clone());
                        }
                    }
                    if chain.is_broker {
                        index
                            .broker_routes
                            .entry(chain.id.clone())
                            .or_default()
                            .entry(route.to_chain_id.clone())
                            .or_insert_with(|| route.clone());
                    }
                }
            }
        }

        index
    }

    pub fn direct_route(&self, from: &str, to: &str, denom: &str) -> Option<&IbcRoute> {
        self.direct_routes.get(&direct_key(from, to, denom))
    }

    /// The broker kind (e.g. `"osmosis-sqs"`) a broker chain identifies as,
    /// used to select which [`crate::traits::BrokerClient`] implementation
    /// to dispatch a quote to. `None` for a chain that isn't a broker.
    pub fn broker_kind(&self, chain_id: &str) -> Option<&str> {
        self.broker_chains.get(chain_id).map(String::as_str)
    }

    pub fn is_broker(&self, chain_id: &str) -> bool {
        self.broker_chains.contains_key(chain_id)
    }

    pub fn has_pfm(&self, chain_id: &str) -> bool {
        self.pfm_chains.contains(chain_id)
    }

    pub fn broker_route_out(&self, broker: &str, to: &str) -> Option<&IbcRoute> {
        self.broker_routes.get(broker).and_then(|m| m.get(to))
    }

    pub fn chain_to_broker_route(&self, chain_id: &str, broker: &str) -> Option<&IbcRoute> {
        self.chain_to_broker_routes.get(chain_id).and_then(|m| m.get(broker))
    }

    pub fn token_info(&self, chain_id: &str, denom: &str) -> Option<&TokenInfo> {
        self.denom_to_token_info.get(chain_id).and_then(|m| m.get(denom))
    }

    pub fn broker_chain_ids(&self) -> impl Iterator<Item = &str> {
        self.broker_chains.keys().map(String::as_str)
    }

    /// BFS from `from` to `target`, chaining direct routes while tracking the
    /// denom the token carries at each hop. Bounded to `max_hops` additional
    /// hops beyond the first (so total path length is at most `max_hops + 1`
    /// edges). Ties are broken by destination chain-id lexicographic order,
    /// guaranteed by inserting edges in sorted order during [`Self::build`].
    fn bfs(&self, from: &str, from_denom: &str, target: &str, max_hops: usize) -> Option<Vec<PathHop>> {
        if from == target {
            return Some(Vec::new());
        }

        let mut visited: HashSet<String> = HashSet::new();
        visited.insert(from.to_string());

        let mut queue: VecDeque<(String, String, Vec<PathHop>)> = VecDeque::new();
        queue.push_back((from.to_string(), from_denom.to_string(), Vec::new()));

        while let Some((chain_id, denom, path)) = queue.pop_front() {
            if path.len() >= max_hops + 1 {
                continue;
            }

            let mut candidates: Vec<(&String, &IbcRoute)> = self
                .direct_routes
                .iter()
                .filter(|(key, _)| key.starts_with(&format!("{}|", chain_id)))
                .filter(|(key, _)| {
                    key.splitn(3, '|').nth(2).map(|d| d == denom).unwrap_or(false)
                })
                .collect();
            candidates.sort_by(|a, b| a.1.to_chain_id.cmp(&b.1.to_chain_id));

            for (_, route) in candidates {
                let next_chain = route.to_chain_id.clone();
                if visited.contains(&next_chain) {
                    continue;
                }
                let token_info = match route.allowed_tokens.get(&denom) {
                    Some(info) => info,
                    None => continue,
                };
                let mut new_path = path.clone();
                new_path.push(PathHop {
                    route: route.clone(),
                    denom_on_arrival: token_info.ibc_denom.clone(),
                });

                if next_chain == target {
                    return Some(new_path);
                }

                if new_path.len() < max_hops + 1 {
                    visited.insert(next_chain.clone());
                    queue.push_back((next_chain, token_info.ibc_denom.clone(), new_path));
                }
            }
        }

        None
    }

    /// Path from `from` carrying `denom` to arrive on `broker` with a denom
    /// the broker can swap. `max_hops` additional hops beyond the first,
    /// capped at 2 per spec §4.5.
    pub fn multi_hop_inbound(
        &self,
        from: &str,
        broker: &str,
        denom: &str,
        max_hops: usize,
    ) -> Option<Vec<PathHop>> {
        let capped = max_hops.min(2);
        let path = self.bfs(from, denom, broker, capped)?;
        if path.is_empty() {
            return None;
        }
        Some(path)
    }

    /// Symmetric to [`Self::multi_hop_inbound`]: path from `broker` carrying
    /// `denom_on_broker` to `to`.
    pub fn multi_hop_outbound(
        &self,
        broker: &str,
        to: &str,
        denom_on_broker: &str,
        max_hops: usize,
    ) -> Option<Vec<PathHop>> {
        let capped = max_hops.min(2);
        let path = self.bfs(broker, denom_on_broker, to, capped)?;
        if path.is_empty() {
            return None;
        }
        Some(path)
    }

    /// General-purpose bounded path search used by the indirect (same-token,
    /// no broker) planner rule: a chain of direct routes carrying the same
    /// base token from `from` to `to`, capped at 2 additional hops.
    pub fn path_between(&self, from: &str, to: &str, denom: &str, max_hops: usize) -> Option<Vec<PathHop>> {
        let capped = max_hops.min(2);
        let path = self.bfs(from, denom, to, capped)?;
        if path.is_empty() {
            return None;
        }
        Some(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::denom::compute_ibc_denom;
    use pathfinder_types::{Chain, Token};
    use std::collections::HashMap as Map;

    fn route(to: &str, channel: &str, denom: &str, info: TokenInfo) -> IbcRoute {
        let mut allowed = Map::new();
        allowed.insert(denom.to_string(), info);
        IbcRoute {
            to_chain_id: to.to_string(),
            connection_id: "connection-0".to_string(),
            channel_id: channel.to_string(),
            port_id: "transfer".to_string(),
            allowed_tokens: allowed,
        }
    }

    fn token_info(base: &str, origin: &str, ibc_denom: &str) -> TokenInfo {
        TokenInfo {
            source_denom: base.to_string(),
            ibc_denom: ibc_denom.to_string(),
            base_denom: base.to_string(),
            origin_chain_id: origin.to_string(),
            symbol: base.trim_start_matches('u').to_uppercase(),
            decimals: 6,
            is_native: origin == "self",
        }
    }

    fn three_chain_graph() -> ChainGraph {
        let atom_on_neutron = compute_ibc_denom("transfer/channel-1", "uatom");
        let atom_on_osmosis = compute_ibc_denom("transfer/channel-141", "uatom");

        let cosmoshub = Chain {
            id: "cosmoshub-4".to_string(),
            name: "Cosmos Hub".to_string(),
            bech32_prefix: "cosmos".to_string(),
            slip44: 118,
            has_pfm: true,
            is_broker: false,
            broker_id: None,
            ibc_hooks_contract: None,
            native_tokens: vec![Token {
                denom: "uatom".to_string(),
                symbol: "ATOM".to_string(),
                decimals: 6,
                origin_chain_id: "cosmoshub-4".to_string(),
                base_denom: "uatom".to_string(),
                price_feed_id: None,
                allowed_destinations: None,
            }],
            routes: vec![
                route("osmosis-1", "channel-141", "uatom", token_info("uatom", "cosmoshub-4", &atom_on_osmosis)),
                route("neutron-1", "channel-1", "uatom", token_info("uatom", "cosmoshub-4", &atom_on_neutron)),
            ],
        };
        let osmosis = Chain {
            id: "osmosis-1".to_string(),
            name: "Osmosis".to_string(),
            bech32_prefix: "osmo".to_string(),
            slip44: 118,
            has_pfm: true,
            is_broker: true,
            broker_id: Some("osmosis-sqs".to_string()),
            ibc_hooks_contract: Some("osmo1contract".to_string()),
            native_tokens: vec![],
            routes: vec![],
        };
        let neutron = Chain {
            id: "neutron-1".to_string(),
            name: "Neutron".to_string(),
            bech32_prefix: "neutron".to_string(),
            slip44: 118,
            has_pfm: true,
            is_broker: false,
            broker_id: None,
            ibc_hooks_contract: None,
            native_tokens: vec![],
            routes: vec![],
        };
        ChainGraph::from_chains(vec![cosmoshub, osmosis, neutron]).unwrap()
    }

    #[test]
    fn direct_route_lookup() {
        let graph = three_chain_graph();
        let index = RouteIndex::build(&graph);
        assert!(index.direct_route("cosmoshub-4", "osmosis-1", "uatom").is_some());
        assert!(index.direct_route("cosmoshub-4", "neutron-1", "uatom").is_some());
        assert!(index.direct_route("neutron-1", "osmosis-1", "uatom").is_none());
    }

    #[test]
    fn broker_bookkeeping() {
        let graph = three_chain_graph();
        let index = RouteIndex::build(&graph);
        assert!(index.is_broker("osmosis-1"));
        assert_eq!(index.broker_kind("osmosis-1"), Some("osmosis-sqs"));
        assert!(index.chain_to_broker_route("cosmoshub-4", "osmosis-1").is_some());
        assert!(index.has_pfm("cosmoshub-4"));
    }

    #[test]
    fn multi_hop_inbound_via_hub() {
        let graph = three_chain_graph();
        let index = RouteIndex::build(&graph);
        let path = index.multi_hop_inbound("neutron-1", "osmosis-1", "uatom", 2);
        assert!(path.is_none(), "neutron has no outgoing uatom route in this fixture");
    }
}
