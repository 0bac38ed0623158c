//! The planner (spec §4.6): classifies a `RouteRequest` into one of five
//! outcomes, in fixed rule order, synthesizing legs/memos as it goes.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

use cosmwasm_std::Uint128;
use pathfinder_memo::{
    build_pfm_forward, build_pfm_wrapping_wasm, build_pfm_wrapping_wasm_wrapping_pfm,
    build_wasm_swap_and_action, build_wasm_swap_and_action_with_nested_pfm,
    default_timeout_timestamp_ns, PfmHop, PostSwapAction, SwapOperationJson,
};
use pathfinder_types::{
    BrokerExecution, BrokerSwapPlan, DirectPlan, IbcLeg, IndirectPlan, RouteRequest, RouteResponse,
};

use crate::address::to_prefix;
use crate::error::PlannerError;
use crate::graph::ChainGraph;
use crate::route_index::{PathHop, RouteIndex};
use crate::traits::{BrokerClient, SwapOperation};

const MAX_ADDITIONAL_HOPS: usize = 2;

fn swap_ops_to_memo(ops: &[SwapOperation]) -> Vec<SwapOperationJson> {
    ops.iter()
        .map(|o| SwapOperationJson {
            pool_id: o.pool_id.clone(),
            denom_in: o.denom_in.clone(),
            denom_out: o.denom_out.clone(),
        })
        .collect()
}

fn now_unix_secs() -> u64 {
    SystemTime::now().duration_since(UNIX_EPOCH).map(|d| d.as_secs()).unwrap_or(0)
}

/// Applies the default (or requested) slippage tolerance to a broker's quoted
/// output, rounding down, per spec §8's invariant.
fn min_output_amount(amount_out: &str, slippage_bps: u32) -> Result<Uint128, PlannerError> {
    let amount_out: u128 = amount_out
        .parse()
        .map_err(|_| PlannerError::Internal(format!("broker returned non-numeric amount_out: {amount_out}")))?;
    let bps = 10_000u128.saturating_sub(slippage_bps as u128);
    Ok(Uint128::new(amount_out * bps / 10_000))
}

fn leg_from_hop(from_chain: &str, hop: &PathHop, receiver: String, amount: Uint128, memo: Option<String>) -> IbcLeg {
    let source_denom = hop.route.allowed_tokens.keys().next().cloned().unwrap_or_default();
    IbcLeg {
        from_chain: from_chain.to_string(),
        to_chain: hop.route.to_chain_id.clone(),
        channel_id: hop.route.channel_id.clone(),
        port_id: hop.route.port_id.clone(),
        denom: source_denom,
        is_native: false,
        amount,
        receiver,
        timeout_timestamp_ns: default_timeout_timestamp_ns(now_unix_secs()),
        memo,
    }
}

/// Builds the PFM-hop list for a multi-hop path: every intermediate receiver
/// is the literal `"pfm"`; only the last hop carries a real address (spec
/// §4.6's address-derivation rule).
fn pfm_hops_for_path(path: &[PathHop], final_receiver: &str) -> Vec<PfmHop> {
    let last = path.len() - 1;
    path.iter()
        .enumerate()
        .map(|(i, hop)| PfmHop {
            receiver: if i == last { final_receiver.to_string() } else { "pfm".to_string() },
            port_id: hop.route.port_id.clone(),
            channel_id: hop.route.channel_id.clone(),
        })
        .collect()
}

/// Classifies and plans a single `RouteRequest` against the enriched graph,
/// route index, and the set of broker clients keyed by broker kind (spec
/// §4.8's `broker_id` on a `Chain`).
pub struct Planner<'a> {
    graph: &'a ChainGraph,
    index: &'a RouteIndex,
    brokers: &'a HashMap<String, Arc<dyn BrokerClient>>,
}

impl<'a> Planner<'a> {
    pub fn new(
        graph: &'a ChainGraph,
        index: &'a RouteIndex,
        brokers: &'a HashMap<String, Arc<dyn BrokerClient>>,
    ) -> Self {
        Self { graph, index, brokers }
    }

    pub async fn plan(&self, request: &RouteRequest) -> Result<RouteResponse, PlannerError> {
        // Rule 1: same-chain no-op.
        if request.from_chain == request.to_chain && request.from_denom == request.to_denom {
            return Ok(RouteResponse::impossible(format!(
                "{} -> {} is a same-chain no-op (denom {} unchanged)",
                request.from_chain, request.to_chain, request.from_denom
            )));
        }

        // Rule 2: same-chain swap on a broker.
        if request.from_chain == request.to_chain {
            if let Some(plan) = self.plan_same_chain_swap(request).await? {
                return Ok(plan);
            }
        }

        // Rule 3: direct route.
        if let Some(plan) = self.plan_direct(request)? {
            return Ok(plan);
        }

        // Rule 4: indirect, same base token, multi-hop.
        if let Some(plan) = self.plan_indirect(request)? {
            return Ok(plan);
        }

        // Rule 5: broker swap, possibly with multi-hop inbound/outbound legs.
        if let Some(plan) = self.plan_broker_swap(request).await? {
            return Ok(plan);
        }

        // Rule 6: fallback.
        Ok(RouteResponse::impossible(format!(
            "no route from {} to {} carrying denom {} -> {}",
            request.from_chain, request.to_chain, request.from_denom, request.to_denom
        )))
    }

    async fn plan_same_chain_swap(&self, request: &RouteRequest) -> Result<Option<RouteResponse>, PlannerError> {
        let chain = self.graph.require(&request.from_chain)?;
        if !chain.is_broker || request.from_denom == request.to_denom {
            return Ok(None);
        }
        let broker_kind = chain.broker_id.as_deref().ok_or_else(|| {
            PlannerError::Internal(format!("chain {} is_broker but has no broker_id", chain.id))
        })?;
        let contract = chain.ibc_hooks_contract.as_deref().ok_or_else(|| {
            PlannerError::Internal(format!("broker chain {} has no ibc_hooks_contract", chain.id))
        })?;
        let client = self.broker_client(broker_kind)?;

        let quote = client
            .quote(&request.from_denom, &request.amount.to_string(), &request.to_denom, request.single_route)
            .await?;
        let min_out = min_output_amount(&quote.amount_out, request.slippage_bps_or_default())?;
        let ops = swap_ops_to_memo(&client.swap_operations(&quote)?);

        let memo = build_wasm_swap_and_action(
            contract,
            &ops,
            &request.to_denom,
            &min_out.to_string(),
            PostSwapAction::Transfer { to_address: request.receiver.clone() },
        )?;

        Ok(Some(RouteResponse::BrokerSwap {
            success: true,
            plan: BrokerSwapPlan {
                path: vec![chain.id.clone()],
                source_is_broker: true,
                swap_only: true,
                inbound_leg: None,
                outbound_leg: None,
                execution: BrokerExecution {
                    memo,
                    ibc_receiver: contract.to_string(),
                    recovery_address: request.sender.clone(),
                    min_output_amount: min_out,
                    uses_wasm: true,
                    description: format!("swap {} -> {} on {}", request.from_denom, request.to_denom, chain.id),
                },
            },
        }))
    }

    fn plan_direct(&self, request: &RouteRequest) -> Result<Option<RouteResponse>, PlannerError> {
        let Some(route) = self.index.direct_route(&request.from_chain, &request.to_chain, &request.from_denom) else {
            return Ok(None);
        };
        let Some(info) = route.allowed_tokens.get(&request.from_denom) else {
            return Ok(None);
        };
        if info.ibc_denom != request.to_denom {
            return Ok(None);
        }

        let dest_chain = self.graph.require(&request.to_chain)?;
        let receiver = to_prefix(&request.receiver, &dest_chain.bech32_prefix)?;

        let leg = IbcLeg {
            from_chain: request.from_chain.clone(),
            to_chain: request.to_chain.clone(),
            channel_id: route.channel_id.clone(),
            port_id: route.port_id.clone(),
            denom: request.from_denom.clone(),
            is_native: info.is_native,
            amount: request.amount,
            receiver,
            timeout_timestamp_ns: default_timeout_timestamp_ns(now_unix_secs()),
            memo: None,
        };

        Ok(Some(RouteResponse::Direct { success: true, plan: DirectPlan { leg } }))
    }

    fn plan_indirect(&self, request: &RouteRequest) -> Result<Option<RouteResponse>, PlannerError> {
        let Some(path) = self.index.path_between(
            &request.from_chain,
            &request.to_chain,
            &request.from_denom,
            MAX_ADDITIONAL_HOPS,
        ) else {
            return Ok(None);
        };
        if path.last().map(|h| h.denom_on_arrival.as_str()) != Some(request.to_denom.as_str()) {
            return Ok(None);
        }

        let dest_chain = self.graph.require(&request.to_chain)?;
        let final_receiver = to_prefix(&request.receiver, &dest_chain.bech32_prefix)?;

        let intermediates_have_pfm = path[..path.len() - 1]
            .iter()
            .all(|hop| self.index.has_pfm(&hop.route.to_chain_id));
        let intermediates_have_pfm = intermediates_have_pfm && {
            // The originating chain must also support PFM to forward, unless
            // the path is a single hop (no forwarding needed at all).
            path.len() == 1 || self.index.has_pfm(&request.from_chain)
        };

        let mut path_ids = vec![request.from_chain.clone()];
        path_ids.extend(path.iter().map(|h| h.route.to_chain_id.clone()));

        if intermediates_have_pfm && path.len() > 1 {
            let hops = pfm_hops_for_path(&path, &final_receiver);
            let memo = build_pfm_forward(&hops)?;
            let first = &path[0];
            let leg = IbcLeg {
                from_chain: request.from_chain.clone(),
                to_chain: first.route.to_chain_id.clone(),
                channel_id: first.route.channel_id.clone(),
                port_id: first.route.port_id.clone(),
                denom: request.from_denom.clone(),
                is_native: false,
                amount: request.amount,
                receiver: "pfm".to_string(),
                timeout_timestamp_ns: default_timeout_timestamp_ns(now_unix_secs()),
                memo: Some(memo),
            };
            return Ok(Some(RouteResponse::Indirect {
                success: true,
                plan: IndirectPlan { path: path_ids, legs: vec![leg], supports_pfm: true },
            }));
        }

        // No end-to-end PFM forwarding available: enumerate legs for the
        // caller to execute hop by hop, each addressed to the real recipient
        // on that hop's destination chain.
        let mut legs = Vec::with_capacity(path.len());
        let mut from = request.from_chain.clone();
        for hop in &path {
            let hop_dest = self.graph.require(&hop.route.to_chain_id)?;
            let receiver = to_prefix(&request.receiver, &hop_dest.bech32_prefix)?;
            legs.push(leg_from_hop(&from, hop, receiver, request.amount, None));
            from = hop.route.to_chain_id.clone();
        }

        Ok(Some(RouteResponse::Indirect {
            success: true,
            plan: IndirectPlan { path: path_ids, legs, supports_pfm: false },
        }))
    }

    async fn plan_broker_swap(&self, request: &RouteRequest) -> Result<Option<RouteResponse>, PlannerError> {
        struct Candidate {
            broker_id: String,
            inbound: Vec<PathHop>,
            denom_in: String,
            denom_out: String,
        }

        let mut candidates = Vec::new();
        for broker_id in self.index.broker_chain_ids() {
            let inbound = if broker_id == request.from_chain {
                Some(Vec::new())
            } else if let Some(route) = self.index.chain_to_broker_route(&request.from_chain, broker_id) {
                route.allowed_tokens.get(&request.from_denom).map(|info| {
                    vec![PathHop { route: route.clone(), denom_on_arrival: info.ibc_denom.clone() }]
                })
            } else {
                self.index.multi_hop_inbound(&request.from_chain, broker_id, &request.from_denom, MAX_ADDITIONAL_HOPS)
            };
            let Some(inbound) = inbound else { continue };
            let denom_in = inbound.last().map(|h| h.denom_on_arrival.clone()).unwrap_or_else(|| request.from_denom.clone());

            // Outbound path discovery (direct, single-hop, or multi-hop) is
            // deferred until after the quote, since the denom the swap
            // produces on the broker is only known then.
            candidates.push(Candidate {
                broker_id: broker_id.to_string(),
                inbound,
                denom_in,
                denom_out: request.to_denom.clone(),
            });
        }

        if candidates.is_empty() {
            return Ok(None);
        }

        struct Quoted {
            candidate_idx: usize,
            amount_out: u128,
            price_impact: String,
            min_out: Uint128,
            ops: Vec<SwapOperationJson>,
        }

        let mut quoted = Vec::new();
        for (idx, candidate) in candidates.iter().enumerate() {
            let Ok(client) = self.broker_client(&candidate.broker_id) else { continue };
            let quote_result = client
                .quote(&candidate.denom_in, &request.amount.to_string(), &candidate.denom_out, request.single_route)
                .await;
            let Ok(quote) = quote_result else { continue };
            let Ok(amount_out) = quote.amount_out.parse::<u128>() else { continue };
            let Ok(min_out) = min_output_amount(&quote.amount_out, request.slippage_bps_or_default()) else { continue };
            let Ok(ops) = client.swap_operations(&quote).map(|o| swap_ops_to_memo(&o)) else { continue };
            quoted.push(Quoted { candidate_idx: idx, amount_out, price_impact: quote.price_impact.clone(), min_out, ops });
        }

        if quoted.is_empty() {
            return Ok(None);
        }

        quoted.sort_by(|a, b| {
            b.amount_out
                .cmp(&a.amount_out)
                .then_with(|| a.price_impact.cmp(&b.price_impact))
                .then_with(|| candidates[a.candidate_idx].broker_id.cmp(&candidates[b.candidate_idx].broker_id))
        });
        let best = &quoted[0];
        let candidate = &candidates[best.candidate_idx];

        let broker_chain = self.graph.require(&candidate.broker_id)?;
        let contract = broker_chain.ibc_hooks_contract.as_deref().ok_or_else(|| {
            PlannerError::Internal(format!("broker chain {} has no ibc_hooks_contract", broker_chain.id))
        })?;
        let recovery_address = to_prefix(&request.sender, &broker_chain.bech32_prefix)?;

        let inbound_path = candidate.inbound.clone();
        let outbound_is_direct_to_dest = candidate.broker_id == request.to_chain;
        let mut outbound_path: Vec<PathHop> = Vec::new();

        let (memo, ibc_receiver, path_ids) = if inbound_path.len() <= 1 {
            // The source delivers straight to the broker in a single hop (or
            // already starts there): the wasm message carries the inbound
            // IBC transfer's memo directly, no PFM wrapping needed.
            let path_ids = vec![request.from_chain.clone(), candidate.broker_id.clone()];
            if outbound_is_direct_to_dest {
                let memo = build_wasm_swap_and_action(
                    contract,
                    &best.ops,
                    &request.to_denom,
                    &best.min_out.to_string(),
                    PostSwapAction::Transfer { to_address: request.receiver.clone() },
                )?;
                (memo, contract.to_string(), path_ids)
            } else if let Some(out_route) = self.index.broker_route_out(&candidate.broker_id, &request.to_chain) {
                let dest_chain = self.graph.require(&request.to_chain)?;
                let receiver = to_prefix(&request.receiver, &dest_chain.bech32_prefix)?;
                let memo = build_wasm_swap_and_action(
                    contract,
                    &best.ops,
                    &request.to_denom,
                    &best.min_out.to_string(),
                    PostSwapAction::IbcTransfer {
                        channel_id: out_route.channel_id.clone(),
                        port_id: out_route.port_id.clone(),
                        receiver,
                        recover_address: recovery_address.clone(),
                        memo: None,
                    },
                )?;
                (memo, contract.to_string(), vec![request.from_chain.clone(), candidate.broker_id.clone(), request.to_chain.clone()])
            } else if let Some(found) = self.index.multi_hop_outbound(&candidate.broker_id, &request.to_chain, &candidate.denom_out, MAX_ADDITIONAL_HOPS) {
                let dest_chain = self.graph.require(&request.to_chain)?;
                let receiver = to_prefix(&request.receiver, &dest_chain.bech32_prefix)?;
                let first_hop = found[0].clone();
                let rest_hops = pfm_hops_for_path(&found[1..], &receiver);
                let memo = build_wasm_swap_and_action_with_nested_pfm(
                    contract,
                    &best.ops,
                    &request.to_denom,
                    &best.min_out.to_string(),
                    &first_hop.route.channel_id,
                    &first_hop.route.port_id,
                    &recovery_address,
                    &rest_hops,
                )?;
                let mut path_ids = vec![request.from_chain.clone(), candidate.broker_id.clone()];
                path_ids.extend(found.iter().map(|h| h.route.to_chain_id.clone()));
                outbound_path = found;
                (memo, contract.to_string(), path_ids)
            } else {
                return Ok(None);
            }
        } else {
            // Inbound PFM leads into the wasm payload on the broker chain.
            let hops = pfm_hops_for_path(&inbound_path, contract);
            let mut path_ids = vec![request.from_chain.clone()];
            path_ids.extend(inbound_path.iter().map(|h| h.route.to_chain_id.clone()));

            if outbound_is_direct_to_dest {
                let memo = build_pfm_wrapping_wasm(
                    &hops,
                    contract,
                    &best.ops,
                    &request.to_denom,
                    &best.min_out.to_string(),
                    &request.receiver,
                )?;
                (memo, contract.to_string(), path_ids)
            } else if let Some(out_route) = self.index.broker_route_out(&candidate.broker_id, &request.to_chain) {
                let dest_chain = self.graph.require(&request.to_chain)?;
                let receiver = to_prefix(&request.receiver, &dest_chain.bech32_prefix)?;
                let memo = build_pfm_wrapping_wasm_wrapping_pfm(
                    &hops,
                    contract,
                    &best.ops,
                    &request.to_denom,
                    &best.min_out.to_string(),
                    &out_route.channel_id,
                    &out_route.port_id,
                    &recovery_address,
                    &[PfmHop { receiver, port_id: out_route.port_id.clone(), channel_id: out_route.channel_id.clone() }],
                )?;
                path_ids.push(request.to_chain.clone());
                (memo, contract.to_string(), path_ids)
            } else if let Some(found) = self.index.multi_hop_outbound(&candidate.broker_id, &request.to_chain, &candidate.denom_out, MAX_ADDITIONAL_HOPS) {
                let dest_chain = self.graph.require(&request.to_chain)?;
                let receiver = to_prefix(&request.receiver, &dest_chain.bech32_prefix)?;
                let first_hop = found[0].clone();
                let rest_hops = pfm_hops_for_path(&found[1..], &receiver);
                let memo = build_pfm_wrapping_wasm_wrapping_pfm(
                    &hops,
                    contract,
                    &best.ops,
                    &request.to_denom,
                    &best.min_out.to_string(),
                    &first_hop.route.channel_id,
                    &first_hop.route.port_id,
                    &recovery_address,
                    &rest_hops,
                )?;
                path_ids.extend(found.iter().map(|h| h.route.to_chain_id.clone()));
                outbound_path = found;
                (memo, contract.to_string(), path_ids)
            } else {
                return Ok(None);
            }
        };

        let inbound_leg = inbound_path.first().map(|hop| {
            let receiver = if inbound_path.len() <= 1 { contract.to_string() } else { "pfm".to_string() };
            leg_from_hop(&request.from_chain, hop, receiver, request.amount, None)
        });
        let outbound_leg = if !outbound_is_direct_to_dest {
            if let Some(first) = outbound_path.first() {
                let receiver = if outbound_path.len() <= 1 { request.receiver.clone() } else { "pfm".to_string() };
                Some(leg_from_hop(&candidate.broker_id, first, receiver, best.min_out, None))
            } else {
                self.index.broker_route_out(&candidate.broker_id, &request.to_chain).map(|route| IbcLeg {
                    from_chain: candidate.broker_id.clone(),
                    to_chain: request.to_chain.clone(),
                    channel_id: route.channel_id.clone(),
                    port_id: route.port_id.clone(),
                    denom: candidate.denom_out.clone(),
                    is_native: false,
                    amount: best.min_out,
                    receiver: request.receiver.clone(),
                    timeout_timestamp_ns: default_timeout_timestamp_ns(now_unix_secs()),
                    memo: None,
                })
            }
        } else {
            None
        };

        Ok(Some(RouteResponse::BrokerSwap {
            success: true,
            plan: BrokerSwapPlan {
                path: path_ids,
                source_is_broker: candidate.broker_id == request.from_chain,
                swap_only: false,
                inbound_leg,
                outbound_leg,
                execution: BrokerExecution {
                    memo,
                    ibc_receiver,
                    recovery_address,
                    min_output_amount: best.min_out,
                    uses_wasm: true,
                    description: format!(
                        "broker swap on {} via {} -> {}",
                        candidate.broker_id, candidate.denom_in, request.to_denom
                    ),
                },
            },
        }))
    }

    fn broker_client(&self, kind: &str) -> Result<&Arc<dyn BrokerClient>, PlannerError> {
        self.brokers
            .get(kind)
            .ok_or_else(|| PlannerError::Internal(format!("no broker client registered for kind {kind}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::denom::compute_ibc_denom;
    use crate::traits::{BrokerError, BrokerQuote};
    use async_trait::async_trait;
    use pathfinder_types::{Chain, IbcRoute, Token, TokenInfo};
    use std::collections::HashMap as Map;

    struct StubBroker {
        kind: String,
        amount_out: String,
    }

    #[async_trait]
    impl BrokerClient for StubBroker {
        fn kind(&self) -> &str {
            &self.kind
        }

        async fn quote(
            &self,
            _token_in_denom: &str,
            token_in_amount: &str,
            _token_out_denom: &str,
            _single_route: bool,
        ) -> Result<BrokerQuote, BrokerError> {
            let _ = token_in_amount;
            Ok(BrokerQuote {
                amount_in: token_in_amount.to_string(),
                amount_out: self.amount_out.clone(),
                price_impact: "0.001".to_string(),
                effective_fee: "0.003".to_string(),
                route_data: serde_json::json!([{"pool_id": "1", "denom_in": "uosmo", "denom_out": "uatom"}]),
            })
        }

        fn swap_operations(&self, _quote: &BrokerQuote) -> Result<Vec<SwapOperation>, BrokerError> {
            Ok(vec![SwapOperation {
                pool_id: "1".to_string(),
                denom_in: "uosmo".to_string(),
                denom_out: "uatom".to_string(),
            }])
        }
    }

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

    fn token_info(base: &str, origin: &str, ibc_denom: &str, is_native: bool) -> TokenInfo {
        TokenInfo {
            source_denom: base.to_string(),
            ibc_denom: ibc_denom.to_string(),
            base_denom: base.to_string(),
            origin_chain_id: origin.to_string(),
            symbol: base.trim_start_matches('u').to_uppercase(),
            decimals: 6,
            is_native,
        }
    }

    fn two_chain_direct_graph() -> ChainGraph {
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
            routes: vec![route(
                "osmosis-1",
                "channel-141",
                "uatom",
                token_info("uatom", "cosmoshub-4", &atom_on_osmosis, false),
            )],
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
        ChainGraph::from_chains(vec![cosmoshub, osmosis]).unwrap()
    }

    fn request(from_denom: &str, to_denom: &str) -> RouteRequest {
        RouteRequest {
            from_chain: "cosmoshub-4".to_string(),
            from_denom: from_denom.to_string(),
            amount: Uint128::new(1_000_000),
            to_chain: "osmosis-1".to_string(),
            to_denom: to_denom.to_string(),
            sender: "cosmos1qqqqqqqqqqqqqqqqqqqqqqqqqqqqqqqqnrql8a".to_string(),
            receiver: "cosmos1qqqqqqqqqqqqqqqqqqqqqqqqqqqqqqqqnrql8a".to_string(),
            single_route: false,
            slippage_bps: 100,
        }
    }

    #[tokio::test]
    async fn rule1_same_chain_same_denom_is_impossible() {
        let graph = two_chain_direct_graph();
        let index = RouteIndex::build(&graph);
        let brokers: HashMap<String, Arc<dyn BrokerClient>> = HashMap::new();
        let planner = Planner::new(&graph, &index, &brokers);
        let mut req = request("uatom", "uatom");
        req.to_chain = req.from_chain.clone();
        let response = planner.plan(&req).await.unwrap();
        assert!(!response.is_success());
    }

    #[tokio::test]
    async fn rule3_direct_route_found() {
        let graph = two_chain_direct_graph();
        let index = RouteIndex::build(&graph);
        let brokers: HashMap<String, Arc<dyn BrokerClient>> = HashMap::new();
        let planner = Planner::new(&graph, &index, &brokers);
        let atom_on_osmosis = compute_ibc_denom("transfer/channel-141", "uatom");
        let req = request("uatom", &atom_on_osmosis);
        let response = planner.plan(&req).await.unwrap();
        assert!(response.is_success());
        assert!(matches!(response, RouteResponse::Direct { .. }));
    }

    #[tokio::test]
    async fn rule5_broker_swap_same_chain() {
        let graph = two_chain_direct_graph();
        let index = RouteIndex::build(&graph);
        let mut brokers: HashMap<String, Arc<dyn BrokerClient>> = HashMap::new();
        brokers.insert(
            "osmosis-sqs".to_string(),
            Arc::new(StubBroker { kind: "osmosis-sqs".to_string(), amount_out: "950000".to_string() }),
        );
        let planner = Planner::new(&graph, &index, &brokers);
        let mut req = request("uosmo", "uatom_on_osmo");
        req.from_chain = "osmosis-1".to_string();
        let response = planner.plan(&req).await.unwrap();
        assert!(response.is_success());
        match response {
            RouteResponse::BrokerSwap { plan, .. } => {
                assert!(plan.swap_only);
                assert!(plan.source_is_broker);
                assert_eq!(plan.execution.min_output_amount, Uint128::new(940500));
            }
            other => panic!("expected broker swap, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn rule6_impossible_with_no_path() {
        let graph = two_chain_direct_graph();
        let index = RouteIndex::build(&graph);
        let brokers: HashMap<String, Arc<dyn BrokerClient>> = HashMap::new();
        let planner = Planner::new(&graph, &index, &brokers);
        let req = request("uatom", "unknown_denom");
        let response = planner.plan(&req).await.unwrap();
        assert!(!response.is_success());
        assert!(matches!(response, RouteResponse::Impossible { .. }));
    }
}
