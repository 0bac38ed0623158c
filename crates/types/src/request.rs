//! Request/response shapes exchanged with the pathfinder at query time.

use cosmwasm_std::Uint128;
use serde::{Deserialize, Serialize};

fn default_slippage_bps() -> u32 {
    100
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RouteRequest {
    pub from_chain: String,
    pub from_denom: String,
    /// Input amount in base units.
    pub amount: Uint128,
    pub to_chain: String,
    pub to_denom: String,
    pub sender: String,
    pub receiver: String,
    #[serde(default)]
    pub single_route: bool,
    #[serde(default = "default_slippage_bps")]
    pub slippage_bps: u32,
}

impl RouteRequest {
    pub fn slippage_bps_or_default(&self) -> u32 {
        if self.slippage_bps == 0 {
            default_slippage_bps()
        } else {
            self.slippage_bps
        }
    }
}

/// One IBC transfer leg of an executable plan.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IbcLeg {
    pub from_chain: String,
    pub to_chain: String,
    pub channel_id: String,
    pub port_id: String,
    pub denom: String,
    pub is_native: bool,
    pub amount: Uint128,
    pub receiver: String,
    pub timeout_timestamp_ns: u64,
    pub memo: Option<String>,
}

/// The synthesized broker-swap execution block.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BrokerExecution {
    pub memo: String,
    pub ibc_receiver: String,
    pub recovery_address: String,
    pub min_output_amount: Uint128,
    pub uses_wasm: bool,
    pub description: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DirectPlan {
    pub leg: IbcLeg,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndirectPlan {
    pub path: Vec<String>,
    pub legs: Vec<IbcLeg>,
    pub supports_pfm: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BrokerSwapPlan {
    pub path: Vec<String>,
    pub source_is_broker: bool,
    pub swap_only: bool,
    pub inbound_leg: Option<IbcLeg>,
    pub outbound_leg: Option<IbcLeg>,
    pub execution: BrokerExecution,
}

/// Tagged union over the four possible outcomes of a route request.
///
/// Exactly one of `direct`/`indirect`/`broker_swap` is set when
/// `success` is true; `impossible` carries no legs and a message.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "route_type", rename_all = "snake_case")]
pub enum RouteResponse {
    Direct { success: bool, plan: DirectPlan },
    Indirect { success: bool, plan: IndirectPlan },
    BrokerSwap { success: bool, plan: BrokerSwapPlan },
    Impossible { success: bool, error_message: String },
}

impl RouteResponse {
    pub fn impossible(message: impl Into<String>) -> Self {
        RouteResponse::Impossible {
            success: false,
            error_message: message.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        match self {
            RouteResponse::Direct { success, .. } => *success,
            RouteResponse::Indirect { success, .. } => *success,
            RouteResponse::BrokerSwap { success, .. } => *success,
            RouteResponse::Impossible { .. } => false,
        }
    }
}

/// Result of resolving a denom on a chain (§4.11).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DenomInfo {
    pub chain_denom: String,
    pub base_denom: String,
    pub origin_chain: String,
    pub is_native: bool,
    /// Canonical trace string, empty for native tokens.
    pub ibc_path: String,
}
