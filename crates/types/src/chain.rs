//! The chain graph's node: a Cosmos chain and its outgoing IBC routes.

use serde::{Deserialize, Serialize};

use crate::token::Token;

/// A Cosmos-SDK chain participating in the route graph.
///
/// Built once by the config pipeline and treated as immutable for the
/// lifetime of the process; see `pathfinder-engine`'s route index for the
/// read-only view every request shares.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Chain {
    /// Globally unique chain id, e.g. `osmosis-1`.
    pub id: String,
    pub name: String,
    pub bech32_prefix: String,
    pub slip44: u32,
    #[serde(default)]
    pub has_pfm: bool,
    #[serde(default)]
    pub is_broker: bool,
    pub broker_id: Option<String>,
    pub ibc_hooks_contract: Option<String>,
    #[serde(default)]
    pub native_tokens: Vec<Token>,
    #[serde(default)]
    pub routes: Vec<IbcRoute>,
}

impl Chain {
    /// Invariant check used by the config builder before a chain is admitted
    /// into the graph: a broker must carry a broker id, and a chain carrying
    /// an ibc-hooks contract must be a broker.
    pub fn validate_invariants(&self) -> Result<(), String> {
        if self.is_broker && self.broker_id.is_none() {
            return Err(format!("chain {} is_broker=true but broker_id is unset", self.id));
        }
        if self.ibc_hooks_contract.is_some() && !self.is_broker {
            return Err(format!(
                "chain {} carries ibc_hooks_contract but is_broker=false",
                self.id
            ));
        }
        Ok(())
    }

    pub fn route_to(&self, dest_chain_id: &str) -> Option<&IbcRoute> {
        self.routes.iter().find(|r| r.to_chain_id == dest_chain_id)
    }
}

/// An outgoing IBC edge from one chain to another.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IbcRoute {
    pub to_chain_id: String,
    pub connection_id: String,
    pub channel_id: String,
    #[serde(default = "default_port_id")]
    pub port_id: String,
    /// Source-denom -> allowed token descriptor for this edge.
    #[serde(default)]
    pub allowed_tokens: std::collections::HashMap<String, crate::token::TokenInfo>,
}

fn default_port_id() -> String {
    "transfer".to_string()
}
