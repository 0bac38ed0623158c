//! Tokens: native minimal denoms and their IBC-derived representations.

use serde::{Deserialize, Serialize};

/// A token as it exists on a specific chain.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Token {
    /// On-chain denom: a native minimal denom (`uatom`) or `ibc/<HEX>`.
    pub denom: String,
    pub symbol: String,
    pub decimals: u32,
    pub origin_chain_id: String,
    /// Base (native) denom on the origin chain.
    pub base_denom: String,
    pub price_feed_id: Option<String>,
    /// If set, this token may only flow to the listed destination chains.
    pub allowed_destinations: Option<Vec<String>>,
}

impl Token {
    pub fn is_native(&self, chain_id: &str) -> bool {
        self.origin_chain_id == chain_id && !self.denom.starts_with("ibc/")
    }
}

/// The descriptor stored on an `IbcRoute`'s allow-list for one source denom:
/// what it looks like once it arrives on the destination chain.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenInfo {
    pub source_denom: String,
    /// Expected destination-chain denom, i.e. the IBC hash for this edge.
    pub ibc_denom: String,
    pub base_denom: String,
    pub origin_chain_id: String,
    pub symbol: String,
    pub decimals: u32,
    #[serde(default)]
    pub is_native: bool,
}
