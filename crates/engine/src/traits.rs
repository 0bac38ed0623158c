//! The broker client capability (spec §4.8): the interface any DEX-broker
//! integration exposes to the planner.

use async_trait::async_trait;
use serde_json::Value;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum BrokerError {
    #[error("quote request failed: {0}")]
    QuoteFailed(String),

    #[error("no healthy endpoint available for broker {0}")]
    NoHealthyEndpoint(String),

    #[error("pair not quotable: {0} -> {1}")]
    PairNotQuotable(String, String),

    #[error("network error: {0}")]
    NetworkError(#[from] reqwest::Error),
}

/// The result of a broker quote (spec §4.8).
#[derive(Debug, Clone)]
pub struct BrokerQuote {
    pub amount_in: String,
    pub amount_out: String,
    /// Decimal-string price impact, e.g. `"0.0042"`.
    pub price_impact: String,
    pub effective_fee: String,
    /// Broker-specific pool-hop listing, opaque to the planner; consumed
    /// only by this broker's own memo builder.
    pub route_data: Value,
}

/// One pool hop of a synthesized swap operation list (spec §4.9).
#[derive(Debug, Clone, serde::Serialize)]
pub struct SwapOperation {
    pub pool_id: String,
    pub denom_in: String,
    pub denom_out: String,
}

/// A broker integration: quote + swap-operation synthesis + stable id.
/// Memo assembly itself is shared across brokers (`pathfinder_memo`'s
/// `wasm_swap_and_action` builder consumes `swap_operations()`'s output),
/// so it isn't part of this trait. Implementations are free to retry
/// across redundant quote endpoints internally (spec §4.8); the planner
/// only sees the aggregated result.
#[async_trait]
pub trait BrokerClient: Send + Sync {
    /// Stable broker-id string, e.g. `"osmosis-sqs"`.
    fn kind(&self) -> &str;

    async fn quote(
        &self,
        token_in_denom: &str,
        token_in_amount: &str,
        token_out_denom: &str,
        single_route: bool,
    ) -> Result<BrokerQuote, BrokerError>;

    /// Synthesizes the broker-specific swap operation list from a quote's
    /// `route_data`, used by the memo builder to construct the
    /// `swap_and_action` payload (spec §4.9).
    fn swap_operations(&self, quote: &BrokerQuote) -> Result<Vec<SwapOperation>, BrokerError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn broker_quote_is_plain_data() {
        let quote = BrokerQuote {
            amount_in: "1000000".to_string(),
            amount_out: "950000".to_string(),
            price_impact: "0.01".to_string(),
            effective_fee: "0.003".to_string(),
            route_data: serde_json::json!({}),
        };
        assert_eq!(quote.amount_in, "1000000");
    }
}
