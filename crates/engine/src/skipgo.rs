//! Skip Go aggregator broker integration (spec §4.8).

use crate::broker_urls::HealthCheckedUrls;
use crate::traits::{BrokerClient, BrokerError, BrokerQuote, SwapOperation};
use async_trait::async_trait;
use pathfinder_ratelimit::{CircuitBreaker, CircuitBreakerConfig};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

pub struct SkipGoClient {
    urls: HealthCheckedUrls,
    client: reqwest::Client,
    circuit_breaker: CircuitBreaker,
}

impl SkipGoClient {
    pub fn new(urls: Vec<String>) -> Self {
        Self {
            urls: HealthCheckedUrls::new(urls),
            client: reqwest::Client::new(),
            circuit_breaker: CircuitBreaker::new(CircuitBreakerConfig::default()),
        }
    }

    pub fn mainnet() -> Self {
        Self::new(vec!["https://api.skip.build".to_string()])
    }

    async fn route_once(
        &self,
        base_url: &str,
        input_denom: &str,
        amount_in: &str,
        output_denom: &str,
        allow_multi_tx: bool,
    ) -> Result<SkipRouteResponse, BrokerError> {
        let body = SkipRouteRequest {
            amount_in: amount_in.to_string(),
            source_asset_denom: input_denom.to_string(),
            dest_asset_denom: output_denom.to_string(),
            cumulative_affiliate_fee_bps: "0".to_string(),
            allow_multi_tx,
        };
        let url = format!("{}/v2/fungible/route", base_url);
        debug!(%url, "querying skip go");
        let response = self
            .client
            .post(&url)
            .timeout(Duration::from_secs(10))
            .json(&body)
            .send()
            .await?;
        if !response.status().is_success() {
            return Err(BrokerError::QuoteFailed(format!("HTTP {}", response.status())));
        }
        Ok(response.json().await?)
    }
}

#[async_trait]
impl BrokerClient for SkipGoClient {
    fn kind(&self) -> &str {
        "skip-go"
    }

    async fn quote(
        &self,
        token_in_denom: &str,
        token_in_amount: &str,
        token_out_denom: &str,
        single_route: bool,
    ) -> Result<BrokerQuote, BrokerError> {
        let healthy = self.urls.healthy().await;
        if healthy.is_empty() {
            return Err(BrokerError::NoHealthyEndpoint(self.kind().to_string()));
        }

        let mut last_err = None;
        for url in &healthy {
            match self
                .circuit_breaker
                .call_async(|| self.route_once(url, token_in_denom, token_in_amount, token_out_denom, !single_route))
                .await
            {
                Ok(parsed) => {
                    let route_data = serde_json::to_value(&parsed.operations).unwrap_or_default();
                    return Ok(BrokerQuote {
                        amount_in: parsed.amount_in,
                        amount_out: parsed.amount_out,
                        price_impact: parsed.swap_price_impact_percent.unwrap_or_else(|| "0".to_string()),
                        effective_fee: "0".to_string(),
                        route_data,
                    });
                }
                Err(pathfinder_ratelimit::CircuitBreakerError::Open) => {
                    last_err = Some(BrokerError::NoHealthyEndpoint(self.kind().to_string()));
                }
                Err(pathfinder_ratelimit::CircuitBreakerError::Operation(e)) => {
                    last_err = Some(e);
                }
            }
        }
        Err(last_err.unwrap_or_else(|| BrokerError::NoHealthyEndpoint(self.kind().to_string())))
    }

    fn swap_operations(&self, quote: &BrokerQuote) -> Result<Vec<SwapOperation>, BrokerError> {
        let operations: Vec<SkipOperation> = serde_json::from_value(quote.route_data.clone())
            .map_err(|e| BrokerError::QuoteFailed(e.to_string()))?;
        let mut ops = Vec::new();
        for (i, op) in operations.iter().enumerate() {
            if let Some(swap) = &op.swap {
                ops.push(SwapOperation {
                    pool_id: i.to_string(),
                    denom_in: swap.swap_in.denom.clone(),
                    denom_out: swap.swap_out.denom.clone(),
                });
            }
        }
        Ok(ops)
    }
}

#[derive(Debug, Serialize)]
struct SkipRouteRequest {
    amount_in: String,
    source_asset_denom: String,
    dest_asset_denom: String,
    cumulative_affiliate_fee_bps: String,
    allow_multi_tx: bool,
}

#[derive(Debug, Deserialize)]
struct SkipRouteResponse {
    amount_in: String,
    amount_out: String,
    operations: Vec<SkipOperation>,
    swap_price_impact_percent: Option<String>,
}

#[derive(Debug, Deserialize, Serialize)]
struct SkipOperation {
    swap: Option<SkipSwapOperation>,
}

#[derive(Debug, Deserialize, Serialize)]
struct SkipSwapOperation {
    swap_in: SkipSwapAsset,
    swap_out: SkipSwapAsset,
}

#[derive(Debug, Deserialize, Serialize)]
struct SkipSwapAsset {
    denom: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn swap_operations_skip_transfer_only_steps() {
        let client = SkipGoClient::mainnet();
        let route_data = serde_json::json!([
            { "swap": null },
            { "swap": { "swap_in": {"denom": "uosmo"}, "swap_out": {"denom": "uatom"} } },
        ]);
        let quote = BrokerQuote {
            amount_in: "1".to_string(),
            amount_out: "1".to_string(),
            price_impact: "0".to_string(),
            effective_fee: "0".to_string(),
            route_data,
        };
        let ops = client.swap_operations(&quote).unwrap();
        assert_eq!(ops.len(), 1);
        assert_eq!(ops[0].denom_in, "uosmo");
        assert_eq!(ops[0].denom_out, "uatom");
    }
}
