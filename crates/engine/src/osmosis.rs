//! Osmosis SQS (Sidecar Query Server) broker integration (spec §4.8).

use crate::broker_urls::HealthCheckedUrls;
use crate::traits::{BrokerClient, BrokerError, BrokerQuote, SwapOperation};
use async_trait::async_trait;
use pathfinder_ratelimit::{CircuitBreaker, CircuitBreakerConfig, ExponentialBackoff};
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, warn};

pub struct OsmosisClient {
    urls: HealthCheckedUrls,
    client: reqwest::Client,
    circuit_breaker: CircuitBreaker,
}

impl OsmosisClient {
    pub fn new(urls: Vec<String>) -> Self {
        Self {
            urls: HealthCheckedUrls::new(urls),
            client: reqwest::Client::new(),
            circuit_breaker: CircuitBreaker::new(CircuitBreakerConfig::default()),
        }
    }

    pub fn mainnet() -> Self {
        Self::new(vec!["https://sqs.osmosis.zone".to_string()])
    }

    async fn quote_once(
        &self,
        url: &str,
        input_denom: &str,
        amount_in: &str,
        output_denom: &str,
    ) -> Result<SqsQuoteResponse, BrokerError> {
        let request_url = format!(
            "{}/router/quote?tokenIn={}{}&tokenOutDenom={}",
            url, amount_in, input_denom, output_denom
        );
        debug!(%request_url, "querying osmosis sqs");
        let response = self
            .client
            .get(&request_url)
            .timeout(Duration::from_secs(10))
            .send()
            .await?;
        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            warn!(%status, %body, "osmosis sqs error");
            return Err(BrokerError::QuoteFailed(format!("HTTP {}: {}", status, body)));
        }
        Ok(response.json().await?)
    }
}

#[async_trait]
impl BrokerClient for OsmosisClient {
    fn kind(&self) -> &str {
        "osmosis-sqs"
    }

    async fn quote(
        &self,
        token_in_denom: &str,
        token_in_amount: &str,
        token_out_denom: &str,
        _single_route: bool,
    ) -> Result<BrokerQuote, BrokerError> {
        let healthy = self.urls.healthy().await;
        if healthy.is_empty() {
            return Err(BrokerError::NoHealthyEndpoint(self.kind().to_string()));
        }

        let mut backoff = ExponentialBackoff::new(Duration::from_millis(100), Duration::from_secs(2));
        let mut last_err = None;

        for url in &healthy {
            for _ in 0..3 {
                match self
                    .circuit_breaker
                    .call_async(|| self.quote_once(url, token_in_denom, token_in_amount, token_out_denom))
                    .await
                {
                    Ok(parsed) => {
                        let route_data = serde_json::to_value(&parsed.route).unwrap_or_default();
                        return Ok(BrokerQuote {
                            amount_in: parsed.amount_in.amount,
                            amount_out: parsed.amount_out,
                            price_impact: parsed.price_impact,
                            effective_fee: parsed.effective_fee,
                            route_data,
                        });
                    }
                    Err(pathfinder_ratelimit::CircuitBreakerError::Open) => {
                        last_err = Some(BrokerError::NoHealthyEndpoint(self.kind().to_string()));
                        break;
                    }
                    Err(pathfinder_ratelimit::CircuitBreakerError::Operation(e)) => {
                        last_err = Some(e);
                        tokio::time::sleep(backoff.next_delay()).await;
                    }
                }
            }
        }

        Err(last_err.unwrap_or_else(|| BrokerError::NoHealthyEndpoint(self.kind().to_string())))
    }

    fn swap_operations(&self, quote: &BrokerQuote) -> Result<Vec<SwapOperation>, BrokerError> {
        let routes: Vec<SqsRoute> = serde_json::from_value(quote.route_data.clone())
            .map_err(|e| BrokerError::QuoteFailed(e.to_string()))?;
        let mut ops = Vec::new();
        for route in &routes {
            let mut denom_in = route
                .token_in_denom
                .clone()
                .unwrap_or_default();
            for pool in &route.pools {
                ops.push(SwapOperation {
                    pool_id: pool.id.to_string(),
                    denom_in: denom_in.clone(),
                    denom_out: pool.token_out_denom.clone(),
                });
                denom_in = pool.token_out_denom.clone();
            }
        }
        Ok(ops)
    }
}

#[derive(Debug, Deserialize)]
struct SqsQuoteResponse {
    amount_in: SqsCoin,
    amount_out: String,
    route: Vec<SqsRoute>,
    effective_fee: String,
    price_impact: String,
}

#[derive(Debug, Deserialize)]
struct SqsCoin {
    #[allow(dead_code)]
    denom: String,
    amount: String,
}

#[derive(Debug, Deserialize, serde::Serialize)]
struct SqsRoute {
    pools: Vec<SqsPoolRoute>,
    #[serde(rename = "tokenInDenom")]
    token_in_denom: Option<String>,
}

#[derive(Debug, Deserialize, serde::Serialize)]
struct SqsPoolRoute {
    id: u64,
    #[serde(rename = "tokenOutDenom")]
    token_out_denom: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn swap_operations_chain_denom_in_from_prior_denom_out() {
        let client = OsmosisClient::mainnet();
        let route_data = serde_json::json!([{
            "pools": [
                {"id": 1, "tokenOutDenom": "uion"},
                {"id": 2, "tokenOutDenom": "uatom"},
            ],
            "tokenInDenom": "uosmo",
        }]);
        let quote = BrokerQuote {
            amount_in: "1000000".to_string(),
            amount_out: "900000".to_string(),
            price_impact: "0.01".to_string(),
            effective_fee: "0.003".to_string(),
            route_data,
        };
        let ops = client.swap_operations(&quote).unwrap();
        assert_eq!(ops.len(), 2);
        assert_eq!(ops[0].denom_in, "uosmo");
        assert_eq!(ops[0].denom_out, "uion");
        assert_eq!(ops[1].denom_in, "uion");
        assert_eq!(ops[1].denom_out, "uatom");
    }
}
