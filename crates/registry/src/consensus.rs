//! Endpoint consensus verifier (spec.md §4.2).
//!
//! Given a chain's declared chain-id and a list of candidate RPC URLs,
//! probes each one's Tendermint `/status`, filters out the ones that
//! disagree with the declared chain-id or have the tx-indexer disabled,
//! then keeps only the URLs whose {app_name, version, git_commit} match
//! the majority and whose height is within tolerance of the highest
//! observed. An empty result after filtering is fatal for the chain.

use std::collections::HashMap;
use std::time::Duration;

use tendermint_rpc::{Client, HttpClient};
use tracing::warn;

use crate::error::RegistryError;

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5);
const MAX_RETRIES: u32 = 2;
const HEIGHT_TOLERANCE: i64 = 500;

/// Metadata pulled from one endpoint's `/status` response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EndpointMetadata {
    pub url: String,
    pub network: String,
    pub latest_height: i64,
    pub catching_up: bool,
    pub tx_index_on: bool,
    /// Node moniker, treated as the `app_name` vote per spec.md §4.2.
    pub app_name: String,
    pub version: String,
    /// Tendermint protocol version string, used as the `git_commit` vote
    /// since the light RPC surface carries no literal commit hash.
    pub git_commit: String,
}

/// A URL dropped during consensus filtering, with the reason, surfaced for
/// diagnostics per `ConsensusReport` (spec_full.md §3).
#[derive(Debug, Clone)]
pub struct ExcludedEndpoint {
    pub url: String,
    pub reason: String,
}

/// Diagnostic output of a consensus run for one chain: purely for logging,
/// not consumed downstream by the config builder beyond the surviving URL
/// list.
#[derive(Debug, Clone)]
pub struct ConsensusReport {
    pub chain_id: String,
    pub surviving_urls: Vec<String>,
    pub majority_app_name: String,
    pub majority_version: String,
    pub majority_git_commit: String,
    pub excluded: Vec<ExcludedEndpoint>,
}

/// Probes each candidate URL and returns the subset that reaches consensus
/// on chain identity and endpoint health, per spec.md §4.2.
pub struct EndpointConsensusVerifier {
    timeout: Duration,
    max_retries: u32,
}

impl EndpointConsensusVerifier {
    pub fn new() -> Self {
        Self {
            timeout: DEFAULT_TIMEOUT,
            max_retries: MAX_RETRIES,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Runs the full verification pipeline for one chain's candidate URLs.
    /// Returns a fatal `RegistryError::NoConsensus` if nothing survives.
    pub async fn verify(
        &self,
        chain_id: &str,
        candidate_urls: &[String],
    ) -> Result<ConsensusReport, RegistryError> {
        let mut probed = Vec::new();
        let mut excluded = Vec::new();

        for url in candidate_urls {
            match self.probe(url).await {
                Ok(meta) => probed.push(meta),
                Err(reason) => {
                    warn!(url = %url, %reason, "endpoint probe failed");
                    excluded.push(ExcludedEndpoint { url: url.clone(), reason });
                }
            }
        }

        let (network_ok, network_dropped) = filter_by_network(probed, chain_id);
        excluded.extend(network_dropped);

        let (majority_app_name, majority_version, majority_git_commit) =
            majority_metadata(&network_ok);

        let max_height = network_ok.iter().map(|m| m.latest_height).max().unwrap_or(0);

        let mut surviving_urls = Vec::new();
        for meta in &network_ok {
            let mismatches = mismatch_reason(meta, &majority_app_name, &majority_version, &majority_git_commit, max_height);
            match mismatches {
                Some(reason) => excluded.push(ExcludedEndpoint { url: meta.url.clone(), reason }),
                None => surviving_urls.push(meta.url.clone()),
            }
        }

        if surviving_urls.is_empty() {
            return Err(RegistryError::NoConsensus(chain_id.to_string()));
        }

        Ok(ConsensusReport {
            chain_id: chain_id.to_string(),
            surviving_urls,
            majority_app_name,
            majority_version,
            majority_git_commit,
            excluded,
        })
    }

    async fn probe(&self, url: &str) -> Result<EndpointMetadata, String> {
        let client = HttpClient::new(url).map_err(|e| format!("invalid rpc url: {e}"))?;

        let mut attempt = 0;
        loop {
            attempt += 1;
            let result = tokio::time::timeout(self.timeout, client.status()).await;
            match result {
                Ok(Ok(status)) => {
                    let node_info = status.node_info;
                    let tx_index_on = matches!(
                        node_info.other.tx_index,
                        tendermint::node::info::TxIndexStatus::On
                    );
                    return Ok(EndpointMetadata {
                        url: url.to_string(),
                        network: node_info.network.to_string(),
                        latest_height: status.sync_info.latest_block_height.value() as i64,
                        catching_up: status.sync_info.catching_up,
                        tx_index_on,
                        app_name: node_info.moniker.to_string(),
                        version: node_info.version.clone(),
                        git_commit: node_info.protocol_version.app.to_string(),
                    });
                }
                Ok(Err(e)) if attempt > self.max_retries => {
                    return Err(format!("rpc error after {attempt} attempts: {e}"))
                }
                Err(_) if attempt > self.max_retries => {
                    return Err(format!("timed out after {attempt} attempts"))
                }
                _ => continue,
            }
        }
    }
}

impl Default for EndpointConsensusVerifier {
    fn default() -> Self {
        Self::new()
    }
}

fn filter_by_network(
    probed: Vec<EndpointMetadata>,
    declared_chain_id: &str,
) -> (Vec<EndpointMetadata>, Vec<ExcludedEndpoint>) {
    let mut kept = Vec::new();
    let mut dropped = Vec::new();
    for meta in probed {
        if meta.network != declared_chain_id {
            dropped.push(ExcludedEndpoint {
                url: meta.url,
                reason: format!("network {} != declared {}", meta.network, declared_chain_id),
            });
        } else if !meta.tx_index_on {
            dropped.push(ExcludedEndpoint {
                url: meta.url,
                reason: "tx-indexer off".to_string(),
            });
        } else if meta.catching_up {
            dropped.push(ExcludedEndpoint {
                url: meta.url,
                reason: "node still catching up".to_string(),
            });
        } else {
            kept.push(meta);
        }
    }
    (kept, dropped)
}

fn majority_metadata(endpoints: &[EndpointMetadata]) -> (String, String, String) {
    (
        most_frequent(endpoints.iter().map(|m| m.app_name.as_str())),
        most_frequent(endpoints.iter().map(|m| m.version.as_str())),
        most_frequent(endpoints.iter().map(|m| m.git_commit.as_str())),
    )
}

/// Picks the most-frequent non-empty value; ties broken lexicographically
/// for determinism.
fn most_frequent<'a>(values: impl Iterator<Item = &'a str>) -> String {
    let mut counts: HashMap<&str, usize> = HashMap::new();
    for v in values.filter(|v| !v.is_empty()) {
        *counts.entry(v).or_insert(0) += 1;
    }
    counts
        .into_iter()
        .max_by(|a, b| a.1.cmp(&b.1).then_with(|| b.0.cmp(a.0)))
        .map(|(v, _)| v.to_string())
        .unwrap_or_default()
}

fn mismatch_reason(
    meta: &EndpointMetadata,
    majority_app_name: &str,
    majority_version: &str,
    majority_git_commit: &str,
    max_height: i64,
) -> Option<String> {
    if meta.app_name != majority_app_name {
        return Some(format!("app_name {} != majority {}", meta.app_name, majority_app_name));
    }
    if meta.version != majority_version {
        return Some(format!("version {} != majority {}", meta.version, majority_version));
    }
    if meta.git_commit != majority_git_commit {
        return Some("git_commit diverges from majority".to_string());
    }
    if max_height - meta.latest_height > HEIGHT_TOLERANCE {
        return Some(format!(
            "height {} trails max {} by more than {} blocks",
            meta.latest_height, max_height, HEIGHT_TOLERANCE
        ));
    }
    None
}
