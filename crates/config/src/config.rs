//! Configuration structures for the Cosmos IBC pathfinder: the human-authored
//! input TOML (spec §6), the ambient runtime settings the engine/CLI read,
//! and the two output shapes the config builder emits.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// One chain's human-authored TOML file (spec §6).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InputChainToml {
    pub name: String,
    pub id: String,
    #[serde(rename = "type")]
    pub chain_type: String,
    /// Registry keyword used to match IBC-registry/wallet-registry file
    /// names (spec §4.3); usually the chain's common name, e.g. `osmosis`.
    pub registry: String,
    pub bech32_prefix: String,
    pub slip44: u32,
    pub cosmos_sdk_version: String,
    #[serde(default)]
    pub is_broker: bool,
    pub broker_id: Option<String>,
    #[serde(default)]
    pub has_pfm: bool,
    pub ibc_hooks_contract: Option<String>,
    #[serde(default)]
    pub explorer_details: Option<ExplorerDetails>,
    #[serde(default)]
    pub chain: ChainEndpoints,
    #[serde(default)]
    pub token: Vec<InputToken>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExplorerDetails {
    pub base_url: String,
    pub account_path: String,
    pub transaction_path: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ChainEndpoints {
    #[serde(default)]
    pub rest: Vec<EndpointEntry>,
    #[serde(default)]
    pub rpcs: Vec<EndpointEntry>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EndpointEntry {
    pub url: String,
    pub provider: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InputToken {
    pub denom: String,
    pub name: String,
    pub symbol: String,
    pub exponent: u32,
    #[serde(default)]
    pub icon: String,
    pub origin_chain: Option<String>,
    pub origin_denom: Option<String>,
    #[serde(default)]
    pub allowed_destinations: Option<Vec<String>>,
    pub coingecko_id: Option<String>,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_true() -> bool {
    true
}

fn default_metrics_port() -> u16 {
    9090
}

fn default_slippage_bps() -> u32 {
    100
}

fn default_max_additional_hops() -> usize {
    2
}

fn default_pfm_timeout() -> String {
    "10m".to_string()
}

fn default_health_check_interval_secs() -> u64 {
    30
}

fn default_broker_quote_timeout_secs() -> u64 {
    10
}

/// The ambient runtime settings read by the engine service and the CLI;
/// distinct from the enriched chain graph itself, which is built from
/// [`InputChainToml`] + the IBC/wallet registries (see [`crate::loader`]).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PathfinderConfig {
    #[serde(default)]
    pub network: NetworkConfig,
    #[serde(default)]
    pub planner: PlannerConfig,
    #[serde(default)]
    pub resolver: ResolverConfig,
    #[serde(default)]
    pub brokers: BrokersConfig,
    #[serde(default)]
    pub registry: RegistrySourcesConfig,
}

impl Default for PathfinderConfig {
    fn default() -> Self {
        Self {
            network: NetworkConfig::default(),
            planner: PlannerConfig::default(),
            resolver: ResolverConfig::default(),
            brokers: BrokersConfig::default(),
            registry: RegistrySourcesConfig::default(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NetworkConfig {
    #[serde(default = "default_log_level")]
    pub log_level: String,
    #[serde(default = "default_true")]
    pub metrics_enabled: bool,
    #[serde(default = "default_metrics_port")]
    pub metrics_port: u16,
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            metrics_enabled: default_true(),
            metrics_port: default_metrics_port(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlannerConfig {
    #[serde(default = "default_slippage_bps")]
    pub default_slippage_bps: u32,
    #[serde(default = "default_max_additional_hops")]
    pub max_additional_hops: usize,
    #[serde(default = "default_pfm_timeout")]
    pub pfm_timeout: String,
}

impl Default for PlannerConfig {
    fn default() -> Self {
        Self {
            default_slippage_bps: default_slippage_bps(),
            max_additional_hops: default_max_additional_hops(),
            pfm_timeout: default_pfm_timeout(),
        }
    }
}

/// Denom Resolver settings (spec §4.11): the opt-in live-lookup fallback.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ResolverConfig {
    #[serde(default)]
    pub allow_live_lookup: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BrokersConfig {
    #[serde(default)]
    pub osmosis_sqs_urls: Vec<String>,
    #[serde(default)]
    pub skip_go_urls: Vec<String>,
    #[serde(default = "default_health_check_interval_secs")]
    pub health_check_interval_secs: u64,
    #[serde(default = "default_broker_quote_timeout_secs")]
    pub quote_timeout_secs: u64,
}

impl Default for BrokersConfig {
    fn default() -> Self {
        Self {
            osmosis_sqs_urls: vec!["https://sqs.osmosis.zone".to_string()],
            skip_go_urls: vec!["https://api.skip.build".to_string()],
            health_check_interval_secs: default_health_check_interval_secs(),
            quote_timeout_secs: default_broker_quote_timeout_secs(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RegistrySourcesConfig {
    /// Base URL the IBC/wallet registries are downloaded from; unused when
    /// `use_local_data`/`use_local_keplr` is set (spec §6).
    pub ibc_registry_base_url: Option<String>,
    pub wallet_registry_base_url: Option<String>,
    pub local_registry_cache: Option<String>,
    pub local_wallet_cache: Option<String>,
}

/// Output shape 1 (spec §6): the pathfinder runtime config the engine loads
/// at startup to build the [`ChainGraph`](pathfinder_engine::ChainGraph) and
/// [`RouteIndex`](pathfinder_engine::RouteIndex).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PathfinderRuntimeConfig {
    pub version: String,
    pub generated_at: String,
    pub chains: Vec<RuntimeChain>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RuntimeChain {
    pub name: String,
    pub id: String,
    pub has_pfm: bool,
    pub broker: bool,
    pub broker_id: Option<String>,
    pub ibc_hooks_contract: Option<String>,
    pub bech32_prefix: String,
    pub native_tokens: Vec<pathfinder_types::Token>,
    pub routes: Vec<RuntimeRoute>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RuntimeRoute {
    pub to_chain: String,
    pub to_chain_id: String,
    pub connection_id: String,
    pub channel_id: String,
    pub port_id: String,
    pub allowed_tokens: HashMap<String, pathfinder_types::TokenInfo>,
}

/// Output shape 2 (spec §6): the client-display config consumed by the UI.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientConfig {
    pub version: String,
    pub generated_at: String,
    pub chains: Vec<ClientChain>,
    pub all_tokens: Vec<ClientToken>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientChain {
    pub id: String,
    pub name: String,
    pub bech32_prefix: String,
    pub explorer_details: Option<ExplorerDetails>,
    pub wallet_currencies: Vec<pathfinder_registry::WalletCurrency>,
    pub rpc: Option<String>,
    pub rest: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientToken {
    pub chain_id: String,
    pub denom: String,
    pub symbol: String,
    pub decimals: u32,
    pub icon: String,
    pub coingecko_id: Option<String>,
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to load config: {0}")]
    LoadError(String),

    #[error("Failed to parse config: {0}")]
    ParseError(String),

    #[error("Config validation failed: {0}")]
    ValidationError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Config library error: {0}")]
    ConfigLibError(#[from] ::config::ConfigError),

    #[error("TOML parse error: {0}")]
    TomlError(#[from] toml::de::Error),

    #[error("TOML serialize error: {0}")]
    TomlSerError(#[from] toml::ser::Error),

    #[error("YAML parse error: {0}")]
    YamlError(#[from] serde_yaml::Error),

    #[error("JSON parse error: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("Watch error: {0}")]
    WatchError(String),

    #[error("registry error: {0}")]
    Registry(#[from] pathfinder_registry::RegistryError),

    #[error("chain graph error: {0}")]
    Graph(#[from] pathfinder_engine::GraphError),

    #[error("build failed with {0} validation error(s)")]
    BuildFailed(usize),
}

pub type Result<T> = std::result::Result<T, ConfigError>;
