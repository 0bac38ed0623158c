//! Registry ingestor (spec.md §4.3): parses the public IBC channel registry
//! and the per-chain wallet registry from a local directory, either freshly
//! downloaded or read from cache.

use std::collections::HashMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::RegistryError;

/// One `<chainA>-<chainB>.json` file from the public IBC registry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IbcPairFile {
    pub chain_1: ChainRef,
    pub chain_2: ChainRef,
    pub channels: Vec<ChannelEntry>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChainRef {
    pub chain_name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChannelEntry {
    pub chain_1: ChannelSide,
    pub chain_2: ChannelSide,
    #[serde(default)]
    pub ordering: String,
    #[serde(default)]
    pub version: String,
    #[serde(default)]
    pub tags: ChannelTags,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChannelSide {
    pub channel_id: String,
    #[serde(default = "default_port")]
    pub port_id: String,
}

fn default_port() -> String {
    "transfer".to_string()
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ChannelTags {
    #[serde(default)]
    pub preferred: bool,
    #[serde(default)]
    pub status: String,
}

impl IbcPairFile {
    /// Selects the live channel for this pair per spec.md §4.4 step 2:
    /// prefer `status = "live"` and `preferred = true`; otherwise fall back
    /// to the single live channel; error if none or ambiguous.
    pub fn select_live_channel(&self) -> Result<&ChannelEntry, RegistryError> {
        let live: Vec<&ChannelEntry> = self
            .channels
            .iter()
            .filter(|c| c.tags.status == "live")
            .collect();

        if live.is_empty() {
            return Err(RegistryError::NoLiveChannel(format!(
                "{}-{}",
                self.chain_1.chain_name, self.chain_2.chain_name
            )));
        }

        if let Some(preferred) = live.iter().find(|c| c.tags.preferred) {
            return Ok(preferred);
        }

        if live.len() == 1 {
            return Ok(live[0]);
        }

        Err(RegistryError::NoLiveChannel(format!(
            "{}-{} has {} live channels and none marked preferred",
            self.chain_1.chain_name,
            self.chain_2.chain_name,
            live.len()
        )))
    }
}

/// One entry from the per-chain wallet registry: bech32 config, currencies,
/// RPC/REST hints. Carries `explorer`/`feeCurrencies[]` through to the
/// client-display config even though the planner itself only consumes the
/// bech32 prefix and endpoint hints.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WalletRegistryEntry {
    pub chain_id: String,
    pub chain_name: String,
    pub bech32_prefix: String,
    #[serde(default)]
    pub currencies: Vec<WalletCurrency>,
    #[serde(default)]
    pub fee_currencies: Vec<WalletCurrency>,
    pub rpc: Option<String>,
    pub rest: Option<String>,
    pub explorer: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WalletCurrency {
    pub coin_denom: String,
    pub coin_minimal_denom: String,
    pub coin_decimals: u32,
}

/// Ingests the IBC channel registry and wallet registry from a local
/// directory, filtered by a declared set of registry keywords (chain-name
/// identifiers as used in registry file names, not chain ids).
pub struct RegistryIngestor {
    registry_dir: std::path::PathBuf,
    wallet_dir: std::path::PathBuf,
}

impl RegistryIngestor {
    pub fn new(registry_dir: impl AsRef<Path>, wallet_dir: impl AsRef<Path>) -> Self {
        Self {
            registry_dir: registry_dir.as_ref().to_path_buf(),
            wallet_dir: wallet_dir.as_ref().to_path_buf(),
        }
    }

    /// Parses every `<a>-<b>.json` file in the registry directory whose two
    /// name segments are both present in `keywords`, keyed by the unordered
    /// pair of chain names.
    pub fn load_pair_files(
        &self,
        keywords: &std::collections::HashSet<String>,
    ) -> Result<HashMap<(String, String), IbcPairFile>, RegistryError> {
        if !self.registry_dir.is_dir() {
            return Err(RegistryError::DirectoryNotFound(
                self.registry_dir.display().to_string(),
            ));
        }

        let mut out = HashMap::new();
        let entries = std::fs::read_dir(&self.registry_dir).map_err(|e| {
            RegistryError::ReadFailed(self.registry_dir.display().to_string(), e.to_string())
        })?;

        for entry in entries {
            let entry = entry.map_err(|e| {
                RegistryError::ReadFailed(self.registry_dir.display().to_string(), e.to_string())
            })?;
            let path = entry.path();
            if path.extension().and_then(|e| e.to_str()) != Some("json") {
                continue;
            }
            let stem = match path.file_stem().and_then(|s| s.to_str()) {
                Some(s) => s,
                None => continue,
            };
            let Some((a, b)) = stem.split_once('-') else {
                continue;
            };
            if !keywords.contains(a) || !keywords.contains(b) {
                continue;
            }

            let raw = std::fs::read_to_string(&path)
                .map_err(|e| RegistryError::ReadFailed(path.display().to_string(), e.to_string()))?;
            let parsed: IbcPairFile = serde_json::from_str(&raw)
                .map_err(|e| RegistryError::ParseFailed(path.display().to_string(), e.to_string()))?;

            let mut key = [a.to_string(), b.to_string()];
            key.sort();
            out.insert((key[0].clone(), key[1].clone()), parsed);
        }

        Ok(out)
    }

    /// Looks up (or loads lazily, via `load_wallet_entries`) the registry
    /// file for a specific pair; fails loudly if missing, per spec.md §4.3's
    /// "fail the chain pair if none" clause (surfaced to the build pipeline
    /// as a collected error, not a panic).
    pub fn pair_file_for<'a>(
        &self,
        files: &'a HashMap<(String, String), IbcPairFile>,
        chain_a: &str,
        chain_b: &str,
    ) -> Result<&'a IbcPairFile, RegistryError> {
        let mut key = [chain_a.to_string(), chain_b.to_string()];
        key.sort();
        files
            .get(&(key[0].clone(), key[1].clone()))
            .ok_or_else(|| RegistryError::MissingPairFile(chain_a.to_string(), chain_b.to_string()))
    }

    /// Parses every `<chain>.json` file in the wallet registry directory,
    /// keyed by chain name.
    pub fn load_wallet_entries(&self) -> Result<HashMap<String, WalletRegistryEntry>, RegistryError> {
        if !self.wallet_dir.is_dir() {
            return Err(RegistryError::DirectoryNotFound(self.wallet_dir.display().to_string()));
        }

        let mut out = HashMap::new();
        let entries = std::fs::read_dir(&self.wallet_dir).map_err(|e| {
            RegistryError::ReadFailed(self.wallet_dir.display().to_string(), e.to_string())
        })?;

        for entry in entries {
            let entry = entry.map_err(|e| {
                RegistryError::ReadFailed(self.wallet_dir.display().to_string(), e.to_string())
            })?;
            let path = entry.path();
            if path.extension().and_then(|e| e.to_str()) != Some("json") {
                continue;
            }
            let raw = std::fs::read_to_string(&path)
                .map_err(|e| RegistryError::ReadFailed(path.display().to_string(), e.to_string()))?;
            let parsed: WalletRegistryEntry = serde_json::from_str(&raw)
                .map_err(|e| RegistryError::ParseFailed(path.display().to_string(), e.to_string()))?;
            out.insert(parsed.chain_name.clone(), parsed);
        }

        Ok(out)
    }
}

/// Downloads the IBC registry and wallet registry into local directories,
/// atomically: clear the target directory, re-download, parse. Skipped
/// entirely when `use_local` is set, in which case the existing cache is
/// read as-is (spec.md §4.3, §6's `--use-local-data`/`--use-local-keplr`).
pub struct RegistryDownloader {
    client: reqwest::Client,
    base_url: String,
}

impl RegistryDownloader {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.into(),
        }
    }

    /// Fetches the directory listing for the registry and writes each file
    /// into `target_dir`, clearing it first.
    pub async fn download_into(
        &self,
        file_names: &[String],
        target_dir: impl AsRef<Path>,
    ) -> Result<(), RegistryError> {
        let target_dir = target_dir.as_ref();
        if target_dir.exists() {
            std::fs::remove_dir_all(target_dir)
                .map_err(|e| RegistryError::ReadFailed(target_dir.display().to_string(), e.to_string()))?;
        }
        std::fs::create_dir_all(target_dir)
            .map_err(|e| RegistryError::ReadFailed(target_dir.display().to_string(), e.to_string()))?;

        for name in file_names {
            let url = format!("{}/{}", self.base_url.trim_end_matches('/'), name);
            let body = self
                .client
                .get(&url)
                .send()
                .await
                .map_err(|e| RegistryError::NetworkError(url.clone(), e.to_string()))?
                .text()
                .await
                .map_err(|e| RegistryError::NetworkError(url.clone(), e.to_string()))?;

            let dest = target_dir.join(name);
            std::fs::write(&dest, body)
                .map_err(|e| RegistryError::ReadFailed(dest.display().to_string(), e.to_string()))?;
        }

        Ok(())
    }
}
