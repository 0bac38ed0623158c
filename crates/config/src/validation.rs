//! Configuration and input validation.
//!
//! Input-TOML validation (spec §4.4, §7) collects every error across all
//! chains before reporting, rather than failing on the first bad field —
//! "validation of the input is total".

use std::collections::HashSet;

use crate::config::{InputChainToml, PathfinderConfig};

/// One validation failure: a field path and a message, collected rather
/// than short-circuited.
#[derive(Debug, Clone)]
pub struct ValidationError {
    pub field: String,
    pub message: String,
}

impl ValidationError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Validates the ambient runtime settings (not the chain graph — see
/// [`validate_input_chains`] for that).
pub fn validate_config(config: &PathfinderConfig) -> Vec<ValidationError> {
    let mut errors = Vec::new();

    if !matches!(config.network.log_level.as_str(), "trace" | "debug" | "info" | "warn" | "error") {
        errors.push(ValidationError::new(
            "network.log_level",
            format!("invalid log level: {}", config.network.log_level),
        ));
    }
    if config.network.metrics_enabled && config.network.metrics_port == 0 {
        errors.push(ValidationError::new(
            "network.metrics_port",
            "metrics port must be greater than 0 when metrics are enabled",
        ));
    }
    if config.planner.default_slippage_bps > 10_000 {
        errors.push(ValidationError::new(
            "planner.default_slippage_bps",
            "must be <= 10000 (100%)",
        ));
    }
    if config.planner.max_additional_hops > 2 {
        errors.push(ValidationError::new(
            "planner.max_additional_hops",
            "spec caps multi-hop search at 2 additional hops",
        ));
    }

    errors
}

/// Validates a set of human-authored chain TOMLs (spec §4.4 step 0, §7):
/// every error across every chain is collected before the build aborts, so
/// an operator sees the full list of problems in one pass.
pub fn validate_input_chains(chains: &[InputChainToml]) -> Vec<ValidationError> {
    let mut errors = Vec::new();
    let mut seen_ids = HashSet::new();

    for chain in chains {
        let prefix = format!("chains.{}", chain.id);

        if chain.id.is_empty() {
            errors.push(ValidationError::new(&prefix, "chain id must not be empty"));
        } else if !seen_ids.insert(chain.id.clone()) {
            errors.push(ValidationError::new(&prefix, "duplicate chain id"));
        }

        if chain.bech32_prefix.is_empty() {
            errors.push(ValidationError::new(format!("{prefix}.bech32_prefix"), "must not be empty"));
        }

        if chain.is_broker && chain.broker_id.is_none() {
            errors.push(ValidationError::new(
                format!("{prefix}.broker_id"),
                "chain is marked is_broker but carries no broker_id",
            ));
        }
        if chain.ibc_hooks_contract.is_some() && !chain.is_broker {
            errors.push(ValidationError::new(
                format!("{prefix}.ibc_hooks_contract"),
                "carries ibc_hooks_contract but is_broker is false",
            ));
        }

        if chain.chain.rest.is_empty() {
            errors.push(ValidationError::new(format!("{prefix}.chain.rest"), "at least one REST endpoint required"));
        }
        if chain.chain.rpcs.is_empty() {
            errors.push(ValidationError::new(format!("{prefix}.chain.rpcs"), "at least one RPC endpoint required"));
        }

        let mut seen_denoms = HashSet::new();
        for token in &chain.token {
            let token_prefix = format!("{prefix}.token.{}", token.denom);
            if token.denom.is_empty() {
                errors.push(ValidationError::new(&token_prefix, "denom must not be empty"));
            } else if !seen_denoms.insert(token.denom.clone()) {
                errors.push(ValidationError::new(&token_prefix, "duplicate token denom on this chain"));
            }
            if token.denom.starts_with("ibc/") && (token.origin_chain.is_none() || token.origin_denom.is_none()) {
                errors.push(ValidationError::new(
                    &token_prefix,
                    "ibc/ denoms must declare origin_chain and origin_denom",
                ));
            }
        }
    }

    errors
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{ChainEndpoints, EndpointEntry};

    fn chain(id: &str) -> InputChainToml {
        InputChainToml {
            name: id.to_string(),
            id: id.to_string(),
            chain_type: "cosmos".to_string(),
            registry: id.to_string(),
            bech32_prefix: "cosmos".to_string(),
            slip44: 118,
            cosmos_sdk_version: "0.50".to_string(),
            is_broker: false,
            broker_id: None,
            has_pfm: false,
            ibc_hooks_contract: None,
            explorer_details: None,
            chain: ChainEndpoints {
                rest: vec![EndpointEntry { url: "https://rest.example".to_string(), provider: None }],
                rpcs: vec![EndpointEntry { url: "https://rpc.example".to_string(), provider: None }],
            },
            token: vec![],
        }
    }

    #[test]
    fn accepts_well_formed_chain() {
        assert!(validate_input_chains(&[chain("cosmoshub-4")]).is_empty());
    }

    #[test]
    fn rejects_duplicate_ids() {
        let errors = validate_input_chains(&[chain("cosmoshub-4"), chain("cosmoshub-4")]);
        assert!(errors.iter().any(|e| e.message.contains("duplicate chain id")));
    }

    #[test]
    fn rejects_broker_without_broker_id() {
        let mut c = chain("osmosis-1");
        c.is_broker = true;
        let errors = validate_input_chains(&[c]);
        assert!(errors.iter().any(|e| e.field.ends_with("broker_id")));
    }

    #[test]
    fn collects_all_errors_instead_of_short_circuiting() {
        let mut bad = chain("");
        bad.chain.rest.clear();
        bad.chain.rpcs.clear();
        let errors = validate_input_chains(&[bad]);
        assert!(errors.len() >= 3);
    }

    #[test]
    fn validate_config_rejects_bad_log_level() {
        let mut config = PathfinderConfig::default();
        config.network.log_level = "loud".to_string();
        assert!(!validate_config(&config).is_empty());
    }
}
