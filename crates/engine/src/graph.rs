//! The chain graph model (spec §4.7): immutable after build, owned by the
//! enriched config builder and handed to the route index as a read-only
//! reference for the lifetime of the process.

use pathfinder_types::Chain;
use std::collections::HashMap;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum GraphError {
    #[error("chain {0} not present in the graph")]
    ChainNotFound(String),

    #[error("duplicate chain id: {0}")]
    DuplicateChain(String),

    #[error("chain {0} failed its invariant check: {1}")]
    InvalidChain(String, String),
}

/// The enriched, read-only chain graph the route index is built from.
#[derive(Debug, Clone, Default)]
pub struct ChainGraph {
    chains: HashMap<String, Chain>,
}

impl ChainGraph {
    pub fn from_chains(chains: Vec<Chain>) -> Result<Self, GraphError> {
        let mut map = HashMap::with_capacity(chains.len());
        for chain in chains {
            chain
                .validate_invariants()
                .map_err(|msg| GraphError::InvalidChain(chain.id.clone(), msg))?;
            if map.insert(chain.id.clone(), chain).is_some() {
                return Err(GraphError::DuplicateChain(
                    map.keys().next().cloned().unwrap_or_default(),
                ));
            }
        }
        Ok(Self { chains: map })
    }

    pub fn get(&self, chain_id: &str) -> Option<&Chain> {
        self.chains.get(chain_id)
    }

    pub fn require(&self, chain_id: &str) -> Result<&Chain, GraphError> {
        self.get(chain_id)
            .ok_or_else(|| GraphError::ChainNotFound(chain_id.to_string()))
    }

    pub fn chain_ids(&self) -> impl Iterator<Item = &str> {
        self.chains.keys().map(String::as_str)
    }

    pub fn chains(&self) -> impl Iterator<Item = &Chain> {
        self.chains.values()
    }

    pub fn as_map(&self) -> &HashMap<String, Chain> {
        &self.chains
    }

    pub fn len(&self) -> usize {
        self.chains.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chains.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pathfinder_types::Chain;

    fn chain(id: &str) -> Chain {
        Chain {
            id: id.to_string(),
            name: id.to_string(),
            bech32_prefix: "cosmos".to_string(),
            slip44: 118,
            has_pfm: false,
            is_broker: false,
            broker_id: None,
            ibc_hooks_contract: None,
            native_tokens: vec![],
            routes: vec![],
        }
    }

    #[test]
    fn rejects_duplicate_chain_ids() {
        let err = ChainGraph::from_chains(vec![chain("cosmoshub-4"), chain("cosmoshub-4")]);
        assert!(err.is_err());
    }

    #[test]
    fn rejects_broker_without_broker_id() {
        let mut c = chain("osmosis-1");
        c.is_broker = true;
        let err = ChainGraph::from_chains(vec![c]);
        assert!(matches!(err, Err(GraphError::InvalidChain(_, _))));
    }

    #[test]
    fn accepts_well_formed_graph() {
        let graph = ChainGraph::from_chains(vec![chain("cosmoshub-4"), chain("osmosis-1")]).unwrap();
        assert_eq!(graph.len(), 2);
        assert!(graph.get("osmosis-1").is_some());
    }
}
