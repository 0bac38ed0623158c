//! IBC channel registry ingestion and endpoint consensus verification.
//!
//! Two responsibilities, both feeding the config builder in
//! `pathfinder-config`: [`consensus`] probes candidate RPC endpoints for a
//! chain and filters them down to a consistent, healthy set; [`ibc_registry`]
//! parses the public IBC channel registry and per-chain wallet registry
//! (downloaded or local-cached) into structured records.

pub mod consensus;
pub mod error;
pub mod ibc_registry;

pub use consensus::{ConsensusReport, EndpointConsensusVerifier, EndpointMetadata, ExcludedEndpoint};
pub use error::RegistryError;
pub use ibc_registry::{
    ChainRef, ChannelEntry, ChannelSide, ChannelTags, IbcPairFile, RegistryDownloader,
    RegistryIngestor, WalletCurrency, WalletRegistryEntry,
};
