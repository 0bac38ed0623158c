//! Configuration for the Cosmos IBC pathfinder.
//!
//! Two concerns live here: the ambient runtime settings (log level, broker
//! URLs, slippage defaults) loaded via [`loader::ConfigLoader`] with
//! `PATHFINDER_`-prefixed env overrides and hot-reload support
//! ([`watcher::ConfigWatcher`]); and the Enriched Config Builder
//! ([`builder::EnrichedConfigBuilder`]), which joins the human-authored
//! input chain TOMLs with the IBC/wallet registries into the
//! [`pathfinder_engine::ChainGraph`] the planner runs against, and
//! serializes the result into the two output config shapes.

pub mod builder;
pub mod config;
pub mod loader;
pub mod validation;
pub mod watcher;

pub use builder::{BuildOptions, BuildWarning, EnrichedConfigBuilder};
pub use config::{
    BrokersConfig, ChainEndpoints, ClientChain, ClientConfig, ClientToken, ConfigError, EndpointEntry,
    ExplorerDetails, InputChainToml, InputToken, NetworkConfig, PathfinderConfig, PathfinderRuntimeConfig,
    PlannerConfig, RegistrySourcesConfig, ResolverConfig, Result, RuntimeChain, RuntimeRoute,
};
pub use loader::{load_input_chains, ConfigLoader, ConfigLoaderBuilder};
pub use validation::{validate_config, validate_input_chains, ValidationError};
pub use watcher::ConfigWatcher;
