pub mod address;
pub mod broker_urls;
pub mod denom;
pub mod error;
pub mod facade;
pub mod graph;
pub mod osmosis;
pub mod planner;
pub mod route_index;
pub mod skipgo;
pub mod traits;

pub use address::{decode_prefix, to_prefix, AddressError};
pub use denom::{compute_ibc_denom, extend_trace, DenomError, DenomResolver, DenomTraceCache};
pub use error::{EngineError, PlannerError};
pub use facade::PathfinderService;
pub use graph::{ChainGraph, GraphError};
pub use osmosis::OsmosisClient;
pub use planner::Planner;
pub use route_index::{PathHop, RouteIndex};
pub use skipgo::SkipGoClient;
pub use traits::{BrokerClient, BrokerError, BrokerQuote, SwapOperation};
