pub mod error;
pub mod ibc;

pub use error::MemoError;
pub use ibc::{
    build_pfm_forward, build_pfm_wrapping_wasm, build_pfm_wrapping_wasm_wrapping_pfm,
    build_wasm_swap_and_action, build_wasm_swap_and_action_with_nested_pfm, default_timeout_timestamp_ns,
    PfmHop, PostSwapAction,
};

/// A single pool hop inside a broker's swap route, shared between the
/// broker client trait (`pathfinder_engine::traits::SwapOperation`) and the
/// memo builder so the two crates don't need to depend on each other's
/// internal types.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct SwapOperationJson {
    pub pool_id: String,
    pub denom_in: String,
    pub denom_out: String,
}
