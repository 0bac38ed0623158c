//! Crate-boundary error aggregation. Each module owns the error type for its
//! own failure modes (`graph::GraphError`, `denom::DenomError`,
//! `traits::BrokerError`, `address::AddressError`); this module only
//! aggregates them at the two places callers outside the crate actually see:
//! building the graph/index, and planning a single request.

use thiserror::Error;

use crate::address::AddressError;
use crate::graph::GraphError;
use crate::traits::BrokerError;

#[derive(Debug, Error)]
pub enum PlannerError {
    #[error("no route from {from} to {to} carrying denom {denom}")]
    NoRoute { from: String, to: String, denom: String },

    #[error("broker quote exceeds slippage tolerance after {bps} bps")]
    SlippageExceeded { bps: u32 },

    #[error("broker quote failed: {0}")]
    BrokerUnavailable(#[from] BrokerError),

    #[error("address conversion failed: {0}")]
    AddressConversion(#[from] AddressError),

    #[error("chain graph error: {0}")]
    Graph(#[from] GraphError),

    #[error("memo construction failed: {0}")]
    Memo(#[from] pathfinder_memo::MemoError),

    #[error("invariant violation: {0}")]
    Internal(String),
}

/// Top-level error for the engine crate's build-time entry points (graph +
/// index construction). Request-time planning failures use [`PlannerError`]
/// directly, since a caller needs to distinguish "no route" (a normal,
/// non-error outcome folded into `RouteResponse::Impossible`) from a broker
/// transport failure.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error(transparent)]
    Graph(#[from] GraphError),

    #[error(transparent)]
    Planner(#[from] PlannerError),
}
