use thiserror::Error;

#[derive(Debug, Error)]
pub enum MemoError {
    #[error("empty hop list passed to PFM memo builder")]
    EmptyHops,

    #[error("swap operation list is empty, cannot synthesize swap_and_action")]
    EmptySwapOperations,

    #[error("json serialization failed: {0}")]
    Json(#[from] serde_json::Error),
}
