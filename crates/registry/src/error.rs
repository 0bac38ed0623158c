use thiserror::Error;

#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("registry directory not found: {0}")]
    DirectoryNotFound(String),

    #[error("failed to read registry file {0}: {1}")]
    ReadFailed(String, String),

    #[error("failed to parse registry file {0}: {1}")]
    ParseFailed(String, String),

    #[error("no IBC registry file found for chain pair ({0}, {1})")]
    MissingPairFile(String, String),

    #[error("chain pair file {0} has no live channel")]
    NoLiveChannel(String),

    #[error("wallet registry entry not found for chain {0}")]
    MissingWalletEntry(String),

    #[error("network error fetching {0}: {1}")]
    NetworkError(String, String),

    #[error("no healthy endpoint survived consensus for chain {0}")]
    NoConsensus(String),
}
