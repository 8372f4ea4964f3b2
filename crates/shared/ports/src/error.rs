use thiserror::Error;
use ticker_core::TokenId;

/// Errors raised by store-backed ports
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    #[error("Store unavailable: {0}")]
    Unavailable(String),

    #[error("Token not found: {0}")]
    NotFound(TokenId),

    #[error("Token already exists: {0}")]
    Duplicate(TokenId),

    /// Another writer updated the token since it was read
    #[error("Stale write for token {token_id}: expected version {expected}, found {found}")]
    VersionConflict {
        token_id: TokenId,
        expected: u64,
        found: u64,
    },
}

pub type StoreResult<T> = std::result::Result<T, StoreError>;
