use async_trait::async_trait;
use ticker_core::{Token, TokenId};

use crate::error::StoreResult;

/// Durable state of every token
///
/// Writes use optimistic concurrency: `save` only succeeds when the stored
/// `version` still equals the version of the token being written, and the
/// stored copy comes back with its version bumped.
#[async_trait]
pub trait TokenRepository: Send + Sync {
    /// All tokens that are active and not delisted
    async fn list_active(&self) -> StoreResult<Vec<Token>>;

    /// Get a token by ID
    async fn get(&self, id: TokenId) -> StoreResult<Option<Token>>;

    /// Update an existing token (compare-and-swap on `version`)
    async fn save(&self, token: Token) -> StoreResult<Token>;

    /// Insert a brand new token
    async fn insert(&self, token: Token) -> StoreResult<Token>;
}
