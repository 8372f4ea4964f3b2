use async_trait::async_trait;
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use std::sync::Arc;
use ticker_core::{Token, TokenId};
use ticker_ports::{StoreError, StoreResult, TokenRepository};

/// In-memory token store with per-token optimistic concurrency
pub struct InMemoryTokenRepository {
    tokens: Arc<DashMap<TokenId, Token>>,
}

impl InMemoryTokenRepository {
    pub fn new() -> Self {
        InMemoryTokenRepository {
            tokens: Arc::new(DashMap::new()),
        }
    }

    /// Add or overwrite a token without a version check (seeding, tests)
    pub fn add(&self, token: Token) {
        self.tokens.insert(token.id, token);
    }

    /// Get a token (sync)
    pub fn get_sync(&self, id: TokenId) -> Option<Token> {
        self.tokens.get(&id).map(|t| t.clone())
    }

    /// Every token, including delisted ones (sync)
    pub fn all(&self) -> Vec<Token> {
        self.tokens
            .iter()
            .map(|entry| entry.value().clone())
            .collect()
    }

    /// Number of tradable tokens
    pub fn active_count(&self) -> usize {
        self.tokens
            .iter()
            .filter(|entry| entry.value().is_tradable())
            .count()
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }
}

impl Default for InMemoryTokenRepository {
    fn default() -> Self {
        Self::new()
    }
}

impl Clone for InMemoryTokenRepository {
    fn clone(&self) -> Self {
        InMemoryTokenRepository {
            tokens: Arc::clone(&self.tokens),
        }
    }
}

#[async_trait]
impl TokenRepository for InMemoryTokenRepository {
    async fn list_active(&self) -> StoreResult<Vec<Token>> {
        Ok(self
            .tokens
            .iter()
            .filter(|entry| entry.value().is_tradable())
            .map(|entry| entry.value().clone())
            .collect())
    }

    async fn get(&self, id: TokenId) -> StoreResult<Option<Token>> {
        Ok(self.get_sync(id))
    }

    async fn save(&self, mut token: Token) -> StoreResult<Token> {
        let mut stored = self
            .tokens
            .get_mut(&token.id)
            .ok_or(StoreError::NotFound(token.id))?;

        if stored.version != token.version {
            return Err(StoreError::VersionConflict {
                token_id: token.id,
                expected: token.version,
                found: stored.version,
            });
        }

        token.version += 1;
        *stored = token.clone();
        Ok(token)
    }

    async fn insert(&self, mut token: Token) -> StoreResult<Token> {
        match self.tokens.entry(token.id) {
            Entry::Occupied(_) => Err(StoreError::Duplicate(token.id)),
            Entry::Vacant(slot) => {
                token.version = 0;
                slot.insert(token.clone());
                Ok(token)
            }
        }
    }
}
