//! Resolves a player's game-API token. Implements
//! [`fleet_mediator::PlayerTokenSource`] so the player-token middleware can
//! depend on it without the mediator crate depending on storage.

use async_trait::async_trait;
use fleet_core::{Ctx, PlayerId};
use fleet_mediator::{MediatorError, PlayerTokenSource};
use std::collections::HashMap;
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::RwLock;

#[derive(Debug, Error)]
pub enum PlayerTokenError {
    #[error("no token registered for player {0}")]
    Unknown(String),
}

impl From<PlayerTokenError> for MediatorError {
    fn from(err: PlayerTokenError) -> Self {
        MediatorError::Core(fleet_core::CoreError::Api(err.to_string()))
    }
}

#[async_trait]
pub trait PlayerTokenRepository: Send + Sync {
    async fn token_for(&self, player: &PlayerId) -> Result<String, PlayerTokenError>;
    async fn set_token(&self, player: PlayerId, token: String);
}

/// In-memory repository, populated at startup from the daemon's config
/// (one player per process, per the spec's environment section) or via an
/// RPC admin call. Swappable for a persisted-table-backed implementation
/// without touching the middleware.
#[derive(Clone, Default)]
pub struct InMemoryPlayerTokenRepository {
    tokens: Arc<RwLock<HashMap<String, String>>>,
}

impl InMemoryPlayerTokenRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_token(player: PlayerId, token: impl Into<String>) -> Self {
        let repo = Self::new();
        let tokens = repo.tokens.clone();
        tokens.blocking_write().insert(player.as_str().to_string(), token.into());
        repo
    }
}

#[async_trait]
impl PlayerTokenRepository for InMemoryPlayerTokenRepository {
    async fn token_for(&self, player: &PlayerId) -> Result<String, PlayerTokenError> {
        self.tokens
            .read()
            .await
            .get(player.as_str())
            .cloned()
            .ok_or_else(|| PlayerTokenError::Unknown(player.as_str().to_string()))
    }

    async fn set_token(&self, player: PlayerId, token: String) {
        self.tokens.write().await.insert(player.as_str().to_string(), token);
    }
}

#[async_trait]
impl PlayerTokenSource for InMemoryPlayerTokenRepository {
    async fn token_for(&self, _ctx: &Ctx, player: &PlayerId) -> Result<String, MediatorError> {
        PlayerTokenRepository::token_for(self, player).await.map_err(Into::into)
    }
}

#[cfg(test)]
#[path = "player_token_tests.rs"]
mod tests;
