//! Middleware chain composed fresh on every dispatch. Operates on the
//! erased request/response so it can sit in front of any handler —
//! see [`crate::mediator::ErasedRequest`].

use crate::error::MediatorError;
use crate::mediator::{ErasedHandlerFn, ErasedRequest, ErasedResponse};
use async_trait::async_trait;
use fleet_core::Ctx;
use std::sync::Arc;

/// The rest of the chain, including the terminal handler. Call [`Next::run`]
/// to continue; a middleware that doesn't call it short-circuits dispatch.
pub struct Next<'a> {
    pub(crate) middlewares: &'a [Arc<dyn Middleware>],
    pub(crate) handler: &'a ErasedHandlerFn,
}

impl<'a> Next<'a> {
    pub fn run(
        self,
        ctx: Ctx,
        req: ErasedRequest,
    ) -> futures_util::future::BoxFuture<'a, Result<ErasedResponse, MediatorError>> {
        match self.middlewares.split_first() {
            Some((mw, rest)) => {
                let next = Next { middlewares: rest, handler: self.handler };
                mw.call(ctx, req, next)
            }
            None => (self.handler)(ctx, req),
        }
    }
}

#[async_trait]
pub trait Middleware: Send + Sync {
    async fn call(&self, ctx: Ctx, req: ErasedRequest, next: Next<'_>) -> Result<ErasedResponse, MediatorError>;
}

/// Resolves the current player's API token from the player repository and
/// attaches it to the context. Required by every handler that talks to the
/// remote game API; a no-op when the context carries no player id (internal
/// dispatches that don't need the token).
pub struct PlayerTokenMiddleware<R: PlayerTokenSource> {
    repo: Arc<R>,
}

impl<R: PlayerTokenSource> PlayerTokenMiddleware<R> {
    pub fn new(repo: Arc<R>) -> Self {
        Self { repo }
    }
}

/// Resolves a player's API token. Implemented by `fleet-adapters`'s
/// `PlayerTokenRepository` against the persisted player table; kept generic
/// here so the mediator crate need not depend on storage.
#[async_trait]
pub trait PlayerTokenSource: Send + Sync {
    async fn token_for(&self, ctx: &Ctx, player: &fleet_core::PlayerId) -> Result<String, MediatorError>;
}

#[async_trait]
impl<R: PlayerTokenSource + 'static> Middleware for PlayerTokenMiddleware<R> {
    async fn call(&self, ctx: Ctx, req: ErasedRequest, next: Next<'_>) -> Result<ErasedResponse, MediatorError> {
        let ctx = match ctx.player_id() {
            Some(player) if ctx.player_token().is_none() => {
                let token = self.repo.token_for(&ctx, player).await?;
                ctx.with_player_token(token)
            }
            _ => ctx,
        };
        next.run(ctx, req).await
    }
}

/// Carries an incoming operation context through unchanged. Handlers that
/// spawn a child request for another container are expected to replace it
/// explicitly via `Ctx::with_operation` before calling `Mediator::send`
/// again; this middleware only guards against it being silently dropped.
pub struct OperationContextMiddleware;

#[async_trait]
impl Middleware for OperationContextMiddleware {
    async fn call(&self, ctx: Ctx, req: ErasedRequest, next: Next<'_>) -> Result<ErasedResponse, MediatorError> {
        next.run(ctx, req).await
    }
}
