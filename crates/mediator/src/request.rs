//! The typed command/query surface the mediator dispatches.

use crate::error::MediatorError;
use async_trait::async_trait;
use fleet_core::Ctx;

/// A dispatchable request. `Response` is the type `Mediator::send` returns
/// on success; the mediator's `TypeId` table is keyed on `Self`, so two
/// requests with the same shape but different names never collide.
pub trait Request: Send + 'static {
    type Response: Send + 'static;
}

/// The logic behind one request type. Registered once per `R` at startup;
/// `Mediator::register` rejects a second registration for the same `R`.
#[async_trait]
pub trait Handler<R: Request>: Send + Sync {
    async fn handle(&self, ctx: &Ctx, req: R) -> Result<R::Response, MediatorError>;
}
