//! The dispatch table itself. Per the design notes: the unsafe-feeling part
//! — type-erased storage and downcasting — lives only here; every other
//! crate works through the statically-typed [`crate::Request`] /
//! [`crate::Handler`] traits.

use crate::error::MediatorError;
use crate::middleware::{Middleware, Next};
use crate::request::{Handler, Request};
use fleet_core::Ctx;
use futures_util::future::BoxFuture;
use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::sync::Arc;

pub type ErasedRequest = Box<dyn Any + Send>;
pub type ErasedResponse = Box<dyn Any + Send>;
pub type ErasedHandlerFn =
    dyn Fn(Ctx, ErasedRequest) -> BoxFuture<'static, Result<ErasedResponse, MediatorError>> + Send + Sync;

/// Typed command/query dispatcher with a middleware chain.
///
/// Stateless after construction: registration is a startup phase, `send` is
/// safe to call concurrently from any task once built, and handlers may call
/// `send` recursively (including from inside a container).
pub struct Mediator {
    handlers: HashMap<TypeId, Arc<ErasedHandlerFn>>,
    middlewares: Vec<Arc<dyn Middleware>>,
}

impl Mediator {
    pub fn new() -> Self {
        Self { handlers: HashMap::new(), middlewares: Vec::new() }
    }

    /// Register the handler for `R`. Fails if a handler for `R` already
    /// exists — duplicate type tokens are a startup-time bug, not a runtime
    /// condition to tolerate.
    pub fn register<R, H>(&mut self, handler: H) -> Result<(), MediatorError>
    where
        R: Request,
        H: Handler<R> + 'static,
    {
        let type_id = TypeId::of::<R>();
        if self.handlers.contains_key(&type_id) {
            return Err(MediatorError::DuplicateHandler);
        }
        let handler = Arc::new(handler);
        let erased: Arc<ErasedHandlerFn> = Arc::new(move |ctx, req| {
            let handler = handler.clone();
            Box::pin(async move {
                let typed = req.downcast::<R>().map_err(|_| MediatorError::TypeMismatch)?;
                let resp = handler.handle(&ctx, *typed).await?;
                Ok(Box::new(resp) as ErasedResponse)
            })
        });
        self.handlers.insert(type_id, erased);
        Ok(())
    }

    /// Appended to the end of the chain, in registration order; `send`
    /// rebuilds the chain per call (acceptable — chains are 2-4 deep and
    /// dispatch is not on the fast path).
    pub fn use_middleware(&mut self, middleware: impl Middleware + 'static) {
        self.middlewares.push(Arc::new(middleware));
    }

    pub async fn send<R: Request>(&self, ctx: Ctx, req: R) -> Result<R::Response, MediatorError> {
        let type_id = TypeId::of::<R>();
        let handler = self.handlers.get(&type_id).ok_or(MediatorError::NoHandler)?.clone();
        let next = Next { middlewares: &self.middlewares, handler: &*handler };
        let erased_req: ErasedRequest = Box::new(req);
        let erased_resp = next.run(ctx, erased_req).await?;
        let typed = erased_resp.downcast::<R::Response>().map_err(|_| MediatorError::TypeMismatch)?;
        Ok(*typed)
    }
}

impl Default for Mediator {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
#[path = "mediator_tests.rs"]
mod tests;
