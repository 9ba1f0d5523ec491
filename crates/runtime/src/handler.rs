//! The per-container-kind handler table. Distinct from `fleet-mediator`'s
//! request dispatch (which is keyed on a request's static type): this table
//! is keyed on the runtime value `ContainerKind`, because the runtime only
//! learns which handler to run once it loads a persisted or freshly-created
//! `Container` row. A handler is free to call back into the mediator
//! (`RuntimeClient` carries one) to dispatch typed commands/queries, or to
//! fan out to worker containers via the coordinator primitives.

use crate::client::RuntimeClient;
use async_trait::async_trait;
use fleet_core::{ContainerId, ContainerKind, CoreError, Ctx};
use std::collections::HashMap;
use std::sync::Arc;

#[async_trait]
pub trait ContainerHandler: Send + Sync {
    async fn run(&self, ctx: Ctx, client: RuntimeClient, container_id: ContainerId) -> Result<(), CoreError>;
}

#[derive(Clone, Default)]
pub struct HandlerTable {
    handlers: HashMap<ContainerKind, Arc<dyn ContainerHandler>>,
}

impl HandlerTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registering a second handler for the same kind silently replaces the
    /// first — handler registration is a startup-time builder call, not a
    /// runtime event, so there is no "duplicate" error case worth modeling.
    pub fn register(&mut self, kind: ContainerKind, handler: impl ContainerHandler + 'static) {
        self.handlers.insert(kind, Arc::new(handler));
    }

    pub fn get(&self, kind: ContainerKind) -> Option<Arc<dyn ContainerHandler>> {
        self.handlers.get(&kind).cloned()
    }
}

#[cfg(test)]
#[path = "handler_tests.rs"]
mod tests;
