//! The narrow capability coordinators and workers get instead of the full
//! runtime: only Create, Start, Stop, List, Get. Breaks the
//! coordinator->runtime->handler->mediator->coordinator type cycle — a
//! handler only ever sees this, never the concrete `ContainerRuntime<C>`.

use async_trait::async_trait;
use fleet_core::{Container, ContainerId, ContainerKind, CoreError, PlayerId};
use std::sync::Arc;
use tokio::sync::mpsc;

#[async_trait]
pub trait RuntimeFacade: Send + Sync {
    async fn create(&self, kind: ContainerKind, player: PlayerId) -> Result<ContainerId, CoreError>;
    async fn start(&self, id: ContainerId, completion: Option<mpsc::Sender<ContainerId>>) -> Result<(), CoreError>;
    async fn stop(&self, id: ContainerId) -> Result<(), CoreError>;
    async fn list(&self, player: &PlayerId) -> Result<Vec<Container>, CoreError>;
    async fn get(&self, id: ContainerId) -> Result<Option<Container>, CoreError>;
}

#[derive(Clone)]
pub struct RuntimeClient {
    facade: Arc<dyn RuntimeFacade>,
}

impl RuntimeClient {
    pub fn new(facade: Arc<dyn RuntimeFacade>) -> Self {
        Self { facade }
    }

    pub async fn create(&self, kind: ContainerKind, player: PlayerId) -> Result<ContainerId, CoreError> {
        self.facade.create(kind, player).await
    }

    pub async fn start(&self, id: ContainerId, completion: Option<mpsc::Sender<ContainerId>>) -> Result<(), CoreError> {
        self.facade.start(id, completion).await
    }

    pub async fn stop(&self, id: ContainerId) -> Result<(), CoreError> {
        self.facade.stop(id).await
    }

    pub async fn list(&self, player: &PlayerId) -> Result<Vec<Container>, CoreError> {
        self.facade.list(player).await
    }

    pub async fn get(&self, id: ContainerId) -> Result<Option<Container>, CoreError> {
        self.facade.get(id).await
    }
}
