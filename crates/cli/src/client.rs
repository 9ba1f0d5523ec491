//! Thin client over the daemon's Unix-socket RPC surface. One connection
//! per invocation — the CLI is not a long-lived process.

use fleet_core::{ContainerId, ContainerKind, PlayerId};
use fleet_wire::{ContainerSummary, DaemonStatus, ProtocolError, Request, Response};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tokio::net::UnixStream;

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("could not connect to daemon socket at {path}: {source}")]
    Connect { path: PathBuf, #[source] source: std::io::Error },

    #[error("protocol error: {0}")]
    Protocol(#[from] ProtocolError),

    #[error("daemon returned an error: {0}")]
    Daemon(String),

    #[error("unexpected response from daemon: {0:?}")]
    UnexpectedResponse(Response),
}

pub struct DaemonClient {
    stream: UnixStream,
}

impl DaemonClient {
    pub async fn connect(socket_path: &Path) -> Result<Self, ClientError> {
        let stream = UnixStream::connect(socket_path)
            .await
            .map_err(|source| ClientError::Connect { path: socket_path.to_path_buf(), source })?;
        Ok(Self { stream })
    }

    async fn send(&mut self, request: &Request) -> Result<Response, ClientError> {
        fleet_wire::write_request(&mut self.stream, request).await?;
        Ok(fleet_wire::read_response(&mut self.stream).await?)
    }

    fn reject<T>(response: Response) -> Result<T, ClientError> {
        match response {
            Response::Error { message } => Err(ClientError::Daemon(message)),
            other => Err(ClientError::UnexpectedResponse(other)),
        }
    }

    pub async fn create_container(&mut self, kind: ContainerKind, player_id: PlayerId) -> Result<ContainerId, ClientError> {
        match self.send(&Request::CreateContainer { kind, player_id }).await? {
            Response::ContainerCreated { id } => Ok(id),
            other => Self::reject(other),
        }
    }

    pub async fn start_container(&mut self, id: ContainerId, await_completion: bool) -> Result<(), ClientError> {
        match self.send(&Request::StartContainer { id, await_completion }).await? {
            Response::Ok => Ok(()),
            other => Self::reject(other),
        }
    }

    pub async fn stop_container(&mut self, id: ContainerId) -> Result<(), ClientError> {
        match self.send(&Request::StopContainer { id }).await? {
            Response::Ok => Ok(()),
            other => Self::reject(other),
        }
    }

    pub async fn restart_container(&mut self, id: ContainerId) -> Result<(), ClientError> {
        match self.send(&Request::RestartContainer { id }).await? {
            Response::Ok => Ok(()),
            other => Self::reject(other),
        }
    }

    pub async fn get_container(&mut self, id: ContainerId) -> Result<Option<ContainerSummary>, ClientError> {
        match self.send(&Request::GetContainer { id }).await? {
            Response::Container { container } => Ok(container),
            other => Self::reject(other),
        }
    }

    pub async fn list_containers(&mut self, player_id: PlayerId) -> Result<Vec<ContainerSummary>, ClientError> {
        match self.send(&Request::ListContainers { player_id }).await? {
            Response::Containers { containers } => Ok(containers),
            other => Self::reject(other),
        }
    }

    pub async fn status(&mut self) -> Result<DaemonStatus, ClientError> {
        match self.send(&Request::Status).await? {
            Response::Status { daemon } => Ok(daemon),
            other => Self::reject(other),
        }
    }

    pub async fn raw_send(
        &mut self,
        request_type: String,
        payload: serde_json::Value,
        player_id: Option<PlayerId>,
    ) -> Result<serde_json::Value, ClientError> {
        match self.send(&Request::Send { request_type, payload, player_id }).await? {
            Response::Sent { payload } => Ok(payload),
            other => Self::reject(other),
        }
    }
}

#[cfg(test)]
#[path = "client_tests.rs"]
mod tests;
