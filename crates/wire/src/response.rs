//! Response types the daemon sends back to the CLI.

use fleet_core::{Container, ContainerId, ContainerKind, ContainerStatus};
use serde::{Deserialize, Serialize};

/// A denormalised, wire-friendly projection of [`fleet_core::Container`].
/// Kept separate from the domain type so the lifecycle machine's internal
/// shape can change without touching the protocol.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ContainerSummary {
    pub id: ContainerId,
    pub kind: ContainerKind,
    pub player_id: String,
    pub status: ContainerStatus,
    pub restart_count: u32,
    pub restart_bound: u32,
    pub iteration: u64,
    pub iteration_bound: u64,
    pub interrupted: bool,
    pub last_error: Option<String>,
}

impl From<&Container> for ContainerSummary {
    fn from(container: &Container) -> Self {
        Self {
            id: container.id,
            kind: container.kind,
            player_id: container.player_id.clone(),
            status: container.status(),
            restart_count: container.restart_count,
            restart_bound: container.restart_bound,
            iteration: container.iteration,
            iteration_bound: container.iteration_bound,
            interrupted: container.interrupted,
            last_error: container.lifecycle.last_error().map(str::to_owned),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DaemonStatus {
    pub version: String,
    pub uptime_secs: u64,
    pub containers_active: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type")]
pub enum Response {
    /// Generic success with no payload.
    Ok,
    ContainerCreated {
        id: ContainerId,
    },
    Container {
        container: Option<ContainerSummary>,
    },
    Containers {
        containers: Vec<ContainerSummary>,
    },
    /// Result of a pass-through `Send`; the payload is whatever the target
    /// handler's response serialises to.
    Sent {
        payload: serde_json::Value,
    },
    Status {
        daemon: DaemonStatus,
    },
    Error {
        message: String,
    },
}

#[cfg(test)]
#[path = "response_tests.rs"]
mod tests;
