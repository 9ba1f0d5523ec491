//! Request types the CLI sends to the daemon.

use fleet_core::{ContainerId, ContainerKind, PlayerId};
use serde::{Deserialize, Serialize};

/// One request frame. `CreateContainer` covers every container type instead
/// of one variant per type (the RPC surface described elsewhere as
/// "CreateXxxContainer, one per container type") — the type is already a
/// closed enum, so a single variant parameterised on it carries the same
/// guarantee without multiplying match arms here and in the daemon's
/// dispatcher.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type")]
pub enum Request {
    /// Persist a PENDING container row; does not start it.
    CreateContainer { kind: ContainerKind, player_id: PlayerId },
    /// Transition PENDING to RUNNING. `await_completion` asks the daemon to
    /// hold the response frame until the container reaches a terminal
    /// status rather than returning as soon as the task is spawned.
    StartContainer {
        id: ContainerId,
        #[serde(default)]
        await_completion: bool,
    },
    StopContainer {
        id: ContainerId,
    },
    RestartContainer {
        id: ContainerId,
    },
    GetContainer {
        id: ContainerId,
    },
    ListContainers {
        player_id: PlayerId,
    },
    /// Pass-through to the mediator for a synchronous command or query
    /// outside the container lifecycle surface above. `request_type`
    /// matches the type token the target handler registered under.
    Send {
        request_type: String,
        payload: serde_json::Value,
        #[serde(default)]
        player_id: Option<PlayerId>,
    },
    /// Health check / uptime query.
    Status,
}

#[cfg(test)]
#[path = "request_tests.rs"]
mod tests;
