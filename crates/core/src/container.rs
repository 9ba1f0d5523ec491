//! Container identity, kind, and the metadata the runtime persists per task.

use crate::clock::Clock;
use crate::lifecycle::{Lifecycle, LifecycleStatus};
use serde::{Deserialize, Serialize};

crate::define_id! {
    /// Unique identifier for a supervised background task.
    pub struct ContainerId("cnt-");
}

/// The domain behavior a container runs. The mediator dispatches on this to
/// find the handler; coordinators use `CountByContainerPrefix`-style lookups
/// keyed off the variant tag rather than this enum directly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContainerKind {
    ScoutTour,
    ScoutFleetAssignment,
    Navigate,
    MiningWorker,
    MiningCoordinator,
    TransportWorker,
    ContractWorkflow,
    ContractFleetCoordinator,
    Balancing,
    FactoryCoordinator,
    FactoryWorker,
    ArbitrageWorker,
    ArbitrageCoordinator,
    Purchase,
}

crate::simple_display! {
    ContainerKind {
        ScoutTour => "scout_tour",
        ScoutFleetAssignment => "scout_fleet_assignment",
        Navigate => "navigate",
        MiningWorker => "mining_worker",
        MiningCoordinator => "mining_coordinator",
        TransportWorker => "transport_worker",
        ContractWorkflow => "contract_workflow",
        ContractFleetCoordinator => "contract_fleet_coordinator",
        Balancing => "balancing",
        FactoryCoordinator => "factory_coordinator",
        FactoryWorker => "factory_worker",
        ArbitrageWorker => "arbitrage_worker",
        ArbitrageCoordinator => "arbitrage_coordinator",
        Purchase => "purchase",
    }
}

impl ContainerKind {
    /// Whether containers of this kind fan work out to worker containers
    /// (Primitives A-D apply) rather than driving ships directly.
    pub fn is_coordinator(self) -> bool {
        matches!(
            self,
            ContainerKind::MiningCoordinator
                | ContainerKind::FactoryCoordinator
                | ContainerKind::ScoutFleetAssignment
                | ContainerKind::ContractFleetCoordinator
                | ContainerKind::ArbitrageCoordinator
        )
    }
}

/// Externally-visible status. A superset of [`LifecycleStatus`]: adds
/// STOPPING (graceful shutdown in flight) and INTERRUPTED (recovered from a
/// crash, not auto-resumed) which the lifecycle machine itself does not
/// model — the runtime layers them on top.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContainerStatus {
    Pending,
    Running,
    Stopping,
    Completed,
    Failed,
    Stopped,
    Interrupted,
}

crate::simple_display! {
    ContainerStatus {
        Pending => "pending",
        Running => "running",
        Stopping => "stopping",
        Completed => "completed",
        Failed => "failed",
        Stopped => "stopped",
        Interrupted => "interrupted",
    }
}

impl From<LifecycleStatus> for ContainerStatus {
    fn from(s: LifecycleStatus) -> Self {
        match s {
            LifecycleStatus::Pending => ContainerStatus::Pending,
            LifecycleStatus::Running => ContainerStatus::Running,
            LifecycleStatus::Completed => ContainerStatus::Completed,
            LifecycleStatus::Failed => ContainerStatus::Failed,
            LifecycleStatus::Stopped => ContainerStatus::Stopped,
        }
    }
}

/// Upper bound on automatic restarts before a FAILED container is left alone.
pub const DEFAULT_RESTART_BOUND: u32 = 3;

/// Metadata the runtime persists for one container, independent of the
/// in-memory task handle the runtime layers on top at runtime.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Container {
    pub id: ContainerId,
    pub kind: ContainerKind,
    pub player_id: String,
    pub lifecycle: Lifecycle,
    /// True once the runtime has flagged this row INTERRUPTED on startup
    /// recovery; cleared only by an explicit operator restart or stop.
    #[serde(default)]
    pub interrupted: bool,
    /// Graceful-stop in progress; set between `Stop` being requested and the
    /// handler task actually returning.
    #[serde(default)]
    pub stopping: bool,
    #[serde(default)]
    pub restartable: bool,
    #[serde(default)]
    pub restart_count: u32,
    pub restart_bound: u32,
    #[serde(default)]
    pub iteration: u64,
    pub iteration_bound: u64,
    #[serde(default)]
    pub parent_id: Option<ContainerId>,
}

impl Container {
    pub fn new(kind: ContainerKind, player_id: impl Into<String>, clock: &impl Clock) -> Self {
        Self {
            id: ContainerId::new(),
            kind,
            player_id: player_id.into(),
            lifecycle: Lifecycle::new(clock),
            interrupted: false,
            stopping: false,
            restartable: true,
            restart_count: 0,
            restart_bound: DEFAULT_RESTART_BOUND,
            iteration: 0,
            iteration_bound: 0,
            parent_id: None,
        }
    }

    pub fn with_parent(mut self, parent_id: ContainerId) -> Self {
        self.parent_id = Some(parent_id);
        self
    }

    /// The status an observer sees, folding in the runtime-layered states
    /// that [`Lifecycle`] itself has no notion of.
    pub fn status(&self) -> ContainerStatus {
        if self.interrupted && self.lifecycle.status() == LifecycleStatus::Failed {
            return ContainerStatus::Interrupted;
        }
        if self.stopping && self.lifecycle.status() == LifecycleStatus::Running {
            return ContainerStatus::Stopping;
        }
        self.lifecycle.status().into()
    }

    /// Whether the restart policy still permits another automatic restart.
    pub fn has_restart_budget(&self) -> bool {
        self.restartable && self.restart_count < self.restart_bound
    }

    /// Advance the iteration counter. Returns `true` if the caller's loop
    /// should stop because the bound has been reached (bound of 0 means
    /// unbounded).
    pub fn increment_iteration(&mut self) -> bool {
        self.iteration += 1;
        self.iteration_bound > 0 && self.iteration >= self.iteration_bound
    }

    /// Exponential backoff for the Nth restart: base 1s, doubling, capped
    /// at 60s.
    pub fn restart_backoff(attempt: u32) -> std::time::Duration {
        let capped_shift = attempt.min(6);
        let secs = 1u64.saturating_shl(capped_shift).min(60);
        std::time::Duration::from_secs(secs)
    }
}

#[cfg(test)]
#[path = "container_tests.rs"]
mod tests;
