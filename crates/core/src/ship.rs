//! The ship-assignment lock registry: the six-and-two operations in the
//! contract, plus the [`Assignment`] record they operate on. The default
//! implementation lives in `fleet-storage` (SQLite, exclusivity enforced by
//! a unique partial index); this crate only defines the contract so the
//! runtime and coordinators can depend on it without depending on storage.

use crate::context::Ctx;
use crate::container::ContainerId;
use crate::error::CoreError;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// A ship symbol as assigned by the remote game API (e.g. `"BUYER-1"`).
/// Not a [`crate::define_id!`] type: these are externally issued, not
/// generated by us.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ShipSymbol(pub String);

impl ShipSymbol {
    pub fn new(s: impl Into<String>) -> Self {
        Self(s.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for ShipSymbol {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for ShipSymbol {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

/// A player identifier, scoping every assignment and container to a single
/// account. Externally issued, same rationale as [`ShipSymbol`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PlayerId(pub String);

impl PlayerId {
    pub fn new(s: impl Into<String>) -> Self {
        Self(s.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for PlayerId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for PlayerId {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AssignmentStatus {
    Active,
    Released,
}

crate::simple_display! {
    AssignmentStatus {
        Active => "active",
        Released => "released",
    }
}

/// One row of the assignment registry. `released_at`/`release_reason` are
/// only populated once `status` is `Released`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Assignment {
    pub ship: ShipSymbol,
    pub player_id: PlayerId,
    pub container_id: ContainerId,
    pub status: AssignmentStatus,
    pub assigned_at_ms: u64,
    #[serde(default)]
    pub released_at_ms: Option<u64>,
    #[serde(default)]
    pub release_reason: Option<String>,
}

/// Release reasons used by the runtime and sweeps. Not exhaustive — callers
/// may pass any string — but these are the ones the spec names explicitly.
pub mod release_reason {
    pub const DAEMON_RESTART: &str = "daemon_restart";
    pub const ORPHANED_CLEANUP: &str = "orphaned_cleanup";
    pub const STALE_TIMEOUT: &str = "stale_timeout";
    pub const CONTAINER_COMPLETED: &str = "container_completed";
    pub const CONTAINER_FAILED: &str = "container_failed";
    pub const CONTAINER_STOPPED: &str = "container_stopped";
    pub const TRANSFER: &str = "transfer";
}

/// The durable, exclusive lock registry arbitrating which container may
/// command a ship. Implementations must enforce "one active assignment per
/// (ship, player)" at the persistence layer, not merely in this trait's
/// callers — concurrent `assign` calls for the same ship must resolve with
/// exactly one winner.
#[async_trait]
pub trait ShipAssignmentManager: Send + Sync {
    async fn assign(
        &self,
        ctx: &Ctx,
        ship: &ShipSymbol,
        player: &PlayerId,
        container: ContainerId,
    ) -> Result<Assignment, CoreError>;

    async fn find_by_ship(
        &self,
        ctx: &Ctx,
        ship: &ShipSymbol,
        player: &PlayerId,
    ) -> Result<Option<Assignment>, CoreError>;

    async fn find_by_container(
        &self,
        ctx: &Ctx,
        container: ContainerId,
        player: &PlayerId,
    ) -> Result<Vec<Assignment>, CoreError>;

    /// Idempotent: a no-op if there is no active assignment for the ship.
    async fn release(
        &self,
        ctx: &Ctx,
        ship: &ShipSymbol,
        player: &PlayerId,
        reason: &str,
    ) -> Result<(), CoreError>;

    /// Atomic release-then-assign. Fails `NotAssigned` if there is no active
    /// assignment at all, `WrongContainer` if the active assignment belongs
    /// to a container other than `from`.
    async fn transfer(
        &self,
        ctx: &Ctx,
        ship: &ShipSymbol,
        player: &PlayerId,
        from: ContainerId,
        to: ContainerId,
    ) -> Result<Assignment, CoreError>;

    async fn release_by_container(
        &self,
        ctx: &Ctx,
        container: ContainerId,
        player: &PlayerId,
        reason: &str,
    ) -> Result<u64, CoreError>;

    /// Bulk-release every active assignment, regardless of player. Permitted
    /// only once, at daemon startup before any container is scheduled.
    async fn release_all_active(&self, ctx: &Ctx, reason: &str) -> Result<u64, CoreError>;

    async fn count_by_container_prefix(
        &self,
        ctx: &Ctx,
        prefix: &str,
        player: &PlayerId,
    ) -> Result<u64, CoreError>;
}

#[cfg(test)]
#[path = "ship_tests.rs"]
mod tests;
