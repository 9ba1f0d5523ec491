//! The shared {PENDING, RUNNING, COMPLETED, FAILED, STOPPED} state machine.
//!
//! Reused by every long-lived entity the runtime supervises (containers
//! today; the same substrate is meant to back routes, factories, and mining
//! operations if those grow their own persisted lifecycle later). All
//! transitions are O(1) and take "now" from an injected [`Clock`].

use crate::clock::Clock;
use serde::{Deserialize, Serialize};
use std::time::Instant;
use thiserror::Error;

/// Status of the lifecycle machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LifecycleStatus {
    Pending,
    Running,
    Completed,
    Failed,
    Stopped,
}

crate::simple_display! {
    LifecycleStatus {
        Pending => "pending",
        Running => "running",
        Completed => "completed",
        Failed => "failed",
        Stopped => "stopped",
    }
}

impl LifecycleStatus {
    pub fn is_terminal(self) -> bool {
        matches!(self, LifecycleStatus::Completed | LifecycleStatus::Stopped)
    }
}

/// An illegal transition was requested. Not retryable — callers must check
/// status first if they cannot tolerate the error.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("invalid lifecycle transition: {action} is not legal from {from}")]
pub struct InvalidTransition {
    pub from: LifecycleStatus,
    pub action: &'static str,
}

/// Shared state-and-timestamp substrate.
///
/// Allowed transitions: PENDING -> RUNNING; RUNNING -> {COMPLETED, FAILED,
/// STOPPED}; FAILED -> PENDING (via [`Lifecycle::reset_for_restart`], only
/// when the owner still has restart budget); STOPPED -> RUNNING (manual
/// restart, via [`Lifecycle::start`] since STOPPED behaves like PENDING for
/// `Start`... except it doesn't: only PENDING may `Start`, per the spec
/// `STOPPED->RUNNING` transition is driven by the owner re-entering PENDING
/// first). `Stop` degrades gracefully when called from PENDING ("never ran").
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Lifecycle {
    status: LifecycleStatus,
    #[serde(skip, default = "Instant::now")]
    created_at: Instant,
    #[serde(skip, default = "Instant::now")]
    updated_at: Instant,
    #[serde(skip)]
    started_at: Option<Instant>,
    #[serde(skip)]
    stopped_at: Option<Instant>,
    last_error: Option<String>,
}

impl Lifecycle {
    pub fn new(clock: &impl Clock) -> Self {
        let now = clock.now();
        Self {
            status: LifecycleStatus::Pending,
            created_at: now,
            updated_at: now,
            started_at: None,
            stopped_at: None,
            last_error: None,
        }
    }

    pub fn status(&self) -> LifecycleStatus {
        self.status
    }

    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    pub fn started_at(&self) -> Option<Instant> {
        self.started_at
    }

    pub fn stopped_at(&self) -> Option<Instant> {
        self.stopped_at
    }

    pub fn updated_at(&self) -> Instant {
        self.updated_at
    }

    fn touch(&mut self, clock: &impl Clock) {
        self.updated_at = clock.now();
    }

    /// PENDING -> RUNNING. Sets `started_at` on first entry.
    pub fn start(&mut self, clock: &impl Clock) -> Result<(), InvalidTransition> {
        if self.status != LifecycleStatus::Pending {
            return Err(InvalidTransition { from: self.status, action: "start" });
        }
        self.status = LifecycleStatus::Running;
        self.started_at = Some(clock.now());
        self.touch(clock);
        Ok(())
    }

    /// RUNNING -> COMPLETED.
    pub fn complete(&mut self, clock: &impl Clock) -> Result<(), InvalidTransition> {
        if self.status != LifecycleStatus::Running {
            return Err(InvalidTransition { from: self.status, action: "complete" });
        }
        self.status = LifecycleStatus::Completed;
        self.stopped_at = Some(clock.now());
        self.touch(clock);
        Ok(())
    }

    /// RUNNING -> FAILED.
    pub fn fail(&mut self, err: impl Into<String>, clock: &impl Clock) -> Result<(), InvalidTransition> {
        if self.status != LifecycleStatus::Running {
            return Err(InvalidTransition { from: self.status, action: "fail" });
        }
        self.status = LifecycleStatus::Failed;
        self.last_error = Some(err.into());
        self.stopped_at = Some(clock.now());
        self.touch(clock);
        Ok(())
    }

    /// RUNNING -> STOPPED, or PENDING -> STOPPED ("never ran").
    pub fn stop(&mut self, clock: &impl Clock) -> Result<(), InvalidTransition> {
        if !matches!(self.status, LifecycleStatus::Running | LifecycleStatus::Pending) {
            return Err(InvalidTransition { from: self.status, action: "stop" });
        }
        self.status = LifecycleStatus::Stopped;
        self.stopped_at = Some(clock.now());
        self.touch(clock);
        Ok(())
    }

    /// FAILED -> PENDING. Clears `last_error` and `stopped_at`. Does NOT touch
    /// any restart counter — the owner (the container) increments its own.
    pub fn reset_for_restart(&mut self, clock: &impl Clock) -> Result<(), InvalidTransition> {
        if self.status != LifecycleStatus::Failed {
            return Err(InvalidTransition { from: self.status, action: "reset_for_restart" });
        }
        self.status = LifecycleStatus::Pending;
        self.last_error = None;
        self.stopped_at = None;
        self.touch(clock);
        Ok(())
    }

    /// Manual restart: STOPPED -> PENDING, ready for another `start`.
    pub fn reopen(&mut self, clock: &impl Clock) -> Result<(), InvalidTransition> {
        if self.status != LifecycleStatus::Stopped {
            return Err(InvalidTransition { from: self.status, action: "reopen" });
        }
        self.status = LifecycleStatus::Pending;
        self.stopped_at = None;
        self.touch(clock);
        Ok(())
    }

    pub fn update_timestamp(&mut self, clock: &impl Clock) {
        self.touch(clock);
    }

    /// Rehydrate a lifecycle from persisted (status, last_error) columns,
    /// bypassing the transition checks. Storage layers use this to load a
    /// row back into a `Container`; it is not part of the transition API —
    /// nothing should call this except a store's row-mapping code.
    pub fn from_persisted(status: LifecycleStatus, last_error: Option<String>) -> Self {
        let now = std::time::Instant::now();
        Self {
            status,
            created_at: now,
            updated_at: now,
            started_at: None,
            stopped_at: None,
            last_error,
        }
    }
}

#[cfg(test)]
#[path = "lifecycle_tests.rs"]
mod tests;
