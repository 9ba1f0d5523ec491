//! Error kinds shared across the container runtime, assignment manager, and
//! mediator. Downstream crates wrap these (`fleet_storage::StorageError`,
//! `fleet_mediator::MediatorError`, ...) rather than re-deriving them.

use crate::container::ContainerId;
use crate::lifecycle::InvalidTransition;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CoreError {
    #[error(transparent)]
    InvalidState(#[from] InvalidTransition),

    #[error("ship already assigned")]
    AlreadyAssigned,

    #[error("ship not assigned")]
    NotAssigned,

    #[error("ship assigned to a different container")]
    WrongContainer,

    #[error("no handler registered for this request type")]
    NoHandler,

    #[error("operation was cancelled")]
    Cancelled,

    #[error("worker container(s) failed: {containers:?}: {message}")]
    WorkerFailure { containers: Vec<ContainerId>, message: String },

    #[error("persistence error: {0}")]
    Persistence(String),

    #[error("game API error: {0}")]
    Api(String),
}

impl CoreError {
    /// Whether the container task should treat this as a STOPPED transition
    /// rather than FAILED.
    pub fn is_cancellation(&self) -> bool {
        matches!(self, CoreError::Cancelled)
    }

    /// API errors are considered transient and eligible for restart by
    /// default; invalid-state and no-handler errors are programming errors
    /// and are not.
    pub fn is_transient(&self) -> bool {
        matches!(self, CoreError::Api(_) | CoreError::Persistence(_))
    }
}
