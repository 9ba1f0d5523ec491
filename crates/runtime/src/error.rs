use fleet_core::CoreError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RuntimeError {
    #[error(transparent)]
    Core(#[from] CoreError),

    #[error(transparent)]
    Storage(#[from] fleet_storage::StorageError),

    #[error("container {0} not found")]
    NotFound(fleet_core::ContainerId),

    #[error("no handler registered for container kind {0}")]
    NoHandlerForKind(fleet_core::ContainerKind),
}

impl From<RuntimeError> for CoreError {
    fn from(e: RuntimeError) -> Self {
        let message = e.to_string();
        match e {
            RuntimeError::Core(e) => e,
            RuntimeError::Storage(e) => e.into(),
            RuntimeError::NotFound(_) => CoreError::Persistence(message),
            RuntimeError::NoHandlerForKind(_) => CoreError::NoHandler,
        }
    }
}
