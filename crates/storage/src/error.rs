use thiserror::Error;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("sqlite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("migration error: {0}")]
    Migration(String),

    #[error("blocking task panicked: {0}")]
    TaskJoin(#[from] tokio::task::JoinError),

    #[error("ship already assigned")]
    AlreadyAssigned,

    #[error("ship not assigned")]
    NotAssigned,

    #[error("ship assigned to a different container")]
    WrongContainer,
}

impl From<StorageError> for fleet_core::CoreError {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::AlreadyAssigned => fleet_core::CoreError::AlreadyAssigned,
            StorageError::NotAssigned => fleet_core::CoreError::NotAssigned,
            StorageError::WrongContainer => fleet_core::CoreError::WrongContainer,
            other => fleet_core::CoreError::Persistence(other.to_string()),
        }
    }
}
