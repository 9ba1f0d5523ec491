use thiserror::Error;

#[derive(Debug, Error)]
pub enum MediatorError {
    #[error("no handler registered for this request type")]
    NoHandler,

    #[error("a handler is already registered for this request type")]
    DuplicateHandler,

    #[error("erased request/response type mismatch (mediator dispatch bug)")]
    TypeMismatch,

    #[error("middleware rejected the request: {0}")]
    Middleware(String),

    #[error(transparent)]
    Core(#[from] fleet_core::CoreError),
}
