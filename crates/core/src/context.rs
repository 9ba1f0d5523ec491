//! The per-call context threaded through the mediator, the runtime, and
//! every handler: cancellation, correlation data ("operation context"), and
//! whatever the player-token middleware has resolved.

use crate::container::ContainerId;
use crate::ship::PlayerId;
use tokio_util::sync::CancellationToken;

/// Correlation data carried on the context so a handler (or anything it
/// calls into) can identify which container and operation it is running
/// under without threading extra parameters everywhere.
#[derive(Debug, Clone)]
pub struct OperationContext {
    pub container_id: ContainerId,
    pub operation: &'static str,
    /// The container that caused this operation, if any. Populated by
    /// [`Ctx::with_operation`] from the context it's replacing, so a chain
    /// of nested mediator dispatches (coordinator -> worker -> leaf
    /// side-effect) can be traced back to its originating container, not
    /// just its immediate parent.
    pub causation_id: Option<ContainerId>,
}

impl OperationContext {
    pub fn new(container_id: ContainerId, operation: &'static str) -> Self {
        Self { container_id, operation, causation_id: None }
    }

    /// Build a context explicitly chained off a causing container, bypassing
    /// the implicit chaining `Ctx::with_operation` does from its current ctx.
    pub fn caused_by(container_id: ContainerId, operation: &'static str, causation_id: ContainerId) -> Self {
        Self { container_id, operation, causation_id: Some(causation_id) }
    }
}

/// The context object passed to every mediator dispatch, runtime operation,
/// and handler call. Cheap to clone: the cancellation token is reference
/// counted and the rest is small.
///
/// Child contexts are derived with [`Ctx::child`], which creates a child
/// [`CancellationToken`] — cancelling the parent cancels every descendant,
/// but cancelling a child has no effect on its ancestors or siblings. The
/// runtime derives one child per container from a long-lived runtime-root
/// context; `Stop` cancels just that child.
#[derive(Debug, Clone)]
pub struct Ctx {
    cancellation: CancellationToken,
    operation: Option<OperationContext>,
    player_id: Option<PlayerId>,
    player_token: Option<String>,
}

impl Ctx {
    /// A fresh root context with no cancellation ancestry.
    pub fn root() -> Self {
        Self {
            cancellation: CancellationToken::new(),
            operation: None,
            player_id: None,
            player_token: None,
        }
    }

    /// Derive a cancellable child. Cancelling `self` cancels the child;
    /// cancelling the child does not propagate upward.
    pub fn child(&self) -> Self {
        Self {
            cancellation: self.cancellation.child_token(),
            operation: self.operation.clone(),
            player_id: self.player_id.clone(),
            player_token: self.player_token.clone(),
        }
    }

    /// Replace the operation context wholesale, chaining `causation_id` from
    /// whatever operation context this one replaces (unless `op` already set
    /// one explicitly, e.g. via [`OperationContext::caused_by`]). This is how
    /// a leaf side-effect several mediator dispatches deep stays traceable
    /// back to the coordinator that originated the chain.
    pub fn with_operation(mut self, mut op: OperationContext) -> Self {
        if op.causation_id.is_none() {
            op.causation_id = self.operation.as_ref().map(|parent| parent.container_id);
        }
        self.operation = Some(op);
        self
    }

    /// Set by the RPC layer before handing the context to the mediator; the
    /// player-token middleware resolves `player_token` from this.
    pub fn with_player_id(mut self, player: PlayerId) -> Self {
        self.player_id = Some(player);
        self
    }

    pub fn with_player_token(mut self, token: impl Into<String>) -> Self {
        self.player_token = Some(token.into());
        self
    }

    pub fn operation(&self) -> Option<&OperationContext> {
        self.operation.as_ref()
    }

    pub fn player_id(&self) -> Option<&PlayerId> {
        self.player_id.as_ref()
    }

    pub fn player_token(&self) -> Option<&str> {
        self.player_token.as_deref()
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancellation.is_cancelled()
    }

    pub fn cancel(&self) {
        self.cancellation.cancel();
    }

    /// Resolves once this context (or any ancestor) is cancelled. Handlers
    /// that loop select! on this at the top of every iteration.
    pub async fn cancelled(&self) {
        self.cancellation.cancelled().await;
    }

    pub fn cancellation_token(&self) -> &CancellationToken {
        &self.cancellation
    }
}

impl Default for Ctx {
    fn default() -> Self {
        Self::root()
    }
}

#[cfg(test)]
#[path = "context_tests.rs"]
mod tests;
