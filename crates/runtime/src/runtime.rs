//! The container supervisor: create, persist, start, stop, restart, recover,
//! and observe containers. Owns the in-memory map of live containers; the
//! container rows themselves live in [`fleet_storage::ContainerStore`].

use crate::client::{RuntimeClient, RuntimeFacade};
use crate::error::RuntimeError;
use crate::handler::HandlerTable;
use async_trait::async_trait;
use fleet_core::{
    Clock, Container, ContainerId, ContainerKind, ContainerStatus, CoreError, Ctx, OperationContext, PlayerId,
    ShipAssignmentManager,
};
use fleet_storage::ContainerStore;
use futures_util::future::FutureExt;
use std::collections::HashMap;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, watch, RwLock};
use tokio::task::JoinHandle;

/// Default grace window the runtime waits for a handler to observe
/// cancellation before force-finalizing a STOPPING container. Not
/// uniformly configured in the source system; chosen as a safe default.
pub const DEFAULT_GRACE_WINDOW: Duration = Duration::from_secs(30);

struct ManagedContainer {
    ctx: Ctx,
    handle: JoinHandle<()>,
    status_rx: watch::Receiver<ContainerStatus>,
}

struct Inner<C: Clock> {
    store: ContainerStore,
    assignments: Arc<dyn ShipAssignmentManager>,
    handlers: HandlerTable,
    clock: C,
    root_ctx: Ctx,
    grace_window: Duration,
    containers: RwLock<HashMap<ContainerId, ManagedContainer>>,
}

/// The supervisor. Cheap to clone — it is an `Arc` handle around the shared
/// state described in the module doc comment.
pub struct ContainerRuntime<C: Clock> {
    inner: Arc<Inner<C>>,
}

impl<C: Clock> Clone for ContainerRuntime<C> {
    fn clone(&self) -> Self {
        Self { inner: self.inner.clone() }
    }
}

impl<C: Clock> ContainerRuntime<C> {
    pub fn new(store: ContainerStore, assignments: Arc<dyn ShipAssignmentManager>, handlers: HandlerTable, clock: C) -> Self {
        Self::new_with_grace_window(store, assignments, handlers, clock, DEFAULT_GRACE_WINDOW)
    }

    pub fn new_with_grace_window(
        store: ContainerStore,
        assignments: Arc<dyn ShipAssignmentManager>,
        handlers: HandlerTable,
        clock: C,
        grace_window: Duration,
    ) -> Self {
        Self {
            inner: Arc::new(Inner {
                store,
                assignments,
                handlers,
                clock,
                root_ctx: Ctx::root(),
                grace_window,
                containers: RwLock::new(HashMap::new()),
            }),
        }
    }

    /// The narrow capability handed to container handlers (see
    /// `fleet_runtime::client`): Create, Start, Stop, List, Get — never the
    /// full runtime, so a coordinator cannot reach back into internals the
    /// supervisor relies on for bookkeeping.
    pub fn client(&self) -> RuntimeClient
    where
        C: 'static,
    {
        RuntimeClient::new(Arc::new(self.clone()) as Arc<dyn RuntimeFacade>)
    }

    /// Startup crash recovery: reclassify RUNNING rows as INTERRUPTED and
    /// bulk-release every active assignment. Must run after the PID file is
    /// acquired and before any container is scheduled.
    pub async fn recover_on_startup(&self) -> Result<Vec<ContainerId>, RuntimeError> {
        let interrupted = self.inner.store.mark_running_as_interrupted().await?;
        self.inner
            .assignments
            .release_all_active(&self.inner.root_ctx, fleet_core::release_reason::DAEMON_RESTART)
            .await?;
        Ok(interrupted)
    }

    pub async fn create(&self, kind: ContainerKind, player: PlayerId) -> Result<ContainerId, RuntimeError> {
        let container = Container::new(kind, player.as_str(), &self.inner.clock);
        let id = container.id;
        self.inner.store.insert(&container).await?;
        Ok(id)
    }

    pub async fn get(&self, id: ContainerId) -> Result<Option<Container>, RuntimeError> {
        Ok(self.inner.store.get(id).await?)
    }

    pub async fn list(&self, player: &PlayerId) -> Result<Vec<Container>, RuntimeError> {
        Ok(self.inner.store.list(player).await?)
    }

    /// Starting an already-RUNNING container is a no-op; starting a
    /// COMPLETED/FAILED/STOPPED/INTERRUPTED container requires
    /// `Restart`/`ResetForRestart` first.
    pub async fn start(&self, id: ContainerId, completion: Option<mpsc::Sender<ContainerId>>) -> Result<(), RuntimeError>
    where
        C: 'static,
    {
        let mut container = self.inner.store.get(id).await?.ok_or(RuntimeError::NotFound(id))?;
        if container.status() == ContainerStatus::Running {
            return Ok(());
        }
        container.lifecycle.start(&self.inner.clock).map_err(CoreError::from)?;
        self.inner.store.save(&container).await?;
        self.spawn_container_task(container, completion).await
    }

    async fn spawn_container_task(
        &self,
        container: Container,
        completion: Option<mpsc::Sender<ContainerId>>,
    ) -> Result<(), RuntimeError>
    where
        C: 'static,
    {
        let id = container.id;
        let kind = container.kind;
        let handler = self.inner.handlers.get(kind);
        let ctx = self.inner.root_ctx.child().with_operation(OperationContext::new(id, "container_run"));
        let (status_tx, status_rx) = watch::channel(ContainerStatus::Running);

        let rt = self.clone();
        let task_ctx = ctx.clone();
        let handle = tokio::spawn(async move {
            rt.run_container(task_ctx, id, kind, handler, completion, status_tx).await;
        });

        self.inner.containers.write().await.insert(id, ManagedContainer { ctx, handle, status_rx });
        Ok(())
    }

    async fn run_container(
        &self,
        ctx: Ctx,
        id: ContainerId,
        kind: ContainerKind,
        handler: Option<Arc<dyn crate::handler::ContainerHandler>>,
        completion: Option<mpsc::Sender<ContainerId>>,
        status_tx: watch::Sender<ContainerStatus>,
    ) where
        C: 'static,
    {
        let client = self.client();
        let outcome = match handler {
            None => Err(CoreError::NoHandler),
            Some(handler) => {
                let fut = handler.run(ctx.clone(), client, id);
                match AssertUnwindSafe(fut).catch_unwind().await {
                    Ok(result) => result,
                    Err(panic) => Err(CoreError::WorkerFailure { containers: vec![id], message: panic_message(&panic) }),
                }
            }
        };

        let cancelled = ctx.is_cancelled();
        let final_status = self.finalize(id, kind, outcome, cancelled).await;
        self.inner.containers.write().await.remove(&id);
        let _ = status_tx.send(final_status);

        if let Some(tx) = completion {
            let _ = tx.send(id).await;
        }
    }

    /// Applies the lifecycle transition matching `outcome`, releases ship
    /// assignments with the matching reason, persists, and (if the
    /// container landed FAILED with restart budget remaining) schedules a
    /// backoff restart. Returns the resulting externally-visible status.
    async fn finalize(&self, id: ContainerId, kind: ContainerKind, outcome: Result<(), CoreError>, cancelled: bool) -> ContainerStatus {
        let Ok(Some(mut container)) = self.inner.store.get(id).await else {
            tracing::warn!(container = %id, "container finished but its row is gone");
            return ContainerStatus::Failed;
        };

        let release_reason = match &outcome {
            Ok(()) => {
                let _ = container.lifecycle.complete(&self.inner.clock);
                fleet_core::release_reason::CONTAINER_COMPLETED
            }
            Err(err) if cancelled || err.is_cancellation() => {
                let _ = container.lifecycle.stop(&self.inner.clock);
                fleet_core::release_reason::CONTAINER_STOPPED
            }
            Err(err) => {
                let _ = container.lifecycle.fail(err.to_string(), &self.inner.clock);
                fleet_core::release_reason::CONTAINER_FAILED
            }
        };
        container.stopping = false;

        let player = PlayerId::new(container.player_id.clone());
        if let Err(err) = self.inner.assignments.release_by_container(&self.inner.root_ctx, id, &player, release_reason).await {
            tracing::warn!(container = %id, %err, "failed to release ship assignments on container finalization");
        }

        if let Err(err) = self.inner.store.save(&container).await {
            tracing::warn!(container = %id, %err, "failed to persist container finalization");
        }

        if container.lifecycle.status() == fleet_core::LifecycleStatus::Failed && container.has_restart_budget() {
            self.schedule_restart(id, kind, container.restart_count);
        }

        container.status()
    }

    /// Enqueues a restart with exponential backoff. Does not reuse the
    /// previous task or context: it invokes ResetForRestart then Start.
    fn schedule_restart(&self, id: ContainerId, kind: ContainerKind, attempt: u32)
    where
        C: 'static,
    {
        let rt = self.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Container::restart_backoff(attempt)).await;
            if let Err(err) = rt.restart(id).await {
                tracing::warn!(container = %id, %kind, %err, "scheduled restart failed");
            }
        });
    }

    /// RUNNING -> STOPPING (graceful): cancels the container's context, then
    /// waits up to the grace window for the handler to return and finalize.
    /// If it does not, force the transition to STOPPED. A PENDING container
    /// goes directly to STOPPED. Terminal containers are a no-op.
    pub async fn stop(&self, id: ContainerId) -> Result<(), RuntimeError>
    where
        C: 'static,
    {
        let managed = {
            let mut containers = self.inner.containers.write().await;
            containers.get_mut(&id).map(|m| {
                m.ctx.cancel();
                m.status_rx.clone()
            })
        };

        let Some(mut status_rx) = managed else {
            // Not tracked in this process: PENDING->STOPPED directly, or a
            // no-op if already terminal / interrupted.
            let Some(mut container) = self.inner.store.get(id).await? else { return Err(RuntimeError::NotFound(id)) };
            if container.lifecycle.status() == fleet_core::LifecycleStatus::Pending {
                container.lifecycle.stop(&self.inner.clock).map_err(CoreError::from)?;
                self.inner.store.save(&container).await?;
                let player = PlayerId::new(container.player_id.clone());
                self.inner
                    .assignments
                    .release_by_container(&self.inner.root_ctx, id, &player, fleet_core::release_reason::CONTAINER_STOPPED)
                    .await?;
            }
            return Ok(());
        };

        if let Some(mut container) = self.inner.store.get(id).await? {
            container.stopping = true;
            let _ = self.inner.store.save(&container).await;
        }

        let wait_for_terminal = status_rx.wait_for(|status| *status != ContainerStatus::Running);
        if tokio::time::timeout(self.inner.grace_window, wait_for_terminal).await.is_err() {
            tracing::warn!(container = %id, grace_window = ?self.inner.grace_window, "grace window elapsed, force-finalizing");
            self.force_finalize(id).await;
        }
        Ok(())
    }

    async fn force_finalize(&self, id: ContainerId) {
        if let Some(managed) = self.inner.containers.write().await.remove(&id) {
            managed.handle.abort();
        }
        if let Ok(Some(mut container)) = self.inner.store.get(id).await {
            if matches!(container.lifecycle.status(), fleet_core::LifecycleStatus::Running) {
                let _ = container.lifecycle.stop(&self.inner.clock);
                container.stopping = false;
                let _ = self.inner.store.save(&container).await;
            }
            let player = PlayerId::new(container.player_id.clone());
            let _ = self
                .inner
                .assignments
                .release_by_container(&self.inner.root_ctx, id, &player, fleet_core::release_reason::CONTAINER_STOPPED)
                .await;
        }
    }

    /// If FAILED and within restart budget: ResetForRestart then Start,
    /// counting against the restart budget. If STOPPED (manual restart, not
    /// a crash): reopen then Start, without touching the restart counter.
    pub async fn restart(&self, id: ContainerId) -> Result<(), RuntimeError>
    where
        C: 'static,
    {
        let mut container = self.inner.store.get(id).await?.ok_or(RuntimeError::NotFound(id))?;
        match container.lifecycle.status() {
            fleet_core::LifecycleStatus::Failed if container.has_restart_budget() => {
                container.restart_count += 1;
                container.interrupted = false;
                container.lifecycle.reset_for_restart(&self.inner.clock).map_err(CoreError::from)?;
            }
            fleet_core::LifecycleStatus::Stopped => {
                container.lifecycle.reopen(&self.inner.clock).map_err(CoreError::from)?;
            }
            status => {
                return Err(CoreError::InvalidState(fleet_core::InvalidTransition { from: status, action: "restart" }).into());
            }
        }
        self.inner.store.save(&container).await?;
        self.start(id, None).await
    }

    /// Releases active assignments for any container id not present in the
    /// live map — handles races where a container finished without its
    /// finalizer running (e.g. `SIGKILL`).
    pub async fn sweep_orphans(&self, player: &PlayerId) -> Result<u64, RuntimeError> {
        let live = self.inner.containers.read().await;
        let mut released = 0u64;
        for container in self.inner.store.list(player).await? {
            if container.lifecycle.status() == fleet_core::LifecycleStatus::Running && !live.contains_key(&container.id) {
                released += self
                    .inner
                    .assignments
                    .release_by_container(&self.inner.root_ctx, container.id, player, fleet_core::release_reason::ORPHANED_CLEANUP)
                    .await?;
            }
        }
        Ok(released)
    }

    /// Force-releases assignments older than `timeout`, regardless of
    /// whether their container is still live. Default timeout is
    /// deliberately generous — legitimate long-running operations exist.
    pub async fn sweep_stale(&self, player: &PlayerId, timeout: Duration) -> Result<u64, RuntimeError> {
        let cutoff = self.inner.clock.epoch_ms().saturating_sub(timeout.as_millis() as u64);
        let mut released = 0u64;
        for container in self.inner.store.list(player).await? {
            for assignment in self.inner.assignments.find_by_container(&self.inner.root_ctx, container.id, player).await? {
                if assignment.assigned_at_ms < cutoff {
                    self.inner
                        .assignments
                        .release(&self.inner.root_ctx, &assignment.ship, player, fleet_core::release_reason::STALE_TIMEOUT)
                        .await?;
                    released += 1;
                }
            }
        }
        Ok(released)
    }
}

#[async_trait]
impl<C: Clock + 'static> RuntimeFacade for ContainerRuntime<C> {
    async fn create(&self, kind: ContainerKind, player: PlayerId) -> Result<ContainerId, CoreError> {
        Ok(ContainerRuntime::create(self, kind, player).await?)
    }

    async fn start(&self, id: ContainerId, completion: Option<mpsc::Sender<ContainerId>>) -> Result<(), CoreError> {
        Ok(ContainerRuntime::start(self, id, completion).await?)
    }

    async fn stop(&self, id: ContainerId) -> Result<(), CoreError> {
        Ok(ContainerRuntime::stop(self, id).await?)
    }

    async fn list(&self, player: &PlayerId) -> Result<Vec<Container>, CoreError> {
        Ok(ContainerRuntime::list(self, player).await?)
    }

    async fn get(&self, id: ContainerId) -> Result<Option<Container>, CoreError> {
        Ok(ContainerRuntime::get(self, id).await?)
    }
}

fn panic_message(panic: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = panic.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = panic.downcast_ref::<String>() {
        s.clone()
    } else {
        "container handler panicked".to_string()
    }
}

#[cfg(test)]
#[path = "runtime_tests.rs"]
mod tests;
