use super::*;
use crate::handler::ContainerHandler;
use fleet_core::{test_support::test_container, ContainerKind, FakeClock, LifecycleStatus, PlayerId};
use fleet_storage::{ContainerStore, SqliteShipAssignmentManager, Store};
use std::time::Duration;

fn test_runtime(clock: FakeClock, grace_window: Duration) -> (ContainerRuntime<FakeClock>, ContainerStore) {
    let store = Store::open_in_memory().unwrap();
    let containers = ContainerStore::new(store.clone());
    let assignments: Arc<dyn ShipAssignmentManager> = Arc::new(SqliteShipAssignmentManager::new(store));
    let mut handlers = HandlerTable::new();
    handlers.register(ContainerKind::ScoutTour, CompletingHandler);
    handlers.register(ContainerKind::MiningWorker, FailingHandler);
    handlers.register(ContainerKind::FactoryWorker, PanickingHandler);
    handlers.register(ContainerKind::ContractWorkflow, CooperativeLoopingHandler);
    handlers.register(ContainerKind::ArbitrageWorker, StubbornLoopingHandler);
    let runtime = ContainerRuntime::new_with_grace_window(containers.clone(), assignments, handlers, clock, grace_window);
    (runtime, containers)
}

struct CompletingHandler;
#[async_trait]
impl ContainerHandler for CompletingHandler {
    async fn run(&self, _ctx: Ctx, _client: RuntimeClient, _id: ContainerId) -> Result<(), CoreError> {
        Ok(())
    }
}

struct FailingHandler;
#[async_trait]
impl ContainerHandler for FailingHandler {
    async fn run(&self, _ctx: Ctx, _client: RuntimeClient, _id: ContainerId) -> Result<(), CoreError> {
        Err(CoreError::Api("transient failure".into()))
    }
}

struct PanickingHandler;
#[async_trait]
impl ContainerHandler for PanickingHandler {
    async fn run(&self, _ctx: Ctx, _client: RuntimeClient, _id: ContainerId) -> Result<(), CoreError> {
        panic!("handler exploded");
    }
}

/// Observes cancellation promptly and returns the cancellation error, as the
/// contract requires.
struct CooperativeLoopingHandler;
#[async_trait]
impl ContainerHandler for CooperativeLoopingHandler {
    async fn run(&self, ctx: Ctx, _client: RuntimeClient, _id: ContainerId) -> Result<(), CoreError> {
        ctx.cancelled().await;
        Err(CoreError::Cancelled)
    }
}

/// Ignores cancellation entirely, to exercise the grace-window force-finalize path.
struct StubbornLoopingHandler;
#[async_trait]
impl ContainerHandler for StubbornLoopingHandler {
    async fn run(&self, _ctx: Ctx, _client: RuntimeClient, _id: ContainerId) -> Result<(), CoreError> {
        tokio::time::sleep(Duration::from_secs(3600)).await;
        Ok(())
    }
}

#[tokio::test]
async fn create_does_not_start() {
    let (runtime, _) = test_runtime(FakeClock::new(), DEFAULT_GRACE_WINDOW);
    let id = runtime.create(ContainerKind::ScoutTour, PlayerId::new("p1")).await.unwrap();
    let container = runtime.get(id).await.unwrap().unwrap();
    assert_eq!(container.lifecycle.status(), LifecycleStatus::Pending);
}

#[tokio::test]
async fn start_runs_handler_to_completion() {
    let (runtime, _) = test_runtime(FakeClock::new(), DEFAULT_GRACE_WINDOW);
    let id = runtime.create(ContainerKind::ScoutTour, PlayerId::new("p1")).await.unwrap();
    let (tx, mut rx) = mpsc::channel(1);
    runtime.start(id, Some(tx)).await.unwrap();
    let completed = rx.recv().await.unwrap();
    assert_eq!(completed, id);
    let container = runtime.get(id).await.unwrap().unwrap();
    assert_eq!(container.lifecycle.status(), LifecycleStatus::Completed);
}

#[tokio::test]
async fn starting_an_already_running_container_is_a_noop() {
    let (runtime, _) = test_runtime(FakeClock::new(), DEFAULT_GRACE_WINDOW);
    let id = runtime.create(ContainerKind::ContractWorkflow, PlayerId::new("p1")).await.unwrap();
    runtime.start(id, None).await.unwrap();
    runtime.start(id, None).await.unwrap();
    runtime.stop(id).await.unwrap();
}

#[tokio::test]
async fn failing_handler_marks_container_failed_and_is_restartable() {
    let (runtime, _) = test_runtime(FakeClock::new(), DEFAULT_GRACE_WINDOW);
    let id = runtime.create(ContainerKind::MiningWorker, PlayerId::new("p1")).await.unwrap();
    let (tx, mut rx) = mpsc::channel(1);
    runtime.start(id, Some(tx)).await.unwrap();
    rx.recv().await.unwrap();
    let container = runtime.get(id).await.unwrap().unwrap();
    assert_eq!(container.lifecycle.status(), LifecycleStatus::Failed);
    assert!(container.lifecycle.last_error().is_some());
}

#[tokio::test]
async fn starting_a_failed_container_directly_is_rejected() {
    let (runtime, _) = test_runtime(FakeClock::new(), DEFAULT_GRACE_WINDOW);
    let id = runtime.create(ContainerKind::MiningWorker, PlayerId::new("p1")).await.unwrap();
    let (tx, mut rx) = mpsc::channel(1);
    runtime.start(id, Some(tx)).await.unwrap();
    rx.recv().await.unwrap();
    let err = runtime.start(id, None).await.unwrap_err();
    assert!(matches!(CoreError::from(err), CoreError::InvalidState(_)));
}

#[tokio::test]
async fn panicking_handler_marks_failed_without_crashing_the_runtime() {
    let (runtime, _) = test_runtime(FakeClock::new(), DEFAULT_GRACE_WINDOW);
    let id = runtime.create(ContainerKind::FactoryWorker, PlayerId::new("p1")).await.unwrap();
    let (tx, mut rx) = mpsc::channel(1);
    runtime.start(id, Some(tx)).await.unwrap();
    rx.recv().await.unwrap();
    let container = runtime.get(id).await.unwrap().unwrap();
    assert_eq!(container.lifecycle.status(), LifecycleStatus::Failed);

    // the runtime itself is still usable.
    let other = runtime.create(ContainerKind::ScoutTour, PlayerId::new("p1")).await.unwrap();
    assert!(runtime.get(other).await.unwrap().is_some());
}

#[tokio::test]
async fn stop_on_a_cooperative_handler_marks_stopped_and_releases_assignments() {
    let (runtime, _) = test_runtime(FakeClock::new(), Duration::from_secs(5));
    let id = runtime.create(ContainerKind::ContractWorkflow, PlayerId::new("p1")).await.unwrap();
    runtime.start(id, None).await.unwrap();
    runtime.stop(id).await.unwrap();
    let container = runtime.get(id).await.unwrap().unwrap();
    assert_eq!(container.lifecycle.status(), LifecycleStatus::Stopped);
}

#[tokio::test]
async fn stop_on_an_uncooperative_handler_force_finalizes_after_the_grace_window() {
    let (runtime, _) = test_runtime(FakeClock::new(), Duration::from_millis(50));
    let id = runtime.create(ContainerKind::ArbitrageWorker, PlayerId::new("p1")).await.unwrap();
    runtime.start(id, None).await.unwrap();
    runtime.stop(id).await.unwrap();
    let container = runtime.get(id).await.unwrap().unwrap();
    assert_eq!(container.lifecycle.status(), LifecycleStatus::Stopped);
}

#[tokio::test]
async fn stopping_a_pending_container_goes_directly_to_stopped() {
    let (runtime, _) = test_runtime(FakeClock::new(), DEFAULT_GRACE_WINDOW);
    let id = runtime.create(ContainerKind::ScoutTour, PlayerId::new("p1")).await.unwrap();
    runtime.stop(id).await.unwrap();
    let container = runtime.get(id).await.unwrap().unwrap();
    assert_eq!(container.lifecycle.status(), LifecycleStatus::Stopped);
}

#[tokio::test]
async fn restart_is_rejected_without_remaining_budget() {
    let (runtime, containers) = test_runtime(FakeClock::new(), DEFAULT_GRACE_WINDOW);
    let mut container = test_container(ContainerKind::MiningWorker, "p1");
    container.restartable = false;
    container.restart_bound = 0;
    containers.insert(&container).await.unwrap();
    let (tx, mut rx) = mpsc::channel(1);
    runtime.start(container.id, Some(tx)).await.unwrap();
    rx.recv().await.unwrap();
    let after = runtime.get(container.id).await.unwrap().unwrap();
    assert_eq!(after.lifecycle.status(), LifecycleStatus::Failed);

    let err = runtime.restart(container.id).await.unwrap_err();
    assert!(matches!(CoreError::from(err), CoreError::InvalidState(_)));
}

#[tokio::test]
async fn restart_reopens_a_stopped_container_without_touching_the_restart_count() {
    let (runtime, _) = test_runtime(FakeClock::new(), DEFAULT_GRACE_WINDOW);
    let id = runtime.create(ContainerKind::ContractWorkflow, PlayerId::new("p1")).await.unwrap();
    runtime.start(id, None).await.unwrap();
    runtime.stop(id).await.unwrap();
    let stopped = runtime.get(id).await.unwrap().unwrap();
    assert_eq!(stopped.lifecycle.status(), LifecycleStatus::Stopped);

    runtime.restart(id).await.unwrap();
    let restarted = runtime.get(id).await.unwrap().unwrap();
    assert_eq!(restarted.lifecycle.status(), LifecycleStatus::Running);
    assert_eq!(restarted.restart_count, 0);

    runtime.stop(id).await.unwrap();
}

#[tokio::test]
async fn recover_on_startup_reclassifies_running_rows_and_releases_assignments() {
    let (runtime, containers) = test_runtime(FakeClock::new(), DEFAULT_GRACE_WINDOW);
    let mut container = test_container(ContainerKind::ScoutTour, "p1");
    container.lifecycle.start(&FakeClock::new()).unwrap();
    containers.insert(&container).await.unwrap();

    let interrupted = runtime.recover_on_startup().await.unwrap();
    assert_eq!(interrupted, vec![container.id]);
    let after = runtime.get(container.id).await.unwrap().unwrap();
    assert!(after.interrupted);
    assert_eq!(after.lifecycle.status(), LifecycleStatus::Failed);
}
