use super::*;
use crate::pool::IdleShipSource;
use fleet_core::PlayerId;
use parking_lot::Mutex as SyncMutex;
use std::sync::Arc;
use std::time::Duration;

struct EmptySource;
#[async_trait::async_trait]
impl IdleShipSource for EmptySource {
    async fn idle_ships(&self, _ctx: &Ctx, _player: &PlayerId) -> Result<Vec<ShipSymbol>, CoreError> {
        Ok(Vec::new())
    }
}

fn test_pool(ctx: &Ctx, ships: &[&str]) -> Arc<ShipPool> {
    ShipPool::spawn(
        ctx.clone(),
        PlayerId::new("p1"),
        ships.iter().map(|s| ShipSymbol::new(*s)).collect(),
        Arc::new(EmptySource),
        Arc::new(|_: &ShipSymbol| true),
        Duration::from_secs(3600),
    )
}

#[tokio::test]
async fn levels_run_sequentially_items_within_a_level_run_in_parallel() {
    let ctx = Ctx::root();
    let pool = test_pool(&ctx, &["A", "B", "C", "D"]);
    let log: Arc<SyncMutex<Vec<&'static str>>> = Arc::new(SyncMutex::new(Vec::new()));

    let levels = vec![vec!["l1a", "l1b"], vec!["l2a", "l2b"]];
    let log_for_worker = Arc::clone(&log);
    let results = run_levels(&ctx, &pool, levels, move |_ctx, item: &'static str, ship| {
        let log = Arc::clone(&log_for_worker);
        async move {
            log.lock().push(item);
            Ok::<_, CoreError>((item, ship))
        }
    })
    .await
    .unwrap();

    assert_eq!(results.len(), 4);
    let log = log.lock();
    let l1_end = log.iter().position(|e| *e == "l1a").max(log.iter().position(|e| *e == "l1b")).unwrap();
    let l2_start = log.iter().position(|e| *e == "l2a").min(log.iter().position(|e| *e == "l2b")).unwrap();
    assert!(l1_end < l2_start, "level 2 item started before level 1 fully finished: {log:?}");
}

#[tokio::test]
async fn first_error_in_a_level_aborts_the_level_and_is_returned() {
    let ctx = Ctx::root();
    let pool = test_pool(&ctx, &["A", "B"]);

    let levels = vec![vec!["ok", "boom"]];
    let result = run_levels(&ctx, &pool, levels, |_ctx, item: &'static str, _ship| async move {
        if item == "boom" {
            Err(CoreError::Api("worker blew up".into()))
        } else {
            Ok::<_, CoreError>(item)
        }
    })
    .await;

    assert!(matches!(result, Err(CoreError::Api(_))));
}

#[tokio::test]
async fn ships_are_returned_to_the_pool_after_each_item_completes() {
    let ctx = Ctx::root();
    let pool = test_pool(&ctx, &["A", "B"]);

    let levels = vec![vec!["first"], vec!["second"]];
    run_levels(&ctx, &pool, levels, |_ctx, item: &'static str, ship| async move { Ok::<_, CoreError>((item, ship)) })
        .await
        .unwrap();

    let a = pool.acquire(&ctx).await.unwrap();
    let b = pool.acquire(&ctx).await.unwrap();
    let mut got = vec![a, b];
    got.sort();
    assert_eq!(got, vec![ShipSymbol::new("A"), ShipSymbol::new("B")]);
}

#[tokio::test]
async fn cancelling_the_context_aborts_the_executor() {
    let ctx = Ctx::root();
    let pool = test_pool(&ctx, &["A"]);
    ctx.cancel();

    let levels = vec![vec!["never-runs"]];
    let result = run_levels(&ctx, &pool, levels, |_ctx, item: &'static str, _ship| async move { Ok::<_, CoreError>(item) }).await;

    assert!(matches!(result, Err(CoreError::Cancelled)));
}
