//! Primitive B: an ordered list of levels, each a set of independent work
//! items, run against a [`ShipPool`].

use crate::pool::ShipPool;
use fleet_core::{CoreError, Ctx, ShipSymbol};
use std::future::Future;
use tokio::task::JoinSet;

/// Run `levels` sequentially; items within a level run in parallel, each
/// pulling one ship from `pool`, running `worker`, and returning the ship
/// once `worker` resolves (success or failure).
///
/// The first error in a level cancels the level's still-running items (via
/// a child of `ctx`) and aborts the whole executor with that error; results
/// from earlier, already-completed levels are discarded along with it, as
/// the spec gives no partial-levels contract. Cancelling `ctx` itself is
/// observed the same way a level-local error would be: remaining items are
/// given the chance to wind down and [`CoreError::Cancelled`] is returned.
pub async fn run_levels<I, T, F, Fut>(
    ctx: &Ctx,
    pool: &ShipPool,
    levels: Vec<Vec<I>>,
    worker: F,
) -> Result<Vec<T>, CoreError>
where
    I: Send + 'static,
    T: Send + 'static,
    F: Fn(Ctx, I, ShipSymbol) -> Fut + Clone + Send + Sync + 'static,
    Fut: Future<Output = Result<T, CoreError>> + Send + 'static,
{
    let mut results = Vec::new();

    for level in levels {
        if ctx.is_cancelled() {
            return Err(CoreError::Cancelled);
        }

        let level_ctx = ctx.child();
        let mut set = JoinSet::new();

        for item in level {
            let Some(ship) = pool.acquire(ctx).await else {
                level_ctx.cancel();
                break;
            };
            let worker = worker.clone();
            let item_ctx = level_ctx.child();
            set.spawn(async move {
                let outcome = worker(item_ctx, item, ship.clone()).await;
                (ship, outcome)
            });
        }

        let mut level_results = Vec::with_capacity(set.len());
        let mut first_err: Option<CoreError> = None;

        while let Some(joined) = set.join_next().await {
            match joined {
                Ok((ship, Ok(value))) => {
                    pool.release(ship).await;
                    level_results.push(value);
                }
                Ok((ship, Err(err))) => {
                    pool.release(ship).await;
                    if first_err.is_none() {
                        level_ctx.cancel();
                        first_err = Some(err);
                    }
                }
                Err(join_err) => {
                    // The task panicked or was aborted; its ship is stuck
                    // with it and is not returned to the pool.
                    if first_err.is_none() {
                        level_ctx.cancel();
                        first_err = Some(CoreError::WorkerFailure {
                            containers: Vec::new(),
                            message: join_err.to_string(),
                        });
                    }
                }
            }
        }

        if let Some(err) = first_err {
            return Err(err);
        }
        if ctx.is_cancelled() {
            return Err(CoreError::Cancelled);
        }

        results.extend(level_results);
    }

    Ok(results)
}

#[cfg(test)]
#[path = "executor_tests.rs"]
mod tests;
