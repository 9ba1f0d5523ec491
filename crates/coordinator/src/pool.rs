//! Primitive A: a bounded ship pool kept topped up by a background
//! refresher task.

use async_trait::async_trait;
use fleet_core::{CoreError, Ctx, PlayerId, ShipSymbol};
use parking_lot::Mutex as SyncMutex;
use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, Mutex as AsyncMutex};

/// Default background refresh interval.
pub const DEFAULT_REFRESH_INTERVAL: Duration = Duration::from_secs(30);

/// Queried by the pool's refresher for ships that are currently idle,
/// before the "already-used" filter and the eligibility predicate run.
#[async_trait]
pub trait IdleShipSource: Send + Sync {
    async fn idle_ships(&self, ctx: &Ctx, player: &PlayerId) -> Result<Vec<ShipSymbol>, CoreError>;
}

/// A FIFO channel of ships backed by a background refresher.
///
/// Workers acquire a ship with [`ShipPool::acquire`] and must return it with
/// [`ShipPool::release`] once done, on success or failure. The "already-used"
/// set is mutated only here: once, when a ship is first handed into the
/// channel, whether that's during the initial seed or a later refresh. A
/// ship that's been returned to the channel keeps circulating; it is never
/// pulled from the source a second time.
pub struct ShipPool {
    tx: mpsc::Sender<ShipSymbol>,
    rx: AsyncMutex<mpsc::Receiver<ShipSymbol>>,
    already_used: Arc<SyncMutex<HashSet<ShipSymbol>>>,
}

impl ShipPool {
    /// Seed the pool with `initial` and spawn the background refresher.
    /// `is_eligible` is consulted for every ship the refresher sees; ships
    /// already in `initial` are assumed eligible and are not re-checked.
    pub fn spawn(
        ctx: Ctx,
        player: PlayerId,
        initial: Vec<ShipSymbol>,
        source: Arc<dyn IdleShipSource>,
        is_eligible: Arc<dyn Fn(&ShipSymbol) -> bool + Send + Sync>,
        refresh_interval: Duration,
    ) -> Arc<Self> {
        let capacity = (initial.len() * 2).max(1);
        let (tx, rx) = mpsc::channel(capacity);
        let already_used = Arc::new(SyncMutex::new(HashSet::new()));
        for ship in initial {
            already_used.lock().insert(ship.clone());
            // Capacity is sized for exactly this seed, so this cannot fail.
            let _ = tx.try_send(ship);
        }

        let pool = Arc::new(Self { tx: tx.clone(), rx: AsyncMutex::new(rx), already_used: Arc::clone(&already_used) });
        tokio::spawn(refresh_loop(ctx, player, source, is_eligible, already_used, tx, refresh_interval));
        pool
    }

    /// Wait for a ship, or `None` if `ctx` is cancelled first.
    pub async fn acquire(&self, ctx: &Ctx) -> Option<ShipSymbol> {
        tokio::select! {
            _ = ctx.cancelled() => None,
            ship = async { self.rx.lock().await.recv().await } => ship,
        }
    }

    /// Return a ship a worker is done with. Idempotent with respect to the
    /// already-used set: returning a ship does not make it eligible to be
    /// pulled from the source again.
    pub async fn release(&self, ship: ShipSymbol) {
        if self.tx.send(ship).await.is_err() {
            tracing::warn!("ship pool release after channel closed, dropping ship");
        }
    }

    #[cfg(test)]
    fn already_used_snapshot(&self) -> HashSet<ShipSymbol> {
        self.already_used.lock().clone()
    }
}

async fn refresh_loop(
    ctx: Ctx,
    player: PlayerId,
    source: Arc<dyn IdleShipSource>,
    is_eligible: Arc<dyn Fn(&ShipSymbol) -> bool + Send + Sync>,
    already_used: Arc<SyncMutex<HashSet<ShipSymbol>>>,
    tx: mpsc::Sender<ShipSymbol>,
    refresh_interval: Duration,
) {
    let mut tick = tokio::time::interval(refresh_interval);
    tick.tick().await; // the first tick fires immediately; the initial seed already covers it

    loop {
        tokio::select! {
            _ = ctx.cancelled() => return,
            _ = tick.tick() => {}
        }

        let ships = match source.idle_ships(&ctx, &player).await {
            Ok(ships) => ships,
            Err(err) => {
                tracing::warn!(error = %err, "ship pool refresh query failed");
                continue;
            }
        };

        for ship in ships {
            if !is_eligible(&ship) {
                continue;
            }
            let mut guard = already_used.lock();
            if guard.contains(&ship) {
                continue;
            }
            // try_send rather than send: a full channel means the workers
            // are behind, not that the ship is lost — it's still idle and
            // will be seen again on the next refresh.
            if tx.try_send(ship.clone()).is_ok() {
                guard.insert(ship);
            }
        }
    }
}

#[cfg(test)]
#[path = "pool_tests.rs"]
mod tests;
