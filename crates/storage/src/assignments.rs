//! SQLite-backed [`ShipAssignmentManager`]. Exclusivity is enforced by the
//! unique partial index from [`crate::schema`], not by anything in this
//! file — concurrent `assign` calls for the same ship race at the SQLite
//! layer and exactly one wins; the loser sees a constraint violation which
//! we translate to [`CoreError::AlreadyAssigned`].

use crate::error::StorageError;
use crate::pool::Store;
use async_trait::async_trait;
use fleet_core::{Assignment, AssignmentStatus, ContainerId, CoreError, Ctx, PlayerId, ShipAssignmentManager, ShipSymbol};
use rusqlite::{params, Connection, OptionalExtension};

#[derive(Clone)]
pub struct SqliteShipAssignmentManager {
    store: Store,
}

impl SqliteShipAssignmentManager {
    pub fn new(store: Store) -> Self {
        Self { store }
    }
}

fn row_to_assignment(row: &rusqlite::Row<'_>) -> rusqlite::Result<Assignment> {
    let status: String = row.get("status")?;
    Ok(Assignment {
        ship: ShipSymbol::new(row.get::<_, String>("ship_symbol")?),
        player_id: PlayerId::new(row.get::<_, String>("player_id")?),
        container_id: ContainerId::from_string(row.get::<_, String>("container_id")?),
        status: if status == "active" { AssignmentStatus::Active } else { AssignmentStatus::Released },
        assigned_at_ms: row.get::<_, i64>("assigned_at_ms")? as u64,
        released_at_ms: row.get::<_, Option<i64>>("released_at_ms")?.map(|v| v as u64),
        release_reason: row.get("release_reason")?,
    })
}

fn find_active(conn: &Connection, ship: &str, player: &str) -> rusqlite::Result<Option<Assignment>> {
    conn.query_row(
        "SELECT * FROM ship_assignments WHERE ship_symbol = ?1 AND player_id = ?2 AND status = 'active'",
        params![ship, player],
        row_to_assignment,
    )
    .optional()
}

fn epoch_ms() -> u64 {
    std::time::SystemTime::now().duration_since(std::time::UNIX_EPOCH).unwrap_or_default().as_millis() as u64
}

#[async_trait]
impl ShipAssignmentManager for SqliteShipAssignmentManager {
    async fn assign(
        &self,
        _ctx: &Ctx,
        ship: &ShipSymbol,
        player: &PlayerId,
        container: ContainerId,
    ) -> Result<Assignment, CoreError> {
        let ship = ship.clone();
        let player = player.clone();
        let now = epoch_ms();
        self.store
            .with_conn(move |conn| {
                let inserted = conn.execute(
                    "INSERT INTO ship_assignments (ship_symbol, player_id, container_id, status, assigned_at_ms) VALUES (?1, ?2, ?3, 'active', ?4)",
                    params![ship.as_str(), player.as_str(), container.to_string(), now as i64],
                );
                match inserted {
                    Ok(_) => find_active(conn, ship.as_str(), player.as_str())?
                        .ok_or_else(|| StorageError::Migration("assignment vanished after insert".into())),
                    Err(rusqlite::Error::SqliteFailure(e, _))
                        if e.code == rusqlite::ErrorCode::ConstraintViolation =>
                    {
                        Err(StorageError::AlreadyAssigned)
                    }
                    Err(e) => Err(e.into()),
                }
            })
            .await
            .map_err(Into::into)
    }

    async fn find_by_ship(
        &self,
        _ctx: &Ctx,
        ship: &ShipSymbol,
        player: &PlayerId,
    ) -> Result<Option<Assignment>, CoreError> {
        let ship = ship.clone();
        let player = player.clone();
        self.store
            .with_conn(move |conn| Ok(find_active(conn, ship.as_str(), player.as_str())?))
            .await
            .map_err(Into::into)
    }

    async fn find_by_container(
        &self,
        _ctx: &Ctx,
        container: ContainerId,
        player: &PlayerId,
    ) -> Result<Vec<Assignment>, CoreError> {
        let player = player.clone();
        self.store
            .with_conn(move |conn| {
                let mut stmt = conn.prepare(
                    "SELECT * FROM ship_assignments WHERE container_id = ?1 AND player_id = ?2 AND status = 'active'",
                )?;
                let rows = stmt
                    .query_map(params![container.to_string(), player.as_str()], row_to_assignment)?
                    .collect::<rusqlite::Result<Vec<_>>>()?;
                Ok(rows)
            })
            .await
            .map_err(Into::into)
    }

    async fn release(&self, _ctx: &Ctx, ship: &ShipSymbol, player: &PlayerId, reason: &str) -> Result<(), CoreError> {
        let ship = ship.clone();
        let player = player.clone();
        let reason = reason.to_string();
        let now = epoch_ms();
        self.store
            .with_conn(move |conn| {
                conn.execute(
                    "UPDATE ship_assignments SET status = 'released', released_at_ms = ?1, release_reason = ?2 \
                     WHERE ship_symbol = ?3 AND player_id = ?4 AND status = 'active'",
                    params![now as i64, reason, ship.as_str(), player.as_str()],
                )?;
                Ok(())
            })
            .await
            .map_err(Into::into)
    }

    async fn transfer(
        &self,
        _ctx: &Ctx,
        ship: &ShipSymbol,
        player: &PlayerId,
        from: ContainerId,
        to: ContainerId,
    ) -> Result<Assignment, CoreError> {
        let ship = ship.clone();
        let player = player.clone();
        let now = epoch_ms();
        self.store
            .with_conn(move |conn| {
                let tx = conn.unchecked_transaction()?;
                let current = find_active(&tx, ship.as_str(), player.as_str())?;
                let current = match current {
                    Some(a) => a,
                    None => return Err(StorageError::NotAssigned),
                };
                if current.container_id != from {
                    return Err(StorageError::WrongContainer);
                }
                tx.execute(
                    "UPDATE ship_assignments SET status = 'released', released_at_ms = ?1, release_reason = 'transfer' \
                     WHERE ship_symbol = ?2 AND player_id = ?3 AND status = 'active'",
                    params![now as i64, ship.as_str(), player.as_str()],
                )?;
                tx.execute(
                    "INSERT INTO ship_assignments (ship_symbol, player_id, container_id, status, assigned_at_ms) VALUES (?1, ?2, ?3, 'active', ?4)",
                    params![ship.as_str(), player.as_str(), to.to_string(), now as i64],
                )?;
                let result = find_active(&tx, ship.as_str(), player.as_str())?
                    .ok_or_else(|| StorageError::Migration("assignment vanished after transfer".into()))?;
                tx.commit()?;
                Ok(result)
            })
            .await
            .map_err(Into::into)
    }

    async fn release_by_container(
        &self,
        _ctx: &Ctx,
        container: ContainerId,
        player: &PlayerId,
        reason: &str,
    ) -> Result<u64, CoreError> {
        let player = player.clone();
        let reason = reason.to_string();
        let now = epoch_ms();
        self.store
            .with_conn(move |conn| {
                let n = conn.execute(
                    "UPDATE ship_assignments SET status = 'released', released_at_ms = ?1, release_reason = ?2 \
                     WHERE container_id = ?3 AND player_id = ?4 AND status = 'active'",
                    params![now as i64, reason, container.to_string(), player.as_str()],
                )?;
                Ok(n as u64)
            })
            .await
            .map_err(Into::into)
    }

    async fn release_all_active(&self, _ctx: &Ctx, reason: &str) -> Result<u64, CoreError> {
        let reason = reason.to_string();
        let now = epoch_ms();
        self.store
            .with_conn(move |conn| {
                let n = conn.execute(
                    "UPDATE ship_assignments SET status = 'released', released_at_ms = ?1, release_reason = ?2 \
                     WHERE status = 'active'",
                    params![now as i64, reason],
                )?;
                Ok(n as u64)
            })
            .await
            .map_err(Into::into)
    }

    async fn count_by_container_prefix(&self, _ctx: &Ctx, prefix: &str, player: &PlayerId) -> Result<u64, CoreError> {
        let prefix = format!("{prefix}%");
        let player = player.clone();
        self.store
            .with_conn(move |conn| {
                let n: i64 = conn.query_row(
                    "SELECT COUNT(*) FROM ship_assignments \
                     WHERE container_id LIKE ?1 AND player_id = ?2 AND status = 'active'",
                    params![prefix, player.as_str()],
                    |r| r.get(0),
                )?;
                Ok(n as u64)
            })
            .await
            .map_err(Into::into)
    }
}

#[cfg(test)]
#[path = "assignments_tests.rs"]
mod tests;
