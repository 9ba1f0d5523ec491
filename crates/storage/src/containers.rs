//! Persistence for [`Container`] rows: the runtime's source of truth across
//! restarts. The in-memory task handle lives only in the runtime; this
//! store only ever sees the `Container` metadata struct.

use crate::error::StorageError;
use crate::pool::Store;
use fleet_core::{Container, ContainerId, ContainerKind, Lifecycle, LifecycleStatus, PlayerId};
use rusqlite::{params, Connection, OptionalExtension};

#[derive(Clone)]
pub struct ContainerStore {
    store: Store,
}

fn kind_from_str(s: &str) -> Option<ContainerKind> {
    use ContainerKind::*;
    Some(match s {
        "scout_tour" => ScoutTour,
        "scout_fleet_assignment" => ScoutFleetAssignment,
        "navigate" => Navigate,
        "mining_worker" => MiningWorker,
        "mining_coordinator" => MiningCoordinator,
        "transport_worker" => TransportWorker,
        "contract_workflow" => ContractWorkflow,
        "contract_fleet_coordinator" => ContractFleetCoordinator,
        "balancing" => Balancing,
        "factory_coordinator" => FactoryCoordinator,
        "factory_worker" => FactoryWorker,
        "arbitrage_worker" => ArbitrageWorker,
        "arbitrage_coordinator" => ArbitrageCoordinator,
        "purchase" => Purchase,
        _ => return None,
    })
}

fn status_from_str(s: &str) -> LifecycleStatus {
    match s {
        "running" => LifecycleStatus::Running,
        "completed" => LifecycleStatus::Completed,
        "failed" => LifecycleStatus::Failed,
        "stopped" => LifecycleStatus::Stopped,
        _ => LifecycleStatus::Pending,
    }
}

fn row_to_container(row: &rusqlite::Row<'_>) -> rusqlite::Result<Container> {
    let kind_str: String = row.get("kind")?;
    let status_str: String = row.get("status")?;
    let parent: Option<String> = row.get("parent_id")?;

    let lifecycle = Lifecycle::from_persisted(status_from_str(&status_str), row.get::<_, Option<String>>("last_error")?);

    Ok(Container {
        id: ContainerId::from_string(row.get::<_, String>("id")?),
        kind: kind_from_str(&kind_str).unwrap_or(ContainerKind::ScoutTour),
        player_id: row.get("player_id")?,
        lifecycle,
        interrupted: row.get::<_, i64>("interrupted")? != 0,
        stopping: row.get::<_, i64>("stopping")? != 0,
        restartable: row.get::<_, i64>("restartable")? != 0,
        restart_count: row.get::<_, i64>("restart_count")? as u32,
        restart_bound: row.get::<_, i64>("restart_bound")? as u32,
        iteration: row.get::<_, i64>("iteration")? as u64,
        iteration_bound: row.get::<_, i64>("iteration_bound")? as u64,
        parent_id: parent.map(ContainerId::from_string),
    })
}

impl ContainerStore {
    pub fn new(store: Store) -> Self {
        Self { store }
    }

    pub async fn insert(&self, container: &Container) -> Result<(), StorageError> {
        let c = container.clone();
        self.store
            .with_conn(move |conn| {
                insert_row(conn, &c)?;
                Ok(())
            })
            .await
    }

    pub async fn save(&self, container: &Container) -> Result<(), StorageError> {
        let c = container.clone();
        self.store
            .with_conn(move |conn| {
                conn.execute(
                    "UPDATE containers SET status = ?1, interrupted = ?2, stopping = ?3, restartable = ?4, \
                     restart_count = ?5, iteration = ?6, last_error = ?7, updated_at_ms = ?8 WHERE id = ?9",
                    params![
                        c.lifecycle.status().to_string(),
                        c.interrupted as i64,
                        c.stopping as i64,
                        c.restartable as i64,
                        c.restart_count as i64,
                        c.iteration as i64,
                        c.lifecycle.last_error(),
                        now_ms() as i64,
                        c.id.to_string(),
                    ],
                )?;
                Ok(())
            })
            .await
    }

    pub async fn get(&self, id: ContainerId) -> Result<Option<Container>, StorageError> {
        self.store
            .with_conn(move |conn| {
                Ok(conn
                    .query_row("SELECT * FROM containers WHERE id = ?1", params![id.to_string()], row_to_container)
                    .optional()?)
            })
            .await
    }

    pub async fn list(&self, player: &PlayerId) -> Result<Vec<Container>, StorageError> {
        let player = player.clone();
        self.store
            .with_conn(move |conn| {
                let mut stmt = conn.prepare("SELECT * FROM containers WHERE player_id = ?1")?;
                let rows =
                    stmt.query_map(params![player.as_str()], row_to_container)?.collect::<rusqlite::Result<Vec<_>>>()?;
                Ok(rows)
            })
            .await
    }

    /// Reclassify every RUNNING row as FAILED + interrupted. Called once at
    /// startup, after the PID file is acquired and before any container is
    /// scheduled. Returns the ids that were reclassified.
    pub async fn mark_running_as_interrupted(&self) -> Result<Vec<ContainerId>, StorageError> {
        self.store
            .with_conn(move |conn| {
                let mut stmt = conn.prepare("SELECT * FROM containers WHERE status = 'running'")?;
                let running = stmt.query_map([], row_to_container)?.collect::<rusqlite::Result<Vec<_>>>()?;
                for c in &running {
                    conn.execute(
                        "UPDATE containers SET status = 'failed', interrupted = 1, last_error = 'daemon_restart', updated_at_ms = ?1 WHERE id = ?2",
                        params![now_ms() as i64, c.id.to_string()],
                    )?;
                }
                Ok(running.into_iter().map(|c| c.id).collect())
            })
            .await
    }
}

fn insert_row(conn: &Connection, c: &Container) -> rusqlite::Result<()> {
    conn.execute(
        "INSERT INTO containers (id, kind, player_id, status, interrupted, stopping, restartable, \
         restart_count, restart_bound, iteration, iteration_bound, parent_id, last_error, created_at_ms, updated_at_ms) \
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?14)",
        params![
            c.id.to_string(),
            c.kind.to_string(),
            c.player_id,
            c.lifecycle.status().to_string(),
            c.interrupted as i64,
            c.stopping as i64,
            c.restartable as i64,
            c.restart_count as i64,
            c.restart_bound as i64,
            c.iteration as i64,
            c.iteration_bound as i64,
            c.parent_id.map(|p| p.to_string()),
            c.lifecycle.last_error(),
            now_ms() as i64,
        ],
    )?;
    Ok(())
}

fn now_ms() -> u64 {
    std::time::SystemTime::now().duration_since(std::time::UNIX_EPOCH).unwrap_or_default().as_millis() as u64
}

#[cfg(test)]
#[path = "containers_tests.rs"]
mod tests;
