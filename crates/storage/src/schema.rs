//! Schema migrations, applied in order against `PRAGMA user_version`.
//!
//! Mirrors the shape of a version-tagged migration registry: each step
//! knows the version it upgrades from and to, and migrations run forward
//! only — there is no downgrade path.

use crate::error::StorageError;
use rusqlite::Connection;

pub const CURRENT_VERSION: i64 = 1;

struct Migration {
    from: i64,
    to: i64,
    sql: &'static str,
}

const MIGRATIONS: &[Migration] = &[Migration {
    from: 0,
    to: 1,
    sql: r#"
        CREATE TABLE containers (
            id              TEXT PRIMARY KEY,
            kind            TEXT NOT NULL,
            player_id       TEXT NOT NULL,
            status          TEXT NOT NULL,
            interrupted     INTEGER NOT NULL DEFAULT 0,
            stopping        INTEGER NOT NULL DEFAULT 0,
            restartable     INTEGER NOT NULL DEFAULT 1,
            restart_count   INTEGER NOT NULL DEFAULT 0,
            restart_bound   INTEGER NOT NULL DEFAULT 3,
            iteration       INTEGER NOT NULL DEFAULT 0,
            iteration_bound INTEGER NOT NULL DEFAULT 0,
            parent_id       TEXT,
            last_error      TEXT,
            created_at_ms   INTEGER NOT NULL,
            updated_at_ms   INTEGER NOT NULL,
            metadata        TEXT NOT NULL DEFAULT '{}'
        );

        CREATE INDEX idx_containers_player ON containers(player_id);
        CREATE INDEX idx_containers_status ON containers(status);

        CREATE TABLE ship_assignments (
            ship_symbol     TEXT NOT NULL,
            player_id       TEXT NOT NULL,
            container_id    TEXT NOT NULL,
            status          TEXT NOT NULL,
            assigned_at_ms  INTEGER NOT NULL,
            released_at_ms  INTEGER,
            release_reason  TEXT,
            PRIMARY KEY (ship_symbol, player_id, assigned_at_ms)
        );

        CREATE UNIQUE INDEX idx_ship_assignments_active
            ON ship_assignments(ship_symbol, player_id)
            WHERE status = 'active';

        CREATE INDEX idx_ship_assignments_container ON ship_assignments(container_id);
    "#,
}];

pub fn migrate(conn: &Connection) -> Result<(), StorageError> {
    let mut version: i64 = conn.query_row("PRAGMA user_version", [], |row| row.get(0))?;
    loop {
        if version >= CURRENT_VERSION {
            return Ok(());
        }
        let step = MIGRATIONS
            .iter()
            .find(|m| m.from == version)
            .ok_or_else(|| StorageError::Migration(format!("no migration path from version {version}")))?;
        conn.execute_batch(step.sql)?;
        conn.pragma_update(None, "user_version", step.to)?;
        version = step.to;
    }
}

#[cfg(test)]
#[path = "schema_tests.rs"]
mod tests;
