use super::*;

#[test]
fn migrate_brings_fresh_db_to_current_version() {
    let conn = Connection::open_in_memory().unwrap();
    migrate(&conn).unwrap();
    let version: i64 = conn.query_row("PRAGMA user_version", [], |row| row.get(0)).unwrap();
    assert_eq!(version, CURRENT_VERSION);
}

#[test]
fn migrate_twice_is_a_noop() {
    let conn = Connection::open_in_memory().unwrap();
    migrate(&conn).unwrap();
    migrate(&conn).unwrap();
}

#[test]
fn active_index_rejects_duplicate_active_assignment() {
    let conn = Connection::open_in_memory().unwrap();
    migrate(&conn).unwrap();
    conn.execute(
        "INSERT INTO ship_assignments (ship_symbol, player_id, container_id, status, assigned_at_ms) VALUES (?1, ?2, ?3, 'active', 1)",
        rusqlite::params!["BUYER-1", "player-1", "cnt-a"],
    )
    .unwrap();
    let err = conn
        .execute(
            "INSERT INTO ship_assignments (ship_symbol, player_id, container_id, status, assigned_at_ms) VALUES (?1, ?2, ?3, 'active', 2)",
            rusqlite::params!["BUYER-1", "player-1", "cnt-b"],
        )
        .unwrap_err();
    assert!(matches!(err, rusqlite::Error::SqliteFailure(..)));
}
