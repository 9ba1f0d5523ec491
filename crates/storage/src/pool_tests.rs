use super::*;

#[tokio::test]
async fn open_in_memory_runs_migrations() {
    let store = Store::open_in_memory().unwrap();
    let count: i64 = store
        .with_conn(|conn| Ok(conn.query_row("SELECT COUNT(*) FROM containers", [], |r| r.get(0))?))
        .await
        .unwrap();
    assert_eq!(count, 0);
}

#[tokio::test]
async fn with_conn_surfaces_sqlite_errors() {
    let store = Store::open_in_memory().unwrap();
    let result: Result<i64, StorageError> =
        store.with_conn(|conn| Ok(conn.query_row("SELECT * FROM nonexistent", [], |r| r.get(0))?)).await;
    assert!(result.is_err());
}
