//! A single shared SQLite connection guarded by a blocking-safe mutex.
//!
//! SQLite serializes writers anyway, and this daemon's write volume (ship
//! assignments, container status updates) does not warrant a real pool.
//! Every call goes through [`Store::with_conn`], which hops onto a blocking
//! thread so `rusqlite`'s synchronous API never stalls the Tokio runtime.

use crate::error::StorageError;
use crate::schema;
use parking_lot::Mutex;
use rusqlite::Connection;
use std::path::Path;
use std::sync::Arc;

#[derive(Clone)]
pub struct Store {
    conn: Arc<Mutex<Connection>>,
}

impl Store {
    pub fn open(path: impl AsRef<Path>) -> Result<Self, StorageError> {
        let conn = Connection::open(path)?;
        Self::from_connection(conn)
    }

    pub fn open_in_memory() -> Result<Self, StorageError> {
        Self::from_connection(Connection::open_in_memory()?)
    }

    fn from_connection(conn: Connection) -> Result<Self, StorageError> {
        conn.pragma_update(None, "journal_mode", "WAL")?;
        conn.pragma_update(None, "foreign_keys", true)?;
        schema::migrate(&conn)?;
        Ok(Self { conn: Arc::new(Mutex::new(conn)) })
    }

    /// Run a synchronous closure against the connection on a blocking
    /// thread. The closure must not hold the lock across an `.await` —
    /// it can't, since it isn't async.
    pub async fn with_conn<T, F>(&self, f: F) -> Result<T, StorageError>
    where
        T: Send + 'static,
        F: FnOnce(&Connection) -> Result<T, StorageError> + Send + 'static,
    {
        let conn = self.conn.clone();
        tokio::task::spawn_blocking(move || {
            let guard = conn.lock();
            f(&guard)
        })
        .await?
    }
}

#[cfg(test)]
#[path = "pool_tests.rs"]
mod tests;
