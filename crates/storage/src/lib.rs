#![cfg_attr(test, allow(clippy::unwrap_used))]

//! fleet-storage: SQLite-backed persistence for containers and ship
//! assignments. Exclusivity lives in the schema (a unique partial index),
//! not in this crate's Rust code.

pub mod assignments;
pub mod containers;
pub mod error;
pub mod pool;
pub mod schema;

pub use assignments::SqliteShipAssignmentManager;
pub use containers::ContainerStore;
pub use error::StorageError;
pub use pool::Store;
