#![cfg_attr(test, allow(clippy::unwrap_used))]

//! fleet-coordinator: the shared primitives coordinator containers (mining,
//! manufacturing, contract, arbitrage, scouting) are built on — a bounded
//! ship pool, a sequential-levels/parallel-items executor, completion-
//! channel fan-in, and cascade shutdown. Domain specifics (what a worker
//! container actually does) live elsewhere; this crate only provides the
//! skeleton every coordinator shares.

pub mod executor;
pub mod fanin;
pub mod pool;

pub use executor::run_levels;
pub use fanin::{cascade_shutdown, cascade_stop, fan_in, WorkerOutcome};
pub use pool::{IdleShipSource, ShipPool, DEFAULT_REFRESH_INTERVAL};
