#![cfg_attr(test, allow(clippy::unwrap_used))]

//! fleet-daemon: the supervisor binary. Wires together fleet-core,
//! fleet-storage, fleet-runtime, and fleet-mediator behind a Unix-socket RPC
//! surface that fleet-cli talks to.

pub mod config;
pub mod lifecycle;
pub mod logging;
pub mod rpc;

pub use config::{Config, ConfigError, Settings};
pub use lifecycle::{startup, DaemonError, DaemonState, StartupResult};
