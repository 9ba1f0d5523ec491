#![cfg_attr(test, allow(clippy::unwrap_used))]

//! fleet-cli: thin RPC client over the daemon's Unix socket.

pub mod client;
pub mod commands;
pub mod exit_error;
pub mod output;
