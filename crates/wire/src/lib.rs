#![cfg_attr(test, allow(clippy::unwrap_used))]

//! IPC protocol between the daemon and the CLI.
//!
//! Wire format: 4-byte length prefix (big-endian) + JSON payload.

mod request;
mod response;
mod wire;

pub use request::Request;
pub use response::{ContainerSummary, DaemonStatus, Response};
pub use wire::{decode, encode, read_message, read_request, read_response, write_message, write_request, write_response, ProtocolError, MAX_MESSAGE_BYTES};
