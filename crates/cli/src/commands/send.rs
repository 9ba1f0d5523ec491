//! `fleet send` - pass a synchronous command/query straight through to
//! whatever the daemon has registered on its mediator by name.

use crate::client::DaemonClient;
use anyhow::Result;
use fleet_core::PlayerId;
use std::path::PathBuf;

pub async fn run(socket_path: PathBuf, request_type: String, payload_json: Option<String>, player: Option<String>) -> Result<()> {
    let payload = match payload_json {
        Some(text) => serde_json::from_str(&text)?,
        None => serde_json::Value::Null,
    };
    let mut client = DaemonClient::connect(&socket_path).await?;
    let response = client.raw_send(request_type, payload, player.map(PlayerId::new)).await?;
    println!("{}", serde_json::to_string_pretty(&response)?);
    Ok(())
}
