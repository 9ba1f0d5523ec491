//! `fleet status` - daemon health/uptime.

use crate::client::DaemonClient;
use crate::output::{print_status, OutputFormat};
use anyhow::Result;
use std::path::PathBuf;

pub async fn run(socket_path: PathBuf, format: OutputFormat) -> Result<()> {
    let mut client = match DaemonClient::connect(&socket_path).await {
        Ok(client) => client,
        Err(_) => {
            println!("daemon is not running");
            return Ok(());
        }
    };
    let status = client.status().await?;
    print_status(&status, format)
}
