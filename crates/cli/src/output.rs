//! Text vs JSON rendering, shared across every command.

use clap::ValueEnum;
use fleet_wire::{ContainerSummary, DaemonStatus};
use serde::Serialize;

#[derive(Clone, Copy, Debug, Default, PartialEq, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

pub fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

pub fn print_container(summary: &ContainerSummary, format: OutputFormat) -> anyhow::Result<()> {
    match format {
        OutputFormat::Json => print_json(summary),
        OutputFormat::Text => {
            println!("{}  {:<28}  {}", summary.id, summary.kind, summary.status);
            println!("  player: {}", summary.player_id);
            println!("  restarts: {}/{}", summary.restart_count, summary.restart_bound);
            if summary.iteration_bound > 0 {
                println!("  iteration: {}/{}", summary.iteration, summary.iteration_bound);
            }
            if let Some(error) = &summary.last_error {
                println!("  last error: {error}");
            }
            Ok(())
        }
    }
}

pub fn print_container_list(containers: &[ContainerSummary], format: OutputFormat) -> anyhow::Result<()> {
    match format {
        OutputFormat::Json => print_json(containers),
        OutputFormat::Text => {
            if containers.is_empty() {
                println!("No containers");
                return Ok(());
            }
            for summary in containers {
                println!("{}  {:<28}  {:<12}  {}", summary.id, summary.kind, summary.status, summary.player_id);
            }
            Ok(())
        }
    }
}

pub fn print_status(status: &DaemonStatus, format: OutputFormat) -> anyhow::Result<()> {
    match format {
        OutputFormat::Json => print_json(status),
        OutputFormat::Text => {
            println!("fleet daemon {}", status.version);
            println!("uptime: {}s", status.uptime_secs);
            println!("active containers: {}", status.containers_active);
            Ok(())
        }
    }
}
