//! `fleet container ...` - container lifecycle commands.

use crate::client::DaemonClient;
use crate::exit_error::ExitError;
use crate::output::{print_container, print_container_list, OutputFormat};
use anyhow::Result;
use clap::{Args, Subcommand};
use fleet_core::{ContainerId, ContainerKind, PlayerId};
use std::path::PathBuf;

#[derive(Args)]
pub struct ContainerArgs {
    #[command(subcommand)]
    pub command: ContainerCommand,
}

#[derive(Subcommand)]
pub enum ContainerCommand {
    /// Create a container in PENDING state without starting it.
    Create {
        kind: ContainerKindArg,
        #[arg(long)]
        player: String,
    },
    /// Start a PENDING or FAILED-with-budget container.
    Start {
        id: String,
        /// Block until the container reaches a terminal state.
        #[arg(long)]
        wait: bool,
    },
    /// Request a graceful stop.
    Stop { id: String },
    /// Restart a FAILED container within its restart budget, or manually
    /// restart a STOPPED container.
    Restart { id: String },
    /// Fetch one container's current state.
    Get { id: String },
    /// List every container for a player.
    List {
        #[arg(long)]
        player: String,
    },
}

#[derive(Clone, Copy, clap::ValueEnum)]
pub enum ContainerKindArg {
    ScoutTour,
    ScoutFleetAssignment,
    Navigate,
    MiningWorker,
    MiningCoordinator,
    TransportWorker,
    ContractWorkflow,
    ContractFleetCoordinator,
    Balancing,
    FactoryCoordinator,
    FactoryWorker,
    ArbitrageWorker,
    ArbitrageCoordinator,
    Purchase,
}

impl From<ContainerKindArg> for ContainerKind {
    fn from(arg: ContainerKindArg) -> Self {
        match arg {
            ContainerKindArg::ScoutTour => ContainerKind::ScoutTour,
            ContainerKindArg::ScoutFleetAssignment => ContainerKind::ScoutFleetAssignment,
            ContainerKindArg::Navigate => ContainerKind::Navigate,
            ContainerKindArg::MiningWorker => ContainerKind::MiningWorker,
            ContainerKindArg::MiningCoordinator => ContainerKind::MiningCoordinator,
            ContainerKindArg::TransportWorker => ContainerKind::TransportWorker,
            ContainerKindArg::ContractWorkflow => ContainerKind::ContractWorkflow,
            ContainerKindArg::ContractFleetCoordinator => ContainerKind::ContractFleetCoordinator,
            ContainerKindArg::Balancing => ContainerKind::Balancing,
            ContainerKindArg::FactoryCoordinator => ContainerKind::FactoryCoordinator,
            ContainerKindArg::FactoryWorker => ContainerKind::FactoryWorker,
            ContainerKindArg::ArbitrageWorker => ContainerKind::ArbitrageWorker,
            ContainerKindArg::ArbitrageCoordinator => ContainerKind::ArbitrageCoordinator,
            ContainerKindArg::Purchase => ContainerKind::Purchase,
        }
    }
}

pub async fn run(args: ContainerArgs, socket_path: PathBuf, format: OutputFormat) -> Result<()> {
    let mut client = DaemonClient::connect(&socket_path).await.map_err(|err| ExitError::new(1, err.to_string()))?;

    match args.command {
        ContainerCommand::Create { kind, player } => {
            let id = client.create_container(kind.into(), PlayerId::new(player)).await?;
            println!("{id}");
        }
        ContainerCommand::Start { id, wait } => {
            client.start_container(ContainerId::from(id.as_str()), wait).await?;
        }
        ContainerCommand::Stop { id } => {
            client.stop_container(ContainerId::from(id.as_str())).await?;
        }
        ContainerCommand::Restart { id } => {
            client.restart_container(ContainerId::from(id.as_str())).await?;
        }
        ContainerCommand::Get { id } => {
            let container = client.get_container(ContainerId::from(id.as_str())).await?;
            match container {
                Some(summary) => print_container(&summary, format)?,
                None => return Err(ExitError::new(1, format!("no such container: {id}")).into()),
            }
        }
        ContainerCommand::List { player } => {
            let containers = client.list_containers(PlayerId::new(player)).await?;
            print_container_list(&containers, format)?;
        }
    }
    Ok(())
}
