use clap::{Parser, Subcommand};
use fleet_cli::commands::{container, send, status};
use fleet_cli::exit_error::ExitError;
use fleet_cli::output::OutputFormat;
use fleet_core::PlayerId;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "fleet", about = "CLI for the fleet-management daemon")]
struct Cli {
    /// Player account whose daemon socket to talk to.
    #[arg(long, global = true, env = "FLEET_PLAYER")]
    player: String,

    /// Override the daemon socket path (defaults to the per-player state dir).
    #[arg(long, global = true)]
    socket: Option<PathBuf>,

    #[arg(long, global = true, value_enum, default_value_t = OutputFormat::Text)]
    format: OutputFormat,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Container lifecycle: create, start, stop, restart, get, list.
    Container(container::ContainerArgs),
    /// Daemon health and uptime.
    Status,
    /// Pass a named request straight through to the daemon's mediator.
    Send {
        request_type: String,
        /// JSON payload, e.g. '{"waypoint":"X1-AB"}'.
        payload: Option<String>,
        #[arg(long)]
        player: Option<String>,
    },
}

fn socket_path(cli: &Cli) -> anyhow::Result<PathBuf> {
    if let Some(path) = &cli.socket {
        return Ok(path.clone());
    }
    let config = fleet_daemon_socket::resolve(PlayerId::new(cli.player.clone()))?;
    Ok(config)
}

mod fleet_daemon_socket {
    use fleet_core::PlayerId;
    use std::path::PathBuf;

    /// Mirrors `fleet_daemon::Config`'s path layout without depending on the
    /// daemon binary crate: `$FLEET_STATE_DIR/<player>/daemon.sock`.
    pub fn resolve(player: PlayerId) -> anyhow::Result<PathBuf> {
        let root = if let Ok(dir) = std::env::var("FLEET_STATE_DIR") {
            PathBuf::from(dir)
        } else if let Ok(xdg) = std::env::var("XDG_STATE_HOME") {
            PathBuf::from(xdg).join("fleet")
        } else {
            dirs::home_dir().ok_or_else(|| anyhow::anyhow!("could not determine a home directory"))?.join(".local/state/fleet")
        };
        Ok(root.join(player.as_str()).join("daemon.sock"))
    }
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    let format = cli.format;
    let result = run(cli, format).await;
    if let Err(err) = result {
        eprintln!("error: {err}");
        let code = err.downcast_ref::<ExitError>().map(|e| e.code).unwrap_or(1);
        std::process::exit(code);
    }
}

async fn run(cli: Cli, format: OutputFormat) -> anyhow::Result<()> {
    let socket = socket_path(&cli)?;
    match cli.command {
        Command::Container(args) => container::run(args, socket, format).await,
        Command::Status => status::run(socket, format).await,
        Command::Send { request_type, payload, player } => send::run(socket, request_type, payload, player).await,
    }
}
