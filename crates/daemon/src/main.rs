use clap::Parser;
use fleet_core::PlayerId;
use fleet_daemon::{lifecycle, logging, Config};
use std::sync::Arc;
use tracing::{error, info};

#[derive(Parser)]
#[command(name = "fleetd", about = "Autonomous fleet-management daemon")]
struct Args {
    /// Player account this daemon instance manages.
    #[arg(long, env = "FLEET_PLAYER")]
    player: String,

    /// Kill an incumbent daemon holding the PID lock and take over.
    #[arg(long)]
    force: bool,
}

#[tokio::main]
async fn main() {
    let args = Args::parse();
    let config = match Config::load(PlayerId::new(args.player)) {
        Ok(config) => config,
        Err(err) => {
            eprintln!("failed to resolve daemon config: {err}");
            std::process::exit(1);
        }
    };

    if let Err(err) = logging::init(&config.log_path) {
        eprintln!("failed to initialize logging: {err}");
        std::process::exit(1);
    }

    let result = match lifecycle::startup(config, args.force).await {
        Ok(result) => result,
        Err(err) => {
            error!(%err, "daemon startup failed");
            std::process::exit(1);
        }
    };

    info!("ready");

    let shutdown = fleet_core::Ctx::root();
    let daemon = Arc::new(result.daemon);
    let serve_shutdown = shutdown.child();
    let serve_daemon = Arc::clone(&daemon);
    let server = tokio::spawn(async move { fleet_daemon::rpc::serve(result.listener, serve_daemon, serve_shutdown).await });

    if let Err(err) = tokio::signal::ctrl_c().await {
        error!(%err, "failed to install ctrl-c handler");
    }

    info!("shutdown signal received");
    shutdown.cancel();
    let _ = server.await;

    if let Ok(state) = Arc::try_unwrap(daemon) {
        state.shutdown();
    }
    std::process::exit(0);
}
