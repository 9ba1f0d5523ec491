//! Daemon startup, shutdown, and the PID-lock sequencing that keeps a
//! player to a single running instance.

use crate::config::{Config, Settings};
use fleet_adapters::{GameApiClient, InMemoryPlayerTokenRepository, ReqwestGameApiClient};
use fleet_core::{PlayerId, SystemClock};
use fleet_mediator::{Mediator, OperationContextMiddleware, PlayerTokenMiddleware};
use fleet_runtime::{ContainerRuntime, HandlerTable};
use fleet_storage::{ContainerStore, SqliteShipAssignmentManager, Store};
use fs2::FileExt;
use std::fs::{File, OpenOptions};
use std::io::Write as _;
use std::path::Path;
use std::sync::Arc;
use std::time::Instant;
use thiserror::Error;
use tokio::net::UnixListener;
use tracing::{info, warn};

#[derive(Debug, Error)]
pub enum DaemonError {
    #[error("another daemon instance holds the lock at {0}")]
    LockHeld(std::path::PathBuf),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("config error: {0}")]
    Config(#[from] crate::config::ConfigError),

    #[error("storage error: {0}")]
    Storage(#[from] fleet_storage::StorageError),

    #[error("runtime error: {0}")]
    Runtime(#[from] fleet_runtime::RuntimeError),

    #[error("failed to bind socket at {path}: {source}")]
    Bind { path: std::path::PathBuf, #[source] source: std::io::Error },
}

/// Everything a running daemon needs kept alive, plus the lock file whose
/// only job is to stay open for the life of the process.
pub struct DaemonState {
    pub config: Config,
    pub settings: Settings,
    #[allow(dead_code)]
    lock_file: File,
    pub runtime: ContainerRuntime<SystemClock>,
    pub mediator: Arc<Mediator>,
    /// The game API adapter domain handlers reach for once they're
    /// registered on `runtime`'s handler table; no handler ships in this
    /// supervisor yet, so nothing consumes it here.
    pub game_api: Arc<dyn GameApiClient>,
    pub start_time: Instant,
}

pub struct StartupResult {
    pub daemon: DaemonState,
    pub listener: UnixListener,
    pub interrupted: Vec<fleet_core::ContainerId>,
}

pub async fn startup(config: Config, force: bool) -> Result<StartupResult, DaemonError> {
    match startup_inner(&config, force).await {
        Ok(result) => Ok(result),
        Err(err) => {
            // A lock-contention failure means another process owns these
            // files; touching them would corrupt its state.
            if !matches!(err, DaemonError::LockHeld(_)) {
                cleanup_on_failure(&config);
            }
            Err(err)
        }
    }
}

async fn startup_inner(config: &Config, force: bool) -> Result<StartupResult, DaemonError> {
    std::fs::create_dir_all(&config.state_dir)?;

    let lock_file = acquire_lock(&config.lock_path, force)?;

    let settings = Settings::load(&config.settings_path)?;

    let store = Store::open(&config.db_path)?;
    let container_store = ContainerStore::new(store.clone());
    let assignments = Arc::new(SqliteShipAssignmentManager::new(store));

    // Domain container handlers (mining, manufacturing, scouting, ...) are
    // built on fleet-coordinator's primitives but are not part of this
    // supervisor; the table starts empty and is populated by whatever
    // registers handlers before the socket is bound.
    let handlers = HandlerTable::new();

    let runtime = ContainerRuntime::new_with_grace_window(
        container_store,
        assignments.clone() as Arc<dyn fleet_core::ShipAssignmentManager>,
        handlers,
        SystemClock,
        settings.grace_window(),
    );

    let interrupted = runtime.recover_on_startup().await?;
    if !interrupted.is_empty() {
        warn!(count = interrupted.len(), "reclassified RUNNING containers as INTERRUPTED after restart");
    }

    let game_api: Arc<dyn GameApiClient> = Arc::new(ReqwestGameApiClient::new(settings.game_api_base_url.clone()));
    let mediator = build_mediator(&settings);

    if config.socket_path.exists() {
        std::fs::remove_file(&config.socket_path)?;
    }
    if let Some(parent) = config.socket_path.parent() {
        std::fs::create_dir_all(parent)?;
        set_dir_mode(parent, 0o755);
    }
    let listener = UnixListener::bind(&config.socket_path)
        .map_err(|source| DaemonError::Bind { path: config.socket_path.clone(), source })?;

    info!(player = %config.player.as_str(), socket = %config.socket_path.display(), "daemon started");

    Ok(StartupResult {
        daemon: DaemonState {
            config: config.clone(),
            settings,
            lock_file,
            runtime,
            mediator,
            game_api,
            start_time: Instant::now(),
        },
        listener,
        interrupted,
    })
}

fn build_mediator(_settings: &Settings) -> Arc<Mediator> {
    let tokens = Arc::new(InMemoryPlayerTokenRepository::new());
    let mut mediator = Mediator::new();
    mediator.use_middleware(OperationContextMiddleware);
    mediator.use_middleware(PlayerTokenMiddleware::new(tokens));
    Arc::new(mediator)
}

fn acquire_lock(lock_path: &Path, force: bool) -> Result<File, DaemonError> {
    let lock_file = OpenOptions::new().write(true).create(true).truncate(false).open(lock_path)?;
    match lock_file.try_lock_exclusive() {
        Ok(()) => {}
        Err(_) if force => {
            kill_incumbent(lock_path);
            lock_file.try_lock_exclusive().map_err(|_| DaemonError::LockHeld(lock_path.to_path_buf()))?;
        }
        Err(_) => return Err(DaemonError::LockHeld(lock_path.to_path_buf())),
    }

    let mut lock_file = lock_file;
    lock_file.set_len(0)?;
    writeln!(lock_file, "{}", std::process::id())?;
    Ok(lock_file)
}

/// Best-effort SIGTERM to the PID recorded in an incumbent's lock file.
/// Shells out to `kill` rather than pulling in a signal-handling crate the
/// rest of the workspace has no other use for.
fn kill_incumbent(lock_path: &Path) {
    let Ok(contents) = std::fs::read_to_string(lock_path) else { return };
    let Some(pid) = contents.trim().parse::<u32>().ok() else { return };
    warn!(pid, "--force: sending SIGTERM to incumbent daemon");
    let _ = std::process::Command::new("kill").arg("-TERM").arg(pid.to_string()).status();
    std::thread::sleep(std::time::Duration::from_millis(200));
}

#[cfg(unix)]
fn set_dir_mode(path: &Path, mode: u32) {
    use std::os::unix::fs::PermissionsExt;
    if let Ok(meta) = std::fs::metadata(path) {
        let mut perms = meta.permissions();
        perms.set_mode(mode);
        let _ = std::fs::set_permissions(path, perms);
    }
}

#[cfg(not(unix))]
fn set_dir_mode(_path: &Path, _mode: u32) {}

impl DaemonState {
    pub fn shutdown(&self) {
        info!("shutting down daemon");
        if self.config.socket_path.exists() {
            if let Err(err) = std::fs::remove_file(&self.config.socket_path) {
                warn!(%err, "failed to remove socket file");
            }
        }
        if self.config.lock_path.exists() {
            if let Err(err) = std::fs::remove_file(&self.config.lock_path) {
                warn!(%err, "failed to remove PID file");
            }
        }
        info!("daemon shutdown complete");
    }
}

fn cleanup_on_failure(config: &Config) {
    if config.socket_path.exists() {
        let _ = std::fs::remove_file(&config.socket_path);
    }
    if config.lock_path.exists() {
        let _ = std::fs::remove_file(&config.lock_path);
    }
}

#[cfg(test)]
#[path = "lifecycle_tests.rs"]
mod tests;
