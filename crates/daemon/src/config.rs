//! Daemon configuration: state directory layout and the optional
//! `config.toml` settings overlay.
//!
//! State is kept per player, mirroring the "single instance per player"
//! environment rule: two players never contend for the same lock file,
//! socket, or database.

use fleet_core::PlayerId;
use serde::Deserialize;
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not determine a home/state directory (set FLEET_STATE_DIR)")]
    NoStateDir,

    #[error("failed to read {path}: {source}")]
    Read { path: PathBuf, #[source] source: std::io::Error },

    #[error("failed to parse {path}: {source}")]
    Parse { path: PathBuf, #[source] source: toml::de::Error },
}

/// Filesystem layout for one player's daemon instance.
#[derive(Debug, Clone)]
pub struct Config {
    pub player: PlayerId,
    pub state_dir: PathBuf,
    pub socket_path: PathBuf,
    pub lock_path: PathBuf,
    pub db_path: PathBuf,
    pub log_path: PathBuf,
    pub settings_path: PathBuf,
}

impl Config {
    pub fn load(player: PlayerId) -> Result<Self, ConfigError> {
        let root = state_root()?.join(player.as_str());
        Ok(Self {
            socket_path: root.join("daemon.sock"),
            lock_path: root.join("daemon.pid"),
            db_path: root.join("fleet.db"),
            log_path: root.join("daemon.log"),
            settings_path: root.join("config.toml"),
            state_dir: root,
            player,
        })
    }
}

fn state_root() -> Result<PathBuf, ConfigError> {
    if let Ok(dir) = std::env::var("FLEET_STATE_DIR") {
        return Ok(PathBuf::from(dir));
    }
    if let Ok(xdg) = std::env::var("XDG_STATE_HOME") {
        return Ok(PathBuf::from(xdg).join("fleet"));
    }
    Ok(dirs::home_dir().ok_or(ConfigError::NoStateDir)?.join(".local/state/fleet"))
}

/// Overridable daemon behavior. Every field has a default so a missing
/// `config.toml` is equivalent to one with every key omitted.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub game_api_base_url: String,
    pub route_optimiser_addr: Option<String>,
    pub route_optimiser_dial_timeout_ms: u64,
    pub grace_window_secs: u64,
    pub stale_assignment_timeout_secs: u64,
    pub ship_pool_refresh_secs: u64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            game_api_base_url: "https://api.spacetraders.io/v2".to_string(),
            route_optimiser_addr: None,
            route_optimiser_dial_timeout_ms: 2_000,
            grace_window_secs: 30,
            stale_assignment_timeout_secs: 3_600,
            ship_pool_refresh_secs: 30,
        }
    }
}

impl Settings {
    /// Loads `settings_path` if present; a missing file is not an error, a
    /// malformed one is.
    pub fn load(path: &std::path::Path) -> Result<Self, ConfigError> {
        let text = match std::fs::read_to_string(path) {
            Ok(text) => text,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(Self::default()),
            Err(source) => return Err(ConfigError::Read { path: path.to_path_buf(), source }),
        };
        toml::from_str(&text).map_err(|source| ConfigError::Parse { path: path.to_path_buf(), source })
    }

    pub fn route_optimiser_dial_timeout(&self) -> Duration {
        Duration::from_millis(self.route_optimiser_dial_timeout_ms)
    }

    pub fn grace_window(&self) -> Duration {
        Duration::from_secs(self.grace_window_secs)
    }

    pub fn stale_assignment_timeout(&self) -> Duration {
        Duration::from_secs(self.stale_assignment_timeout_secs)
    }

    pub fn ship_pool_refresh_interval(&self) -> Duration {
        Duration::from_secs(self.ship_pool_refresh_secs)
    }
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
