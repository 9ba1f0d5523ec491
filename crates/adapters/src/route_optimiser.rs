//! Out-of-process route optimiser (TSP/VRP). When the daemon is configured
//! with an address, a bidirectional connection is opened at startup with a
//! bounded dial timeout — failure there is fatal (see `fleet-daemon`'s
//! startup sequencing). When unconfigured, [`DirectRouteOptimiser`] is used:
//! it returns the waypoints in the order given, i.e. direct routes only.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;
use tokio::sync::Mutex;

#[derive(Debug, Error)]
pub enum RouteOptimiserError {
    #[error("dial failed: {0}")]
    Dial(std::io::Error),

    #[error("dial timed out after {0:?}")]
    DialTimeout(Duration),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serde(#[from] serde_json::Error),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RouteRequest {
    pub waypoints: Vec<String>,
    pub start: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RouteResponse {
    pub ordered_waypoints: Vec<String>,
    pub total_distance: f64,
}

#[async_trait]
pub trait RouteOptimiser: Send + Sync {
    async fn optimise(&self, req: RouteRequest) -> Result<RouteResponse, RouteOptimiserError>;
}

/// Built-in fallback used when no optimiser address is configured: returns
/// the waypoints in the order given (direct routes only), distance unknown.
#[derive(Debug, Clone, Copy, Default)]
pub struct DirectRouteOptimiser;

#[async_trait]
impl RouteOptimiser for DirectRouteOptimiser {
    async fn optimise(&self, req: RouteRequest) -> Result<RouteResponse, RouteOptimiserError> {
        Ok(RouteResponse { ordered_waypoints: req.waypoints, total_distance: 0.0 })
    }
}

/// Client for the out-of-process optimiser service. One length-prefixed
/// JSON request per connection use; the connection itself is dialed once
/// at startup and kept open, guarded by a mutex since requests must not
/// interleave on the wire.
pub struct TcpRouteOptimiser {
    stream: Mutex<TcpStream>,
}

impl TcpRouteOptimiser {
    pub async fn dial(addr: &str, timeout: Duration) -> Result<Self, RouteOptimiserError> {
        let stream = tokio::time::timeout(timeout, TcpStream::connect(addr))
            .await
            .map_err(|_| RouteOptimiserError::DialTimeout(timeout))?
            .map_err(RouteOptimiserError::Dial)?;
        Ok(Self { stream: Mutex::new(stream) })
    }
}

#[async_trait]
impl RouteOptimiser for TcpRouteOptimiser {
    async fn optimise(&self, req: RouteRequest) -> Result<RouteResponse, RouteOptimiserError> {
        let payload = serde_json::to_vec(&req)?;
        let mut stream = self.stream.lock().await;
        stream.write_all(&(payload.len() as u32).to_be_bytes()).await?;
        stream.write_all(&payload).await?;

        let mut len_buf = [0u8; 4];
        stream.read_exact(&mut len_buf).await?;
        let len = u32::from_be_bytes(len_buf) as usize;
        let mut body = vec![0u8; len];
        stream.read_exact(&mut body).await?;
        Ok(serde_json::from_slice(&body)?)
    }
}

#[cfg(test)]
#[path = "route_optimiser_tests.rs"]
mod tests;
