//! HTTP client for the remote game API. Per-player tokens are resolved by
//! the mediator's player-token middleware and attached to the context
//! before a handler ever reaches this adapter; this crate does not retry —
//! retry policy, if any, lives here (per the spec: "the core does not add
//! retries — retries live in the API adapter"), not in callers.

use async_trait::async_trait;
use fleet_core::Ctx;
use serde::de::DeserializeOwned;
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("request error: {0}")]
    Request(#[from] reqwest::Error),

    #[error("no player token on context")]
    MissingToken,

    #[error("API returned {status}: {body}")]
    Status { status: u16, body: String },
}

impl From<ApiError> for fleet_core::CoreError {
    fn from(err: ApiError) -> Self {
        fleet_core::CoreError::Api(err.to_string())
    }
}

/// A narrow slice of the game API the containers in this repository need.
/// Grows as domain handlers are added; kept as a trait so tests can swap in
/// a fake without standing up an HTTP server.
#[async_trait]
pub trait GameApiClient: Send + Sync {
    async fn get_ship(&self, ctx: &Ctx, symbol: &str) -> Result<serde_json::Value, ApiError>;
    async fn list_ships(&self, ctx: &Ctx) -> Result<Vec<serde_json::Value>, ApiError>;
    async fn navigate_ship(&self, ctx: &Ctx, symbol: &str, waypoint: &str) -> Result<serde_json::Value, ApiError>;
    async fn extract_resources(&self, ctx: &Ctx, symbol: &str) -> Result<serde_json::Value, ApiError>;
}

pub struct ReqwestGameApiClient {
    http: reqwest::Client,
    base_url: String,
}

impl ReqwestGameApiClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .expect("reqwest client with static TLS config always builds");
        Self { http, base_url: base_url.into() }
    }

    fn token<'a>(&self, ctx: &'a Ctx) -> Result<&'a str, ApiError> {
        ctx.player_token().ok_or(ApiError::MissingToken)
    }

    async fn get_json<T: DeserializeOwned>(&self, ctx: &Ctx, path: &str) -> Result<T, ApiError> {
        let token = self.token(ctx)?;
        let resp = self.http.get(format!("{}{}", self.base_url, path)).bearer_auth(token).send().await?;
        self.decode(resp).await
    }

    async fn post_json<T: DeserializeOwned>(&self, ctx: &Ctx, path: &str) -> Result<T, ApiError> {
        let token = self.token(ctx)?;
        let resp = self.http.post(format!("{}{}", self.base_url, path)).bearer_auth(token).send().await?;
        self.decode(resp).await
    }

    async fn decode<T: DeserializeOwned>(&self, resp: reqwest::Response) -> Result<T, ApiError> {
        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(ApiError::Status { status: status.as_u16(), body });
        }
        Ok(resp.json().await?)
    }
}

#[async_trait]
impl GameApiClient for ReqwestGameApiClient {
    async fn get_ship(&self, ctx: &Ctx, symbol: &str) -> Result<serde_json::Value, ApiError> {
        self.get_json(ctx, &format!("/my/ships/{symbol}")).await
    }

    async fn list_ships(&self, ctx: &Ctx) -> Result<Vec<serde_json::Value>, ApiError> {
        self.get_json(ctx, "/my/ships").await
    }

    async fn navigate_ship(&self, ctx: &Ctx, symbol: &str, waypoint: &str) -> Result<serde_json::Value, ApiError> {
        self.post_json(ctx, &format!("/my/ships/{symbol}/navigate?waypoint={waypoint}")).await
    }

    async fn extract_resources(&self, ctx: &Ctx, symbol: &str) -> Result<serde_json::Value, ApiError> {
        self.post_json(ctx, &format!("/my/ships/{symbol}/extract")).await
    }
}

#[cfg(any(test, feature = "test-support"))]
mod fake {
    use super::*;
    use parking_lot::Mutex;
    use std::sync::Arc;

    #[derive(Default)]
    struct State {
        calls: Vec<String>,
    }

    /// Records calls and returns `serde_json::Value::Null` for everything;
    /// good enough for coordinator/runtime tests that don't inspect the
    /// payload shape.
    #[derive(Clone, Default)]
    pub struct FakeGameApiClient {
        state: Arc<Mutex<State>>,
    }

    impl FakeGameApiClient {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn calls(&self) -> Vec<String> {
            self.state.lock().calls.clone()
        }
    }

    #[async_trait]
    impl GameApiClient for FakeGameApiClient {
        async fn get_ship(&self, _ctx: &Ctx, symbol: &str) -> Result<serde_json::Value, ApiError> {
            self.state.lock().calls.push(format!("get_ship:{symbol}"));
            Ok(serde_json::Value::Null)
        }

        async fn list_ships(&self, _ctx: &Ctx) -> Result<Vec<serde_json::Value>, ApiError> {
            self.state.lock().calls.push("list_ships".into());
            Ok(Vec::new())
        }

        async fn navigate_ship(&self, _ctx: &Ctx, symbol: &str, waypoint: &str) -> Result<serde_json::Value, ApiError> {
            self.state.lock().calls.push(format!("navigate_ship:{symbol}:{waypoint}"));
            Ok(serde_json::Value::Null)
        }

        async fn extract_resources(&self, _ctx: &Ctx, symbol: &str) -> Result<serde_json::Value, ApiError> {
            self.state.lock().calls.push(format!("extract_resources:{symbol}"));
            Ok(serde_json::Value::Null)
        }
    }
}

#[cfg(any(test, feature = "test-support"))]
pub use fake::FakeGameApiClient;

#[cfg(test)]
#[path = "game_api_tests.rs"]
mod tests;
