#![cfg_attr(test, allow(clippy::unwrap_used))]

//! fleet-adapters: boundary adapters to the outside world — the remote
//! game API, the out-of-process route optimiser, and per-player token
//! storage.

pub mod game_api;
pub mod player_token;
pub mod route_optimiser;

pub use game_api::{ApiError, GameApiClient, ReqwestGameApiClient};
#[cfg(any(test, feature = "test-support"))]
pub use game_api::FakeGameApiClient;
pub use player_token::{InMemoryPlayerTokenRepository, PlayerTokenError, PlayerTokenRepository};
pub use route_optimiser::{DirectRouteOptimiser, RouteOptimiser, RouteOptimiserError, RouteRequest, RouteResponse, TcpRouteOptimiser};
