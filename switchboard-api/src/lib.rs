//! Switchboard API
//!
//! Axum transport around the assignment engine: webhook ingestion, lead and
//! caller administration, and WebSocket fan-out of assignment events to the
//! dashboard.

pub mod config;
pub mod db;
pub mod error;
pub mod events;
pub mod openapi;
pub mod routes;
pub mod state;
pub mod telemetry;
pub mod types;
pub mod ws;

pub use config::ApiConfig;
pub use db::{DbClient, DbConfig};
pub use error::{ApiError, ApiResult, ErrorCode};
pub use routes::create_api_router;
pub use state::AppState;
