//! Switchboard API Server Entry Point
//!
//! Bootstraps tracing, configuration, the connection pool, and the
//! assignment engine, then starts the Axum HTTP server.

use std::net::SocketAddr;
use std::sync::Arc;

use switchboard_api::{
    create_api_router, telemetry, ApiConfig, ApiError, ApiResult, AppState, DbClient, DbConfig,
};
use switchboard_api::ws::WsState;
use switchboard_engine::{AssignmentEngine, BusinessCalendar, SystemClock};

#[tokio::main]
async fn main() -> ApiResult<()> {
    telemetry::init_tracing();

    let api_config = ApiConfig::from_env();
    let db_config = DbConfig::from_env();
    let db = DbClient::from_config(&db_config)?;

    let calendar = BusinessCalendar::from_name(&api_config.business_timezone)
        .map_err(ApiError::from)?;
    let engine = Arc::new(AssignmentEngine::new(calendar, Arc::new(SystemClock)));

    let ws = Arc::new(WsState::new(api_config.ws_capacity));

    let addr = resolve_bind_addr(&api_config)?;
    let state = AppState {
        db,
        ws,
        engine,
        config: Arc::new(api_config),
    };
    let app = create_api_router(state);

    tracing::info!(%addr, "Starting Switchboard API server");

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(|e| ApiError::internal_error(format!("Failed to bind {}: {}", addr, e)))?;

    let server = axum::serve(listener, app);
    tokio::select! {
        result = server => {
            result.map_err(|e| ApiError::internal_error(format!("Server error: {}", e)))?;
        }
        _ = tokio::signal::ctrl_c() => {
            tracing::info!("Shutdown signal received");
        }
    }

    Ok(())
}

fn resolve_bind_addr(config: &ApiConfig) -> ApiResult<SocketAddr> {
    let addr = format!("{}:{}", config.bind_host, config.port);
    addr.parse::<SocketAddr>()
        .map_err(|e| ApiError::invalid_input(format!("Invalid bind address {}: {}", addr, e)))
}
