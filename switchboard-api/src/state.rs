//! Shared application state for Axum routers.

use std::sync::Arc;

use axum::extract::FromRef;
use switchboard_engine::AssignmentEngine;

use crate::config::ApiConfig;
use crate::db::DbClient;
use crate::ws::WsState;

/// Application-wide state shared across all routes.
#[derive(Clone)]
pub struct AppState {
    pub db: DbClient,
    pub ws: Arc<WsState>,
    pub engine: Arc<AssignmentEngine>,
    pub config: Arc<ApiConfig>,
}

impl FromRef<AppState> for DbClient {
    fn from_ref(state: &AppState) -> Self {
        state.db.clone()
    }
}

impl FromRef<AppState> for Arc<WsState> {
    fn from_ref(state: &AppState) -> Self {
        state.ws.clone()
    }
}

impl FromRef<AppState> for Arc<AssignmentEngine> {
    fn from_ref(state: &AppState) -> Self {
        state.engine.clone()
    }
}

impl FromRef<AppState> for Arc<ApiConfig> {
    fn from_ref(state: &AppState) -> Self {
        state.config.clone()
    }
}
