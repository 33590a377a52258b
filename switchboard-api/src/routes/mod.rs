//! REST API Routes Module
//!
//! Route handlers organized by resource, plus router assembly and CORS.

pub mod callers;
pub mod health;
pub mod leads;
pub mod webhook;

use std::time::Duration;

use axum::{
    http::{header, HeaderValue, Method},
    response::IntoResponse,
    routing::{get, patch, post, put},
    Json, Router,
};
use tower_http::cors::{Any, CorsLayer};
use utoipa::OpenApi;

use crate::config::ApiConfig;
use crate::openapi::ApiDoc;
use crate::state::AppState;
use crate::ws;

/// Handler for /openapi.json endpoint.
async fn openapi_json() -> impl IntoResponse {
    Json(ApiDoc::openapi())
}

/// Assemble the application router.
pub fn create_api_router(state: AppState) -> Router {
    let cors = build_cors_layer(&state.config);

    Router::new()
        .route("/health", get(health::health))
        .route("/openapi.json", get(openapi_json))
        .route("/api/business-date", get(health::business_date))
        .route("/api/leads/webhook", post(webhook::lead_webhook))
        .route("/api/leads", get(leads::list_leads))
        .route("/api/leads/{id}", get(leads::get_lead))
        .route("/api/leads/{id}/reassign", patch(leads::reassign_lead))
        .route(
            "/api/callers",
            post(callers::create_caller).get(callers::list_callers),
        )
        .route(
            "/api/callers/{id}",
            put(callers::update_caller).delete(callers::delete_caller),
        )
        .route(
            "/api/callers/{id}/status",
            patch(callers::update_caller_status),
        )
        .route("/ws/dashboard", get(ws::ws_handler))
        .layer(cors)
        .with_state(state)
}

/// Build the CORS layer from ApiConfig.
///
/// With no configured origins (dev mode) all origins are allowed; in
/// production only the configured list is.
fn build_cors_layer(config: &ApiConfig) -> CorsLayer {
    let cors = CorsLayer::new()
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::PATCH,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .max_age(Duration::from_secs(config.cors_max_age_secs));

    if config.cors_origins.is_empty() {
        tracing::info!("CORS: allowing all origins (dev mode)");
        cors.allow_origin(Any).allow_headers(Any)
    } else {
        tracing::info!(origins = ?config.cors_origins, "CORS: restricting origins");
        let origins: Vec<HeaderValue> = config
            .cors_origins
            .iter()
            .filter_map(|o| o.parse().ok())
            .collect();
        cors.allow_origin(origins)
            .allow_headers([header::CONTENT_TYPE, header::ACCEPT])
    }
}
