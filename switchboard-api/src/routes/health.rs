//! Health and business-date endpoints

use axum::{extract::State, response::IntoResponse, Json};
use chrono::Utc;

use crate::error::ApiResult;
use crate::state::AppState;
use crate::types::{BusinessDateResponse, HealthResponse};

/// GET /health - liveness probe
#[utoipa::path(
    get,
    path = "/health",
    tag = "Health",
    responses(
        (status = 200, description = "Service is up", body = HealthResponse),
    )
)]
pub async fn health() -> impl IntoResponse {
    Json(HealthResponse {
        status: "ok".to_string(),
        timestamp: Utc::now(),
    })
}

/// GET /api/business-date - current civil date for cap bucketing
#[utoipa::path(
    get,
    path = "/api/business-date",
    tag = "Health",
    responses(
        (status = 200, description = "Current business date", body = BusinessDateResponse),
    )
)]
pub async fn business_date(State(state): State<AppState>) -> ApiResult<impl IntoResponse> {
    Ok(Json(BusinessDateResponse {
        business_date: state.engine.today(),
    }))
}
