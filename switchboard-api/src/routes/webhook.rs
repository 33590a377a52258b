//! Lead Webhook Route
//!
//! Ingestion endpoint for external automation. Authenticates the shared
//! secret header, runs the assignment engine in its own transaction with a
//! bounded retry on transient conflicts, and broadcasts the committed
//! outcome to the dashboard.

use axum::{extract::State, http::HeaderMap, response::IntoResponse, Json};

use switchboard_core::{AssignmentOutcome, Lead, NewLead};

use crate::error::{ApiError, ApiResult};
use crate::events::WsEvent;
use crate::state::AppState;
use crate::types::{LeadResponse, LeadWebhookRequest};

/// Header carrying the shared ingestion secret.
pub const WEBHOOK_SECRET_HEADER: &str = "x-webhook-secret";

/// Reject the request unless the secret header matches configuration.
/// When no secret is configured the check is disabled (dev mode).
fn verify_webhook_secret(state: &AppState, headers: &HeaderMap) -> ApiResult<()> {
    let Some(expected) = &state.config.webhook_secret else {
        return Ok(());
    };
    let provided = headers
        .get(WEBHOOK_SECRET_HEADER)
        .and_then(|v| v.to_str().ok());
    if provided != Some(expected.as_str()) {
        tracing::warn!("Webhook rejected - invalid secret");
        return Err(ApiError::unauthorized("Invalid webhook secret"));
    }
    Ok(())
}

/// Run `assign` in a fresh transaction, retrying the whole transaction on
/// transient conflicts (pointer-row deadlocks, serialization failures) up
/// to the configured bound.
pub async fn assign_with_retry(
    state: &AppState,
    new_lead: &NewLead,
) -> ApiResult<(Lead, AssignmentOutcome)> {
    let mut attempt = 0u32;
    loop {
        attempt += 1;
        let mut conn = state.db.conn().await?;
        let result = async {
            let tx = conn.transaction().await?;
            let assigned = state.engine.assign(&tx, new_lead).await?;
            tx.commit().await?;
            Ok::<_, switchboard_engine::EngineError>(assigned)
        }
        .await;

        match result {
            Ok(assigned) => return Ok(assigned),
            Err(e) if e.is_transient() && attempt < state.config.assign_retry_limit => {
                tracing::warn!(attempt, error = %e, "Transient conflict, retrying assignment");
            }
            Err(e) => return Err(e.into()),
        }
    }
}

/// POST /api/leads/webhook - record a lead and assign a caller
#[utoipa::path(
    post,
    path = "/api/leads/webhook",
    tag = "Webhook",
    request_body = LeadWebhookRequest,
    responses(
        (status = 200, description = "Lead recorded; outcome includes the assignment decision", body = LeadResponse),
        (status = 400, description = "Invalid payload", body = ApiError),
        (status = 401, description = "Invalid webhook secret", body = ApiError),
        (status = 503, description = "Transient conflict, retry", body = ApiError),
    )
)]
pub async fn lead_webhook(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(payload): Json<LeadWebhookRequest>,
) -> ApiResult<impl IntoResponse> {
    verify_webhook_secret(&state, &headers)?;

    if payload.phone.trim().is_empty() {
        return Err(ApiError::missing_field("phone"));
    }

    let new_lead = payload.into_new_lead();
    let (lead, outcome) = assign_with_retry(&state, &new_lead).await?;

    // Post-commit emission; duplicates committed nothing new.
    if !outcome.duplicate {
        state.ws.broadcast(WsEvent::assignment(&outcome));
    }

    Ok(Json(LeadResponse::from_outcome(lead, &outcome)))
}
