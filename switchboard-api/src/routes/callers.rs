//! Caller REST API Routes
//!
//! Administration over caller profiles and their state bindings. Deleting a
//! caller pauses it rather than removing the row, preserving referential
//! integrity of historical assignments.

use std::collections::HashMap;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use chrono::Utc;
use deadpool_postgres::Object;
use uuid::Uuid;

use switchboard_core::{normalize_state, Caller, CallerId, CallerStatus, EntityIdType};

use crate::error::{ApiError, ApiResult};
use crate::state::AppState;
use crate::types::{
    CallerResponse, CreateCallerRequest, UpdateCallerRequest, UpdateCallerStatusRequest,
};

/// Normalize and dedupe a state binding list, preserving first occurrence
/// order.
fn normalize_states(raw: &[String]) -> Vec<String> {
    let mut seen = Vec::new();
    for state in raw {
        if let Some(normalized) = normalize_state(Some(state.as_str())) {
            if !seen.contains(&normalized) {
                seen.push(normalized);
            }
        }
    }
    seen
}

async fn states_of(conn: &Object, caller_id: CallerId) -> ApiResult<Vec<String>> {
    let rows = conn
        .query(
            "SELECT state FROM caller_states WHERE caller_id = $1 ORDER BY state",
            &[&caller_id.as_uuid()],
        )
        .await
        .map_err(|e| ApiError::database_error(e.to_string()))?;
    Ok(rows.iter().map(|r| r.get(0)).collect())
}

async fn leads_assigned_today(
    conn: &Object,
    caller_id: CallerId,
    today: chrono::NaiveDate,
) -> ApiResult<i64> {
    let row = conn
        .query_opt(
            "SELECT count FROM daily_counters WHERE caller_id = $1 AND business_date = $2",
            &[&caller_id.as_uuid(), &today],
        )
        .await
        .map_err(|e| ApiError::database_error(e.to_string()))?;
    Ok(row.map(|r| r.get(0)).unwrap_or(0))
}

/// Load one caller profile with its state bindings, or 404.
async fn load_caller(conn: &Object, caller_id: CallerId) -> ApiResult<Caller> {
    let row = conn
        .query_opt(
            "SELECT name, role, languages, daily_limit, status, created_at, updated_at \
             FROM callers WHERE id = $1",
            &[&caller_id.as_uuid()],
        )
        .await
        .map_err(|e| ApiError::database_error(e.to_string()))?
        .ok_or_else(|| ApiError::caller_not_found(caller_id))?;

    let status: String = row.get("status");
    Ok(Caller {
        caller_id,
        name: row.get("name"),
        role: row.get("role"),
        languages: row.get("languages"),
        daily_limit: row.get("daily_limit"),
        assigned_states: states_of(conn, caller_id).await?,
        status: status
            .parse()
            .map_err(|e| ApiError::database_error(format!("{}", e)))?,
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    })
}

/// Load one caller into its API shape, or 404.
async fn load_caller_response(
    conn: &Object,
    caller_id: CallerId,
    today: chrono::NaiveDate,
) -> ApiResult<CallerResponse> {
    let caller = load_caller(conn, caller_id).await?;
    let today_count = leads_assigned_today(conn, caller_id, today).await?;
    Ok(CallerResponse::from_caller(caller, today_count))
}

async fn replace_state_bindings(
    conn: &Object,
    caller_id: CallerId,
    states: &[String],
) -> ApiResult<()> {
    conn.execute(
        "DELETE FROM caller_states WHERE caller_id = $1",
        &[&caller_id.as_uuid()],
    )
    .await
    .map_err(|e| ApiError::database_error(e.to_string()))?;
    for state in states {
        conn.execute(
            "INSERT INTO caller_states (caller_id, state) VALUES ($1, $2)",
            &[&caller_id.as_uuid(), state],
        )
        .await
        .map_err(|e| ApiError::database_error(e.to_string()))?;
    }
    Ok(())
}

/// POST /api/callers - create a caller
#[utoipa::path(
    post,
    path = "/api/callers",
    tag = "Callers",
    request_body = CreateCallerRequest,
    responses(
        (status = 201, description = "Caller created", body = CallerResponse),
        (status = 400, description = "Invalid request", body = ApiError),
    )
)]
pub async fn create_caller(
    State(state): State<AppState>,
    Json(req): Json<CreateCallerRequest>,
) -> ApiResult<impl IntoResponse> {
    if req.name.trim().is_empty() {
        return Err(ApiError::missing_field("name"));
    }
    if req.daily_limit < 0 {
        return Err(ApiError::invalid_range("daily_limit", 0, i32::MAX));
    }

    let caller_id = CallerId::new_v4();
    let now = Utc::now();
    let assigned_states = normalize_states(&req.assigned_states);

    let conn = state.db.conn().await?;
    conn.execute(
        "INSERT INTO callers (id, name, role, languages, daily_limit, status, created_at, updated_at) \
         VALUES ($1, $2, $3, $4, $5, $6, $7, $7)",
        &[
            &caller_id.as_uuid(),
            &req.name,
            &req.role,
            &req.languages,
            &req.daily_limit,
            &req.status.as_str(),
            &now,
        ],
    )
    .await
    .map_err(|e| ApiError::database_error(e.to_string()))?;
    replace_state_bindings(&conn, caller_id, &assigned_states).await?;

    tracing::info!(caller_id = %caller_id, name = %req.name, "Caller created");

    let response = load_caller_response(&conn, caller_id, state.engine.today()).await?;
    Ok((StatusCode::CREATED, Json(response)))
}

/// GET /api/callers - list callers with today's tallies
#[utoipa::path(
    get,
    path = "/api/callers",
    tag = "Callers",
    responses(
        (status = 200, description = "All callers", body = [CallerResponse]),
    )
)]
pub async fn list_callers(State(state): State<AppState>) -> ApiResult<impl IntoResponse> {
    let today = state.engine.today();
    let conn = state.db.conn().await?;

    let caller_rows = conn
        .query(
            "SELECT id, name, role, languages, daily_limit, status \
             FROM callers ORDER BY created_at, id",
            &[],
        )
        .await
        .map_err(|e| ApiError::database_error(e.to_string()))?;

    let state_rows = conn
        .query("SELECT caller_id, state FROM caller_states ORDER BY state", &[])
        .await
        .map_err(|e| ApiError::database_error(e.to_string()))?;
    let mut states_map: HashMap<Uuid, Vec<String>> = HashMap::new();
    for row in &state_rows {
        states_map
            .entry(row.get(0))
            .or_default()
            .push(row.get(1));
    }

    let counter_rows = conn
        .query(
            "SELECT caller_id, count FROM daily_counters WHERE business_date = $1",
            &[&today],
        )
        .await
        .map_err(|e| ApiError::database_error(e.to_string()))?;
    let count_map: HashMap<Uuid, i64> = counter_rows
        .iter()
        .map(|row| (row.get(0), row.get(1)))
        .collect();

    let mut results = Vec::with_capacity(caller_rows.len());
    for row in &caller_rows {
        let id: Uuid = row.get("id");
        let status: String = row.get("status");
        results.push(CallerResponse {
            id: CallerId::new(id),
            name: row.get("name"),
            role: row.get("role"),
            languages: row.get("languages"),
            daily_limit: row.get("daily_limit"),
            assigned_states: states_map.remove(&id).unwrap_or_default(),
            leads_assigned_today: count_map.get(&id).copied().unwrap_or(0),
            status: status
                .parse()
                .map_err(|e| ApiError::database_error(format!("{}", e)))?,
        });
    }
    Ok(Json(results))
}

/// PUT /api/callers/{id} - partially update a caller
#[utoipa::path(
    put,
    path = "/api/callers/{id}",
    tag = "Callers",
    params(("id" = Uuid, Path, description = "Caller ID")),
    request_body = UpdateCallerRequest,
    responses(
        (status = 200, description = "Caller updated", body = CallerResponse),
        (status = 400, description = "Invalid request", body = ApiError),
        (status = 404, description = "Caller not found", body = ApiError),
    )
)]
pub async fn update_caller(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(req): Json<UpdateCallerRequest>,
) -> ApiResult<impl IntoResponse> {
    if matches!(req.daily_limit, Some(limit) if limit < 0) {
        return Err(ApiError::invalid_range("daily_limit", 0, i32::MAX));
    }

    let caller_id = CallerId::new(id);
    let conn = state.db.conn().await?;
    let current = load_caller(&conn, caller_id).await?;

    let role = req.role.or(current.role);
    let languages = req.languages.unwrap_or(current.languages);
    let daily_limit = req.daily_limit.unwrap_or(current.daily_limit);
    let status = req.status.unwrap_or(current.status);

    conn.execute(
        "UPDATE callers SET role = $2, languages = $3, daily_limit = $4, status = $5, \
         updated_at = $6 WHERE id = $1",
        &[
            &caller_id.as_uuid(),
            &role,
            &languages,
            &daily_limit,
            &status.as_str(),
            &Utc::now(),
        ],
    )
    .await
    .map_err(|e| ApiError::database_error(e.to_string()))?;

    if let Some(raw_states) = &req.assigned_states {
        replace_state_bindings(&conn, caller_id, &normalize_states(raw_states)).await?;
    }

    let response = load_caller_response(&conn, caller_id, state.engine.today()).await?;
    Ok(Json(response))
}

/// PATCH /api/callers/{id}/status - flip a caller's status
#[utoipa::path(
    patch,
    path = "/api/callers/{id}/status",
    tag = "Callers",
    params(("id" = Uuid, Path, description = "Caller ID")),
    request_body = UpdateCallerStatusRequest,
    responses(
        (status = 200, description = "Status updated", body = CallerResponse),
        (status = 404, description = "Caller not found", body = ApiError),
    )
)]
pub async fn update_caller_status(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(req): Json<UpdateCallerStatusRequest>,
) -> ApiResult<impl IntoResponse> {
    let caller_id = CallerId::new(id);
    let conn = state.db.conn().await?;

    let updated = conn
        .execute(
            "UPDATE callers SET status = $2, updated_at = $3 WHERE id = $1",
            &[&caller_id.as_uuid(), &req.status.as_str(), &Utc::now()],
        )
        .await
        .map_err(|e| ApiError::database_error(e.to_string()))?;
    if updated == 0 {
        return Err(ApiError::caller_not_found(caller_id));
    }

    tracing::info!(caller_id = %caller_id, status = %req.status, "Caller status changed");

    let response = load_caller_response(&conn, caller_id, state.engine.today()).await?;
    Ok(Json(response))
}

/// DELETE /api/callers/{id} - pause a caller
///
/// Callers are never physically deleted; historical assignments keep
/// pointing at them.
#[utoipa::path(
    delete,
    path = "/api/callers/{id}",
    tag = "Callers",
    params(("id" = Uuid, Path, description = "Caller ID")),
    responses(
        (status = 204, description = "Caller paused"),
        (status = 404, description = "Caller not found", body = ApiError),
    )
)]
pub async fn delete_caller(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<StatusCode> {
    let caller_id = CallerId::new(id);
    let conn = state.db.conn().await?;

    let updated = conn
        .execute(
            "UPDATE callers SET status = $2, updated_at = $3 WHERE id = $1",
            &[
                &caller_id.as_uuid(),
                &CallerStatus::Paused.as_str(),
                &Utc::now(),
            ],
        )
        .await
        .map_err(|e| ApiError::database_error(e.to_string()))?;
    if updated == 0 {
        return Err(ApiError::caller_not_found(caller_id));
    }

    Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_states_dedupes_spellings() {
        let raw = vec![
            "Maharashtra".to_string(),
            " maharashtra ".to_string(),
            "Goa".to_string(),
            "".to_string(),
        ];
        assert_eq!(
            normalize_states(&raw),
            vec!["maharashtra".to_string(), "goa".to_string()]
        );
    }
}
