//! Lead REST API Routes
//!
//! Read-side queries over leads and their current assignments, plus manual
//! reassignment.

use axum::{
    extract::{Path, Query, State},
    response::IntoResponse,
    Json,
};
use tokio_postgres::types::ToSql;
use tokio_postgres::Row;
use uuid::Uuid;

use switchboard_core::{
    normalize_state, AssignmentOutcome, CallerId, EntityIdType, Lead, LeadId,
};

use crate::error::{ApiError, ApiResult};
use crate::events::WsEvent;
use crate::state::AppState;
use crate::types::{LeadListItem, LeadResponse, ListLeadsQuery, ReassignLeadRequest};

const MAX_PAGE_SIZE: i64 = 200;

fn list_item_from_row(row: &Row) -> ApiResult<LeadListItem> {
    let status: Option<String> = row.get("status");
    let reason: Option<String> = row.get("reason");
    Ok(LeadListItem {
        id: LeadId::new(row.get::<_, Uuid>("id")),
        name: row.get("name"),
        phone: row.get("phone"),
        state: row.get("state"),
        lead_source: row.get("lead_source"),
        assigned_caller_name: row.get("caller_name"),
        assignment_status: status
            .map(|s| s.parse())
            .transpose()
            .map_err(|e| ApiError::database_error(format!("{}", e)))?,
        assignment_reason: reason
            .map(|s| s.parse())
            .transpose()
            .map_err(|e| ApiError::database_error(format!("{}", e)))?,
        assigned_at: row.get("assigned_at"),
    })
}

/// GET /api/leads - list leads with their current assignments
#[utoipa::path(
    get,
    path = "/api/leads",
    tag = "Leads",
    params(ListLeadsQuery),
    responses(
        (status = 200, description = "Leads, newest first", body = [LeadListItem]),
    )
)]
pub async fn list_leads(
    State(state): State<AppState>,
    Query(query): Query<ListLeadsQuery>,
) -> ApiResult<impl IntoResponse> {
    let limit = query.limit.unwrap_or(50).clamp(1, MAX_PAGE_SIZE);
    let offset = query.offset.unwrap_or(0).max(0);

    let state_filter = normalize_state(query.state.as_deref());
    let caller_filter = query.caller_id;
    let search_pattern = query.search.as_ref().map(|s| format!("%{}%", s));

    let mut sql = String::from(
        "SELECT l.id, l.name, l.phone, l.state, l.lead_source, \
                c.name AS caller_name, a.status, a.reason, a.assigned_at \
         FROM leads l \
         LEFT JOIN assignments a ON a.lead_id = l.id AND a.status <> 'superseded' \
         LEFT JOIN callers c ON c.id = a.caller_id",
    );
    let mut params: Vec<&(dyn ToSql + Sync)> = Vec::new();
    let mut conditions: Vec<String> = Vec::new();

    if let Some(value) = &state_filter {
        params.push(value);
        conditions.push(format!("lower(btrim(l.state)) = ${}", params.len()));
    }
    if let Some(value) = &caller_filter {
        params.push(value);
        conditions.push(format!("a.caller_id = ${}", params.len()));
    }
    if let Some(value) = &search_pattern {
        params.push(value);
        let n = params.len();
        conditions.push(format!("(l.phone ILIKE ${n} OR l.name ILIKE ${n})"));
    }
    if !conditions.is_empty() {
        sql.push_str(" WHERE ");
        sql.push_str(&conditions.join(" AND "));
    }

    params.push(&limit);
    sql.push_str(&format!(" ORDER BY l.created_at DESC LIMIT ${}", params.len()));
    params.push(&offset);
    sql.push_str(&format!(" OFFSET ${}", params.len()));

    let conn = state.db.conn().await?;
    let rows = conn
        .query(sql.as_str(), &params)
        .await
        .map_err(|e| ApiError::database_error(e.to_string()))?;

    let items = rows
        .iter()
        .map(list_item_from_row)
        .collect::<ApiResult<Vec<_>>>()?;
    Ok(Json(items))
}

/// GET /api/leads/{id} - fetch one lead with its current assignment
#[utoipa::path(
    get,
    path = "/api/leads/{id}",
    tag = "Leads",
    params(("id" = Uuid, Path, description = "Lead ID")),
    responses(
        (status = 200, description = "Lead found", body = LeadResponse),
        (status = 404, description = "Lead not found", body = ApiError),
    )
)]
pub async fn get_lead(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<impl IntoResponse> {
    let lead_id = LeadId::new(id);
    let conn = state.db.conn().await?;
    let row = conn
        .query_opt(
            "SELECT l.id, l.name, l.phone, l.source_timestamp, l.lead_source, l.city, \
                    l.state, l.metadata, l.created_at, \
                    a.caller_id, a.status, a.reason \
             FROM leads l \
             LEFT JOIN assignments a ON a.lead_id = l.id AND a.status <> 'superseded' \
             WHERE l.id = $1",
            &[&lead_id.as_uuid()],
        )
        .await
        .map_err(|e| ApiError::database_error(e.to_string()))?
        .ok_or_else(|| ApiError::lead_not_found(lead_id))?;

    let status: Option<String> = row.get("status");
    let reason: Option<String> = row.get("reason");
    let response = LeadResponse {
        id: lead_id,
        name: row.get("name"),
        phone: row.get("phone"),
        lead_source: row.get("lead_source"),
        city: row.get("city"),
        state: row.get("state"),
        metadata: row.get("metadata"),
        created_at: row.get("created_at"),
        assigned_caller_id: row.get::<_, Option<Uuid>>("caller_id").map(CallerId::new),
        assignment_status: status
            .map(|s| s.parse())
            .transpose()
            .map_err(|e| ApiError::database_error(format!("{}", e)))?,
        assignment_reason: reason
            .map(|s| s.parse())
            .transpose()
            .map_err(|e| ApiError::database_error(format!("{}", e)))?,
        duplicate: false,
    };
    Ok(Json(response))
}

/// Run `reassign` in a fresh transaction with the same bounded retry as
/// ingestion.
async fn reassign_with_retry(
    state: &AppState,
    lead_id: LeadId,
    target: Option<CallerId>,
) -> ApiResult<(Lead, AssignmentOutcome)> {
    let mut attempt = 0u32;
    loop {
        attempt += 1;
        let mut conn = state.db.conn().await?;
        let result = async {
            let tx = conn.transaction().await?;
            let reassigned = state.engine.reassign(&tx, lead_id, target).await?;
            tx.commit().await?;
            Ok::<_, switchboard_engine::EngineError>(reassigned)
        }
        .await;

        match result {
            Ok(reassigned) => return Ok(reassigned),
            Err(e) if e.is_transient() && attempt < state.config.assign_retry_limit => {
                tracing::warn!(attempt, error = %e, "Transient conflict, retrying reassignment");
            }
            Err(e) => return Err(e.into()),
        }
    }
}

/// PATCH /api/leads/{id}/reassign - manually move a lead
#[utoipa::path(
    patch,
    path = "/api/leads/{id}/reassign",
    tag = "Leads",
    params(("id" = Uuid, Path, description = "Lead ID")),
    request_body = ReassignLeadRequest,
    responses(
        (status = 200, description = "Lead reassigned", body = LeadResponse),
        (status = 400, description = "Target caller not assignable", body = ApiError),
        (status = 404, description = "Lead not found", body = ApiError),
        (status = 503, description = "Transient conflict, retry", body = ApiError),
    )
)]
pub async fn reassign_lead(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<ReassignLeadRequest>,
) -> ApiResult<impl IntoResponse> {
    let lead_id = LeadId::new(id);
    let (lead, outcome) = reassign_with_retry(&state, lead_id, payload.caller_id).await?;

    state.ws.broadcast(WsEvent::assignment(&outcome));

    Ok(Json(LeadResponse::from_outcome(lead, &outcome)))
}
