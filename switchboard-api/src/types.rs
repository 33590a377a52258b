//! Request and response types for the REST API

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use switchboard_core::{
    AssignmentOutcome, AssignmentReason, AssignmentStatus, Caller, CallerId, CallerStatus, Lead,
    LeadId, NewLead, Timestamp,
};

// ============================================================================
// CALLER TYPES
// ============================================================================

/// Request body for creating a caller.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, utoipa::ToSchema)]
pub struct CreateCallerRequest {
    pub name: String,
    #[serde(default)]
    pub role: Option<String>,
    #[serde(default)]
    pub languages: Vec<String>,
    /// 0 means unlimited.
    #[serde(default)]
    pub daily_limit: i32,
    #[serde(default)]
    pub assigned_states: Vec<String>,
    #[serde(default)]
    pub status: CallerStatus,
}

/// Request body for a partial caller update. Absent fields are untouched;
/// `assigned_states`, when present, replaces the whole binding set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, utoipa::ToSchema)]
pub struct UpdateCallerRequest {
    #[serde(default)]
    pub role: Option<String>,
    #[serde(default)]
    pub languages: Option<Vec<String>>,
    #[serde(default)]
    pub daily_limit: Option<i32>,
    #[serde(default)]
    pub assigned_states: Option<Vec<String>>,
    #[serde(default)]
    pub status: Option<CallerStatus>,
}

/// Request body for flipping a caller's status.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, utoipa::ToSchema)]
pub struct UpdateCallerStatusRequest {
    pub status: CallerStatus,
}

/// Caller as returned by the API, including today's tally.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, utoipa::ToSchema)]
pub struct CallerResponse {
    #[schema(value_type = String, format = "uuid")]
    pub id: CallerId,
    pub name: String,
    pub role: Option<String>,
    pub languages: Vec<String>,
    pub daily_limit: i32,
    pub assigned_states: Vec<String>,
    pub leads_assigned_today: i64,
    pub status: CallerStatus,
}

impl CallerResponse {
    /// Build the response from the caller profile plus today's tally.
    pub fn from_caller(caller: Caller, leads_assigned_today: i64) -> Self {
        Self {
            id: caller.caller_id,
            name: caller.name,
            role: caller.role,
            languages: caller.languages,
            daily_limit: caller.daily_limit,
            assigned_states: caller.assigned_states,
            leads_assigned_today,
            status: caller.status,
        }
    }
}

// ============================================================================
// LEAD TYPES
// ============================================================================

/// Payload delivered by the ingestion automation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, utoipa::ToSchema)]
pub struct LeadWebhookRequest {
    #[serde(default)]
    pub name: Option<String>,
    pub phone: String,
    /// Capture instant from the source sheet; deduplicates with `phone`.
    #[schema(value_type = String, format = "date-time")]
    pub timestamp: Timestamp,
    #[serde(default)]
    pub lead_source: Option<String>,
    #[serde(default)]
    pub city: Option<String>,
    #[serde(default)]
    pub state: Option<String>,
    #[serde(default)]
    #[schema(value_type = Option<Object>)]
    pub metadata: Option<serde_json::Value>,
}

impl LeadWebhookRequest {
    pub fn into_new_lead(self) -> NewLead {
        NewLead {
            name: self.name,
            phone: self.phone,
            source_timestamp: self.timestamp,
            lead_source: self.lead_source,
            city: self.city,
            state: self.state,
            metadata: self.metadata,
        }
    }
}

/// Full lead view with its current assignment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, utoipa::ToSchema)]
pub struct LeadResponse {
    #[schema(value_type = String, format = "uuid")]
    pub id: LeadId,
    pub name: Option<String>,
    pub phone: String,
    pub lead_source: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    #[schema(value_type = Option<Object>)]
    pub metadata: Option<serde_json::Value>,
    #[schema(value_type = String, format = "date-time")]
    pub created_at: Timestamp,
    #[schema(value_type = Option<String>, format = "uuid")]
    pub assigned_caller_id: Option<CallerId>,
    pub assignment_status: Option<AssignmentStatus>,
    pub assignment_reason: Option<AssignmentReason>,
    /// True when this payload was a redelivery of an already-recorded lead.
    pub duplicate: bool,
}

impl LeadResponse {
    /// Build the response from the persisted lead and its outcome.
    pub fn from_outcome(lead: Lead, outcome: &AssignmentOutcome) -> Self {
        Self {
            id: lead.lead_id,
            name: lead.name,
            phone: lead.phone,
            lead_source: lead.lead_source,
            city: lead.city,
            state: lead.state,
            metadata: lead.metadata,
            created_at: lead.created_at,
            assigned_caller_id: outcome.caller_id,
            assignment_status: Some(outcome.status),
            assignment_reason: Some(outcome.reason),
            duplicate: outcome.duplicate,
        }
    }
}

/// One row of the lead list view.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, utoipa::ToSchema)]
pub struct LeadListItem {
    #[schema(value_type = String, format = "uuid")]
    pub id: LeadId,
    pub name: Option<String>,
    pub phone: String,
    pub state: Option<String>,
    pub lead_source: Option<String>,
    pub assigned_caller_name: Option<String>,
    pub assignment_status: Option<AssignmentStatus>,
    pub assignment_reason: Option<AssignmentReason>,
    #[schema(value_type = Option<String>, format = "date-time")]
    pub assigned_at: Option<Timestamp>,
}

/// Query parameters for the lead list view.
#[derive(Debug, Clone, Default, Deserialize, utoipa::IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ListLeadsQuery {
    /// Filter by lead state (normalized before matching).
    pub state: Option<String>,
    /// Filter by currently assigned caller.
    pub caller_id: Option<Uuid>,
    /// Substring match over phone and name.
    pub search: Option<String>,
    /// Page size, capped at 200 (default 50).
    pub limit: Option<i64>,
    /// Rows to skip (default 0).
    pub offset: Option<i64>,
}

/// Request body for manual reassignment. A null/absent `caller_id` re-runs
/// auto-selection with the lead's state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, utoipa::ToSchema)]
pub struct ReassignLeadRequest {
    #[serde(default)]
    #[schema(value_type = Option<String>, format = "uuid")]
    pub caller_id: Option<CallerId>,
}

// ============================================================================
// MISC TYPES
// ============================================================================

/// Current civil date in the configured business timezone.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, utoipa::ToSchema)]
pub struct BusinessDateResponse {
    #[schema(value_type = String, format = "date")]
    pub business_date: NaiveDate,
}

/// Liveness response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, utoipa::ToSchema)]
pub struct HealthResponse {
    pub status: String,
    #[schema(value_type = String, format = "date-time")]
    pub timestamp: Timestamp,
}
