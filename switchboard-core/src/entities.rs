//! Core entity structures

use crate::{
    AssignmentId, AssignmentReason, AssignmentStatus, CallerId, CallerStatus, LeadId, Timestamp,
};
use serde::{Deserialize, Serialize};

/// Caller - a human sales agent who receives leads.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct Caller {
    #[cfg_attr(feature = "openapi", schema(value_type = String, format = "uuid"))]
    pub caller_id: CallerId,
    pub name: String,
    pub role: Option<String>,
    pub languages: Vec<String>,
    /// Upper bound on assignments per business date; 0 means unlimited.
    pub daily_limit: i32,
    /// States this caller is bound to; empty means global only.
    pub assigned_states: Vec<String>,
    pub status: CallerStatus,
    #[cfg_attr(feature = "openapi", schema(value_type = String, format = "date-time"))]
    pub created_at: Timestamp,
    #[cfg_attr(feature = "openapi", schema(value_type = String, format = "date-time"))]
    pub updated_at: Timestamp,
}

/// Lead - an inbound sales prospect record. Immutable after ingestion.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct Lead {
    #[cfg_attr(feature = "openapi", schema(value_type = String, format = "uuid"))]
    pub lead_id: LeadId,
    pub name: Option<String>,
    pub phone: String,
    /// Capture instant reported by the ingesting automation; together with
    /// `phone` this forms the natural dedup key.
    #[cfg_attr(feature = "openapi", schema(value_type = String, format = "date-time"))]
    pub source_timestamp: Timestamp,
    pub lead_source: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    #[cfg_attr(feature = "openapi", schema(value_type = Option<Object>))]
    pub metadata: Option<serde_json::Value>,
    #[cfg_attr(feature = "openapi", schema(value_type = String, format = "date-time"))]
    pub created_at: Timestamp,
}

/// Validated lead payload handed to the engine by the transport layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct NewLead {
    pub name: Option<String>,
    pub phone: String,
    #[cfg_attr(feature = "openapi", schema(value_type = String, format = "date-time"))]
    pub source_timestamp: Timestamp,
    pub lead_source: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    #[cfg_attr(feature = "openapi", schema(value_type = Option<Object>))]
    pub metadata: Option<serde_json::Value>,
}

/// Assignment - the decision binding a lead to a caller (or marking it
/// unassigned).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct Assignment {
    #[cfg_attr(feature = "openapi", schema(value_type = String, format = "uuid"))]
    pub assignment_id: AssignmentId,
    #[cfg_attr(feature = "openapi", schema(value_type = String, format = "uuid"))]
    pub lead_id: LeadId,
    #[cfg_attr(feature = "openapi", schema(value_type = Option<String>, format = "uuid"))]
    pub caller_id: Option<CallerId>,
    #[cfg_attr(feature = "openapi", schema(value_type = String, format = "date-time"))]
    pub assigned_at: Timestamp,
    pub reason: AssignmentReason,
    pub status: AssignmentStatus,
}

/// Result of running the assignment engine for one lead.
///
/// Returned synchronously to the transport and handed to the event
/// broadcaster after commit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct AssignmentOutcome {
    #[cfg_attr(feature = "openapi", schema(value_type = String, format = "uuid"))]
    pub lead_id: LeadId,
    #[cfg_attr(feature = "openapi", schema(value_type = Option<String>, format = "uuid"))]
    pub caller_id: Option<CallerId>,
    /// Display name of the receiving caller, for event emission.
    pub caller_name: Option<String>,
    pub status: AssignmentStatus,
    pub reason: AssignmentReason,
    #[cfg_attr(feature = "openapi", schema(value_type = String, format = "date-time"))]
    pub assigned_at: Timestamp,
    /// True when the lead already existed and the previously committed
    /// outcome was returned unchanged.
    pub duplicate: bool,
}
