//! Dashboard Event Types
//!
//! Events broadcast over WebSocket to connected dashboard clients. The
//! frame shape is `{"type": "assignment", "payload": {...}}`.

use serde::{Deserialize, Serialize};

use switchboard_core::{
    AssignmentOutcome, AssignmentReason, AssignmentStatus, CallerId, LeadId, Timestamp,
};

/// Payload of an assignment event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, utoipa::ToSchema)]
pub struct AssignmentEvent {
    #[schema(value_type = String, format = "uuid")]
    pub lead_id: LeadId,
    #[schema(value_type = Option<String>, format = "uuid")]
    pub caller_id: Option<CallerId>,
    pub caller_name: Option<String>,
    pub assignment_status: AssignmentStatus,
    pub assignment_reason: AssignmentReason,
    #[schema(value_type = String, format = "date-time")]
    pub timestamp: Timestamp,
}

/// WebSocket event envelope.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload", rename_all = "snake_case")]
pub enum WsEvent {
    /// A lead was assigned (or persisted unassigned).
    Assignment(AssignmentEvent),
}

impl WsEvent {
    /// Build an assignment event from a committed engine outcome.
    pub fn assignment(outcome: &AssignmentOutcome) -> Self {
        WsEvent::Assignment(AssignmentEvent {
            lead_id: outcome.lead_id,
            caller_id: outcome.caller_id,
            caller_name: outcome.caller_name.clone(),
            assignment_status: outcome.status,
            assignment_reason: outcome.reason,
            timestamp: outcome.assigned_at,
        })
    }

    /// Get the event type as a string for logging.
    pub fn event_type(&self) -> &'static str {
        match self {
            WsEvent::Assignment { .. } => "assignment",
        }
    }
}
