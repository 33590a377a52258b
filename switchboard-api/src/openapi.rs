//! OpenAPI Documentation
//!
//! Aggregates route annotations and schemas into one document served at
//! `/openapi.json`.

use utoipa::OpenApi;

use switchboard_core::{AssignmentReason, AssignmentStatus, CallerStatus};

use crate::error::{ApiError, ErrorCode};
use crate::events::AssignmentEvent;
use crate::types::{
    BusinessDateResponse, CallerResponse, CreateCallerRequest, HealthResponse, LeadListItem,
    LeadResponse, LeadWebhookRequest, ReassignLeadRequest, UpdateCallerRequest,
    UpdateCallerStatusRequest,
};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Switchboard API",
        description = "Sales-lead routing: webhook ingestion, transactional \
                       caller assignment, and dashboard fan-out.",
    ),
    paths(
        crate::routes::webhook::lead_webhook,
        crate::routes::leads::list_leads,
        crate::routes::leads::get_lead,
        crate::routes::leads::reassign_lead,
        crate::routes::callers::create_caller,
        crate::routes::callers::list_callers,
        crate::routes::callers::update_caller,
        crate::routes::callers::update_caller_status,
        crate::routes::callers::delete_caller,
        crate::routes::health::health,
        crate::routes::health::business_date,
    ),
    components(schemas(
        ApiError,
        ErrorCode,
        AssignmentEvent,
        AssignmentReason,
        AssignmentStatus,
        CallerStatus,
        BusinessDateResponse,
        CallerResponse,
        CreateCallerRequest,
        HealthResponse,
        LeadListItem,
        LeadResponse,
        LeadWebhookRequest,
        ReassignLeadRequest,
        UpdateCallerRequest,
        UpdateCallerStatusRequest,
    )),
    tags(
        (name = "Webhook", description = "Lead ingestion"),
        (name = "Leads", description = "Lead queries and manual reassignment"),
        (name = "Callers", description = "Caller administration"),
        (name = "Health", description = "Service health"),
    )
)]
pub struct ApiDoc;
