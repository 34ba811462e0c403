//! HTTP route handlers.

use std::sync::Arc;

use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use hrdesk_core::{
    id, Milestone, Requisition, SurveyResponse, Ticket, TicketCategory, TicketStatus,
};
use hrdesk_kpi::{compute_snapshot_report, snapshot_sla_status};
use hrdesk_storage::{StorageError, TicketFilter};
use serde::Deserialize;
use time::OffsetDateTime;
use tracing::{error, info};

use super::json_error;
use super::state::AppState;

// ── Request bodies ────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct CreateTicketRequest {
    category: TicketCategory,
    title: String,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    requester: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct StatusRequest {
    status: TicketStatus,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct PauseRequest {
    #[serde(default)]
    reason: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct CreateRequisitionRequest {
    ticket_id: String,
    #[serde(default)]
    key_role: bool,
}

#[derive(Debug, Deserialize)]
pub(crate) struct MilestoneRequest {
    milestone: String,
    /// Defaults to the request time.
    #[serde(default, with = "time::serde::rfc3339::option")]
    at: Option<OffsetDateTime>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct SurveyRequest {
    score: i64,
    #[serde(default)]
    comment: Option<String>,
}

// ── Error mapping ─────────────────────────────────────────────────────────────

fn storage_error(err: StorageError) -> Response {
    let status = match &err {
        StorageError::TicketNotFound { .. } | StorageError::RequisitionNotFound { .. } => {
            StatusCode::NOT_FOUND
        }
        StorageError::DuplicateId { .. } => StatusCode::CONFLICT,
        StorageError::InvalidRecord(_) => StatusCode::BAD_REQUEST,
        StorageError::Io { .. } | StorageError::Serialization { .. } => {
            error!(error = %err, "storage failure");
            StatusCode::INTERNAL_SERVER_ERROR
        }
    };
    json_error(status, &err.to_string()).into_response()
}

fn bad_body(rejection: JsonRejection) -> Response {
    json_error(StatusCode::BAD_REQUEST, &rejection.body_text()).into_response()
}

// ── Handlers ──────────────────────────────────────────────────────────────────

/// Fallback handler for unmatched routes.
pub(crate) async fn handle_not_found() -> impl IntoResponse {
    json_error(StatusCode::NOT_FOUND, "not found")
}

/// GET /health
pub(crate) async fn handle_health() -> impl IntoResponse {
    let response = serde_json::json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
    });
    (StatusCode::OK, Json(response))
}

/// GET /tickets
pub(crate) async fn handle_list_tickets(
    State(state): State<Arc<AppState>>,
    query: Result<Query<TicketFilter>, QueryRejection>,
) -> Response {
    let Query(filter) = match query {
        Ok(q) => q,
        Err(rejection) => {
            return json_error(StatusCode::BAD_REQUEST, &rejection.body_text()).into_response()
        }
    };
    match state.storage.list_tickets(filter).await {
        Ok(tickets) => (StatusCode::OK, Json(tickets)).into_response(),
        Err(e) => storage_error(e),
    }
}

/// POST /tickets
pub(crate) async fn handle_create_ticket(
    State(state): State<Arc<AppState>>,
    body: Result<Json<CreateTicketRequest>, JsonRejection>,
) -> Response {
    let Json(req) = match body {
        Ok(b) => b,
        Err(rejection) => return bad_body(rejection),
    };
    let now = OffsetDateTime::now_utc();

    let ticket_id = id::generate(id::TICKET_PREFIX);
    let mut ticket = match Ticket::open(ticket_id, req.category, req.title, now) {
        Ok(t) => t,
        Err(e) => return json_error(StatusCode::BAD_REQUEST, &e.to_string()).into_response(),
    };
    ticket.description = req.description.filter(|d| !d.trim().is_empty());
    ticket.requester = req.requester;

    match state.storage.insert_ticket(ticket.clone()).await {
        Ok(()) => {
            info!(ticket_id = %ticket.id, category = %ticket.category, "ticket opened");
            (StatusCode::CREATED, Json(ticket)).into_response()
        }
        Err(e) => storage_error(e),
    }
}

/// GET /tickets/{id}
pub(crate) async fn handle_get_ticket(
    State(state): State<Arc<AppState>>,
    Path(ticket_id): Path<String>,
) -> Response {
    match state.storage.get_ticket(&ticket_id).await {
        Ok(ticket) => (StatusCode::OK, Json(ticket)).into_response(),
        Err(e) => storage_error(e),
    }
}

/// POST /tickets/{id}/status
pub(crate) async fn handle_update_status(
    State(state): State<Arc<AppState>>,
    Path(ticket_id): Path<String>,
    body: Result<Json<StatusRequest>, JsonRejection>,
) -> Response {
    let Json(req) = match body {
        Ok(b) => b,
        Err(rejection) => return bad_body(rejection),
    };
    let now = OffsetDateTime::now_utc();
    match state
        .storage
        .update_ticket_status(&ticket_id, req.status, now)
        .await
    {
        Ok(ticket) => {
            info!(ticket_id = %ticket.id, status = %ticket.status, "ticket status changed");
            (StatusCode::OK, Json(ticket)).into_response()
        }
        Err(e) => storage_error(e),
    }
}

/// POST /tickets/{id}/pause
///
/// The body is optional; a missing body means an empty reason.
pub(crate) async fn handle_pause(
    State(state): State<Arc<AppState>>,
    Path(ticket_id): Path<String>,
    body: Result<Json<PauseRequest>, JsonRejection>,
) -> Response {
    let req = match body {
        Ok(Json(req)) => req,
        Err(JsonRejection::MissingJsonContentType(_)) => PauseRequest::default(),
        Err(rejection) => return bad_body(rejection),
    };
    let now = OffsetDateTime::now_utc();
    match state.storage.pause_clock(&ticket_id, &req.reason, now).await {
        Ok(stop) => {
            info!(ticket_id = %ticket_id, stop_id = %stop.id, "stop clock paused");
            (StatusCode::CREATED, Json(stop)).into_response()
        }
        Err(e) => storage_error(e),
    }
}

/// POST /tickets/{id}/resume
pub(crate) async fn handle_resume(
    State(state): State<Arc<AppState>>,
    Path(ticket_id): Path<String>,
) -> Response {
    let now = OffsetDateTime::now_utc();
    match state.storage.resume_clock(&ticket_id, now).await {
        Ok(Some(stop)) => {
            info!(ticket_id = %ticket_id, stop_id = %stop.id, "stop clock resumed");
            (StatusCode::OK, Json(stop)).into_response()
        }
        Ok(None) => (StatusCode::OK, Json(serde_json::json!({ "resumed": null }))).into_response(),
        Err(e) => storage_error(e),
    }
}

/// GET /tickets/{id}/sla
pub(crate) async fn handle_ticket_sla(
    State(state): State<Arc<AppState>>,
    Path(ticket_id): Path<String>,
) -> Response {
    let now = OffsetDateTime::now_utc();
    let snapshot = match state.storage.snapshot().await {
        Ok(s) => s,
        Err(e) => return storage_error(e),
    };
    match snapshot_sla_status(&snapshot, &ticket_id, now) {
        Some(status) => (StatusCode::OK, Json(status)).into_response(),
        None => storage_error(StorageError::TicketNotFound { ticket_id }),
    }
}

/// GET /requisitions
pub(crate) async fn handle_list_requisitions(State(state): State<Arc<AppState>>) -> Response {
    match state.storage.list_requisitions().await {
        Ok(reqs) => (StatusCode::OK, Json(reqs)).into_response(),
        Err(e) => storage_error(e),
    }
}

/// POST /requisitions
pub(crate) async fn handle_create_requisition(
    State(state): State<Arc<AppState>>,
    body: Result<Json<CreateRequisitionRequest>, JsonRejection>,
) -> Response {
    let Json(req) = match body {
        Ok(b) => b,
        Err(rejection) => return bad_body(rejection),
    };
    if req.ticket_id.trim().is_empty() {
        return json_error(StatusCode::BAD_REQUEST, "ticketId must not be empty").into_response();
    }
    let requisition = Requisition::new(
        id::generate(id::REQUISITION_PREFIX),
        req.ticket_id,
        req.key_role,
    );
    match state.storage.insert_requisition(requisition.clone()).await {
        Ok(()) => {
            info!(
                requisition_id = %requisition.id,
                ticket_id = %requisition.ticket_id,
                "requisition opened"
            );
            (StatusCode::CREATED, Json(requisition)).into_response()
        }
        Err(e) => storage_error(e),
    }
}

/// POST /requisitions/{id}/milestones
pub(crate) async fn handle_record_milestone(
    State(state): State<Arc<AppState>>,
    Path(requisition_id): Path<String>,
    body: Result<Json<MilestoneRequest>, JsonRejection>,
) -> Response {
    let Json(req) = match body {
        Ok(b) => b,
        Err(rejection) => return bad_body(rejection),
    };
    let milestone: Milestone = match req.milestone.parse() {
        Ok(m) => m,
        Err(e) => return json_error(StatusCode::BAD_REQUEST, &e.to_string()).into_response(),
    };
    let at = req.at.unwrap_or_else(OffsetDateTime::now_utc);
    match state
        .storage
        .record_milestone(&requisition_id, milestone, at)
        .await
    {
        Ok(requisition) => (StatusCode::OK, Json(requisition)).into_response(),
        Err(e) => storage_error(e),
    }
}

/// POST /surveys
pub(crate) async fn handle_submit_survey(
    State(state): State<Arc<AppState>>,
    body: Result<Json<SurveyRequest>, JsonRejection>,
) -> Response {
    let Json(req) = match body {
        Ok(b) => b,
        Err(rejection) => return bad_body(rejection),
    };
    let response = match SurveyResponse::new(req.score, req.comment) {
        Ok(r) => r,
        Err(e) => return json_error(StatusCode::BAD_REQUEST, &e.to_string()).into_response(),
    };
    match state.storage.insert_survey_response(response.clone()).await {
        Ok(()) => (StatusCode::CREATED, Json(response)).into_response(),
        Err(e) => storage_error(e),
    }
}

/// GET /kpis
pub(crate) async fn handle_kpis(State(state): State<Arc<AppState>>) -> Response {
    let now = OffsetDateTime::now_utc();
    match state.storage.snapshot().await {
        Ok(snapshot) => {
            let report = compute_snapshot_report(&snapshot, now);
            (StatusCode::OK, Json(report)).into_response()
        }
        Err(e) => storage_error(e),
    }
}
