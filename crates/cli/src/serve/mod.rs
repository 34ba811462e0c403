//! `hrdesk serve` -- HTTP JSON API over the HR desk store.
//!
//! Endpoints:
//! - GET  /health                         - Server status (exempt from auth)
//! - GET  /tickets                        - List tickets (`category`, `status` filters)
//! - POST /tickets                        - Open a ticket
//! - GET  /tickets/{id}                   - One ticket
//! - POST /tickets/{id}/status            - Change ticket status
//! - POST /tickets/{id}/pause             - Open a stop-clock interval
//! - POST /tickets/{id}/resume            - Close the latest open interval
//! - GET  /tickets/{id}/sla               - Effective hours against the SLA target
//! - GET  /requisitions                   - List requisitions
//! - POST /requisitions                   - Open a requisition
//! - POST /requisitions/{id}/milestones   - Record a pipeline milestone
//! - POST /surveys                        - Submit an eNPS response
//! - GET  /kpis                           - KPI report
//!
//! All responses use Content-Type: application/json.

mod handlers;
mod middleware;
mod state;

use std::sync::Arc;

use axum::extract::DefaultBodyLimit;
use axum::http::{Method, StatusCode};
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{middleware as axum_middleware, Json, Router};
use hrdesk_storage::{HrStorage, JsonFileStorage};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::config::Settings;

use self::handlers::{
    handle_create_requisition, handle_create_ticket, handle_get_ticket, handle_health,
    handle_kpis, handle_list_requisitions, handle_list_tickets, handle_not_found, handle_pause,
    handle_record_milestone, handle_resume, handle_submit_survey, handle_ticket_sla,
    handle_update_status,
};
use self::middleware::auth_middleware;
use self::state::AppState;

/// Maximum request body size: 1 MB.
const MAX_BODY_SIZE: usize = 1024 * 1024;

/// Construct a JSON error response with the given status code and message.
fn json_error(status: StatusCode, message: &str) -> impl IntoResponse {
    (status, Json(serde_json::json!({"error": message})))
}

/// Build the router over any storage backend.
pub(crate) fn router(storage: Arc<dyn HrStorage>, api_key: Option<String>) -> Router {
    let state = Arc::new(AppState::new(storage, api_key));

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST])
        .allow_headers(Any);

    Router::new()
        .route("/health", get(handle_health))
        .route("/tickets", get(handle_list_tickets).post(handle_create_ticket))
        .route("/tickets/{id}", get(handle_get_ticket))
        .route("/tickets/{id}/status", post(handle_update_status))
        .route("/tickets/{id}/pause", post(handle_pause))
        .route("/tickets/{id}/resume", post(handle_resume))
        .route("/tickets/{id}/sla", get(handle_ticket_sla))
        .route(
            "/requisitions",
            get(handle_list_requisitions).post(handle_create_requisition),
        )
        .route("/requisitions/{id}/milestones", post(handle_record_milestone))
        .route("/surveys", post(handle_submit_survey))
        .route("/kpis", get(handle_kpis))
        .fallback(handle_not_found)
        .layer(axum_middleware::from_fn_with_state(
            state.clone(),
            auth_middleware,
        ))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .layer(DefaultBodyLimit::max(MAX_BODY_SIZE))
        .with_state(state)
}

/// Open the JSON store and serve until Ctrl+C.
pub async fn start_server(settings: Settings) -> Result<(), Box<dyn std::error::Error>> {
    let storage = JsonFileStorage::open(&settings.data_dir).await?;

    if settings.api_key.is_some() {
        info!("API key authentication enabled");
    }

    let app = router(Arc::new(storage), settings.api_key);

    let addr = format!("0.0.0.0:{}", settings.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!(
        port = settings.port,
        data_dir = %settings.data_dir.display(),
        "hrdesk listening on http://{}",
        addr
    );
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("server shut down");
    Ok(())
}

/// Wait for a shutdown signal (Ctrl+C).
async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!(error = %e, "could not install Ctrl+C handler");
        std::future::pending::<()>().await;
    }
    info!("received shutdown signal");
}
