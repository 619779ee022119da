//! Liveness endpoint.

use axum::{http::StatusCode, routing::get, Router};

use crate::state::AppState;

/// Create health routes.
pub fn health_routes() -> Router<AppState> {
    Router::new().route("/heartbeat", get(heartbeat))
}

/// Report that the process is up.
#[utoipa::path(
    get,
    path = "/api/heartbeat",
    tag = "Health",
    responses(
        (status = 204, description = "Service is alive")
    )
)]
pub async fn heartbeat() -> StatusCode {
    StatusCode::NO_CONTENT
}
