use axum::response::Json;
use tracing::debug;

use crate::models::HealthResponse;

/// Liveness probe; reports ok whenever the server is answering.
pub async fn health_handler() -> Json<HealthResponse> {
    debug!("Health check requested");
    Json(HealthResponse::ok())
}
