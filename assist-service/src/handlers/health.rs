use axum::{extract::State, Json};
use serde_json::{json, Value};

use crate::services::get_metrics;
use crate::AppState;
use assist_core::error::AppError;

/// Liveness plus a MongoDB ping.
pub async fn health_check(State(state): State<AppState>) -> Result<Json<Value>, AppError> {
    state.db.health_check().await?;
    Ok(Json(json!({
        "status": "healthy",
        "service": "assist-service",
    })))
}

/// Prometheus exposition endpoint.
pub async fn metrics() -> String {
    get_metrics()
}
