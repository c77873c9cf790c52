use axum::{
    extract::State,
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use chrono::Local;
use serde_json::json;

use crate::dtos::HelpdeskLoginRequest;
use crate::middleware::{HelpdeskOperator, HELPDESK_COOKIE};
use crate::services::{compute_stats, TicketStats};
use crate::utils::{clear_cookie, session_cookie, ValidatedJson};
use crate::AppState;
use assist_core::error::AppError;

/// POST /helpdesk/login
///
/// Single shared operator credential from configuration; no operator
/// accounts exist in the database.
pub async fn login(
    State(state): State<AppState>,
    ValidatedJson(payload): ValidatedJson<HelpdeskLoginRequest>,
) -> Result<Response, AppError> {
    if payload.email != state.config.helpdesk.email
        || payload.password != state.config.helpdesk.password
    {
        return Err(AppError::Unauthorized(anyhow::anyhow!(
            "Invalid credentials"
        )));
    }

    let token = state.jwt.issue_helpdesk_token()?;
    let max_age = state.config.jwt.helpdesk_token_expiry_hours * 60 * 60;

    let mut response = (
        StatusCode::OK,
        Json(json!({ "message": "Login successful" })),
    )
        .into_response();
    response.headers_mut().append(
        header::SET_COOKIE,
        session_cookie(HELPDESK_COOKIE, &token, max_age)
            .parse()
            .map_err(|e| AppError::InternalError(anyhow::anyhow!("invalid cookie value: {}", e)))?,
    );
    Ok(response)
}

/// GET /helpdesk/auth
pub async fn auth_status(
    HelpdeskOperator(_claims): HelpdeskOperator,
) -> Json<serde_json::Value> {
    Json(json!({ "authenticated": true }))
}

/// POST /helpdesk/logout
pub async fn logout() -> Result<Response, AppError> {
    let mut response = (
        StatusCode::OK,
        Json(json!({ "message": "Logged out successfully" })),
    )
        .into_response();
    response.headers_mut().append(
        header::SET_COOKIE,
        clear_cookie(HELPDESK_COOKIE)
            .parse()
            .map_err(|e| AppError::InternalError(anyhow::anyhow!("invalid cookie value: {}", e)))?,
    );
    Ok(response)
}

/// GET /helpdesk/queries/stats
///
/// Aggregates over a full snapshot of the ticket collection on every call.
pub async fn stats(State(state): State<AppState>) -> Result<Json<TicketStats>, AppError> {
    let tickets = state.db.all_tickets().await?;
    Ok(Json(compute_stats(&tickets, Local::now())))
}
