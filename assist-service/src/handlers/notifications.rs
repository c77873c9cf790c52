use axum::{extract::State, Json};
use mongodb::bson::oid::ObjectId;
use serde_json::json;

use crate::dtos::{MarkSeenRequest, NotificationResponse};
use crate::middleware::AuthUser;
use crate::AppState;
use assist_core::error::AppError;

/// GET /user/notifications
///
/// Answered tickets for the requesting user, newest answer first. The read
/// receipt (`seen`) lets the client badge unread answers.
pub async fn list_notifications(
    State(state): State<AppState>,
    AuthUser(claims): AuthUser,
) -> Result<Json<serde_json::Value>, AppError> {
    let tickets = state.db.list_answered_tickets(&claims.sub).await?;
    let tickets: Vec<NotificationResponse> =
        tickets.into_iter().map(NotificationResponse::from).collect();
    Ok(Json(json!({ "tickets": tickets })))
}

/// PUT /user/notifications
pub async fn mark_seen(
    State(state): State<AppState>,
    AuthUser(claims): AuthUser,
    Json(payload): Json<MarkSeenRequest>,
) -> Result<Json<serde_json::Value>, AppError> {
    let raw_id = payload
        .ticket_id
        .ok_or_else(|| AppError::BadRequest(anyhow::anyhow!("Ticket ID is required")))?;
    let ticket_id = ObjectId::parse_str(&raw_id)
        .map_err(|_| AppError::BadRequest(anyhow::anyhow!("Invalid ticket ID format")))?;
    state.db.mark_ticket_seen(ticket_id, &claims.sub).await?;
    Ok(Json(json!({ "success": true })))
}
