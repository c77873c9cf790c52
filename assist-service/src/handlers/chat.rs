use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use mongodb::bson::oid::ObjectId;

use crate::dtos::{
    DeleteSessionParams, MessageResponse, SaveSessionRequest, SessionResponse,
    UpdateSessionRequest,
};
use crate::middleware::AuthUser;
use crate::models::Message;
use crate::utils::ValidatedJson;
use crate::AppState;
use assist_core::error::AppError;

fn parse_session_id(raw: &str) -> Result<ObjectId, AppError> {
    ObjectId::parse_str(raw)
        .map_err(|_| AppError::BadRequest(anyhow::anyhow!("Invalid session ID format")))
}

fn parse_user_id(claims_sub: &str) -> Result<ObjectId, AppError> {
    // The subject is issued from a stored ObjectId; a non-parsing subject
    // means a token from another deployment.
    ObjectId::parse_str(claims_sub)
        .map_err(|_| AppError::Unauthorized(anyhow::anyhow!("Authentication required")))
}

/// GET /chat/sessions
pub async fn list_sessions(
    State(state): State<AppState>,
    AuthUser(claims): AuthUser,
) -> Result<Json<serde_json::Value>, AppError> {
    let user_id = parse_user_id(&claims.sub)?;
    let sessions = state.db.list_sessions(user_id).await?;
    let sessions: Vec<SessionResponse> =
        sessions.into_iter().map(SessionResponse::from).collect();
    Ok(Json(serde_json::json!({ "sessions": sessions })))
}

/// GET /chat/sessions/:id
pub async fn get_session(
    State(state): State<AppState>,
    AuthUser(claims): AuthUser,
    Path(id): Path<String>,
) -> Result<Json<serde_json::Value>, AppError> {
    let user_id = parse_user_id(&claims.sub)?;
    let session_id = parse_session_id(&id)?;
    let session = state
        .db
        .find_session(user_id, session_id)
        .await?
        .ok_or_else(|| AppError::NotFound(anyhow::anyhow!("Chat session not found")))?;
    Ok(Json(serde_json::json!({
        "session": SessionResponse::from(session)
    })))
}

/// POST /chat/sessions
///
/// Save-by-title: repeated saves under the same title update one session in
/// place instead of accumulating copies.
pub async fn save_session(
    State(state): State<AppState>,
    AuthUser(claims): AuthUser,
    ValidatedJson(payload): ValidatedJson<SaveSessionRequest>,
) -> Result<Response, AppError> {
    let user_id = parse_user_id(&claims.sub)?;
    let messages: Vec<Message> = payload.messages.into_iter().map(Message::from).collect();
    let session = state
        .db
        .create_or_update_session(user_id, &payload.title, messages)
        .await?;
    Ok((
        StatusCode::OK,
        Json(serde_json::json!({ "session": SessionResponse::from(session) })),
    )
        .into_response())
}

/// PUT /chat/sessions
pub async fn update_session(
    State(state): State<AppState>,
    AuthUser(claims): AuthUser,
    ValidatedJson(payload): ValidatedJson<UpdateSessionRequest>,
) -> Result<Json<MessageResponse>, AppError> {
    let user_id = parse_user_id(&claims.sub)?;
    let session_id = parse_session_id(&payload.session_id)?;
    let messages: Vec<Message> = payload.messages.into_iter().map(Message::from).collect();
    state
        .db
        .rename_and_update_session(user_id, session_id, &payload.title, messages)
        .await?;
    Ok(Json(MessageResponse {
        message: "Chat session updated successfully".to_string(),
    }))
}

/// DELETE /chat/sessions?sessionId=...
pub async fn delete_session(
    State(state): State<AppState>,
    AuthUser(claims): AuthUser,
    Query(params): Query<DeleteSessionParams>,
) -> Result<Json<MessageResponse>, AppError> {
    let user_id = parse_user_id(&claims.sub)?;
    let raw_id = params
        .session_id
        .ok_or_else(|| AppError::BadRequest(anyhow::anyhow!("Session ID is required")))?;
    let session_id = parse_session_id(&raw_id)?;
    state.db.delete_session(user_id, session_id).await?;
    Ok(Json(MessageResponse {
        message: "Chat session deleted successfully".to_string(),
    }))
}
