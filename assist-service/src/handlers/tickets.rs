use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use mongodb::bson::oid::ObjectId;
use serde_json::json;

use crate::dtos::{AnswerTicketRequest, CreateTicketRequest, TicketActionParams, TicketResponse};
use crate::models::Ticket;
use crate::services::record_ticket_action;
use crate::utils::ValidatedJson;
use crate::AppState;
use assist_core::error::AppError;

fn parse_ticket_id(raw: &str) -> Result<ObjectId, AppError> {
    ObjectId::parse_str(raw)
        .map_err(|_| AppError::BadRequest(anyhow::anyhow!("Invalid ticket ID format")))
}

/// GET /helpdesk/tickets
pub async fn list_tickets(
    State(state): State<AppState>,
) -> Result<Json<serde_json::Value>, AppError> {
    let tickets = state.db.list_tickets().await?;
    let tickets: Vec<TicketResponse> = tickets.into_iter().map(TicketResponse::from).collect();
    Ok(Json(json!({ "tickets": tickets })))
}

/// POST /helpdesk/tickets
///
/// Manual ticket entry for questions arriving outside the chat flow.
pub async fn create_ticket(
    State(state): State<AppState>,
    ValidatedJson(payload): ValidatedJson<CreateTicketRequest>,
) -> Result<Response, AppError> {
    let mut ticket = Ticket::new(
        payload.user_id,
        payload.user_email,
        None,
        payload.question,
        None,
    );
    let ticket_id = state.db.insert_ticket(&ticket).await?;
    ticket.id = Some(ticket_id);
    record_ticket_action("created");
    tracing::info!(ticket_id = %ticket_id, "ticket created manually");

    Ok((
        StatusCode::CREATED,
        Json(json!({ "ticket": TicketResponse::from(ticket) })),
    )
        .into_response())
}

/// POST /helpdesk/tickets/:id
///
/// Records the answer on the ticket and upserts it into the knowledge base
/// so the answering model can serve it next time.
pub async fn answer_ticket(
    State(state): State<AppState>,
    Path(id): Path<String>,
    ValidatedJson(payload): ValidatedJson<AnswerTicketRequest>,
) -> Result<Json<serde_json::Value>, AppError> {
    let ticket_id = parse_ticket_id(&id)?;
    state.db.answer_ticket(ticket_id, &payload.answer).await?;
    record_ticket_action("answered");
    tracing::info!(ticket_id = %ticket_id, "ticket answered");
    Ok(Json(json!({ "message": "Ticket answered successfully" })))
}

/// DELETE /helpdesk/tickets/:id?action=remove|reject
///
/// `remove` deletes the document outright; anything else is the default
/// reject, which keeps the ticket for the analytics trail.
pub async fn close_ticket(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Query(params): Query<TicketActionParams>,
) -> Result<Json<serde_json::Value>, AppError> {
    let ticket_id = parse_ticket_id(&id)?;
    if params.action.as_deref() == Some("remove") {
        state.db.delete_ticket(ticket_id).await?;
        record_ticket_action("removed");
        tracing::info!(ticket_id = %ticket_id, "ticket removed");
        Ok(Json(json!({ "message": "Ticket permanently deleted" })))
    } else {
        state.db.reject_ticket(ticket_id).await?;
        record_ticket_action("rejected");
        tracing::info!(ticket_id = %ticket_id, "ticket rejected");
        Ok(Json(json!({ "message": "Ticket rejected successfully" })))
    }
}
