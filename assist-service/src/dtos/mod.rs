use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::models::{ChatSession, Message, Sender, Ticket};

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

// ---------------------------------------------------------------------
// Auth
// ---------------------------------------------------------------------

#[derive(Debug, Deserialize, Validate)]
pub struct RegisterRequest {
    #[validate(length(min = 1, message = "Name is required"))]
    pub name: String,
    #[validate(email(message = "Invalid email format"))]
    pub email: String,
    #[validate(length(min = 8, message = "Password must be at least 8 characters"))]
    pub password: String,
}

#[derive(Debug, Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(email(message = "Invalid email format"))]
    pub email: String,
    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,
}

#[derive(Debug, Deserialize, Validate)]
pub struct HelpdeskLoginRequest {
    #[validate(length(min = 1, message = "Email is required"))]
    pub email: String,
    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,
}

// ---------------------------------------------------------------------
// Chat sessions
// ---------------------------------------------------------------------

/// JSON shape of an embedded message. The stored model serializes
/// timestamps as BSON dates; this mirror keeps the HTTP surface on RFC 3339.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageDto {
    pub id: String,
    pub content: String,
    pub sender: Sender,
    pub timestamp: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub confidence_score: Option<f64>,
}

impl From<MessageDto> for Message {
    fn from(dto: MessageDto) -> Self {
        Message {
            id: dto.id,
            content: dto.content,
            sender: dto.sender,
            timestamp: dto.timestamp,
            confidence_score: dto.confidence_score,
        }
    }
}

impl From<Message> for MessageDto {
    fn from(message: Message) -> Self {
        MessageDto {
            id: message.id,
            content: message.content,
            sender: message.sender,
            timestamp: message.timestamp,
            confidence_score: message.confidence_score,
        }
    }
}

#[derive(Debug, Deserialize, Validate)]
pub struct SaveSessionRequest {
    #[validate(length(min = 1, message = "Title is required"))]
    pub title: String,
    #[serde(default)]
    pub messages: Vec<MessageDto>,
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateSessionRequest {
    #[validate(length(min = 1, message = "Session ID is required"))]
    pub session_id: String,
    #[validate(length(min = 1, message = "Title is required"))]
    pub title: String,
    #[serde(default)]
    pub messages: Vec<MessageDto>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteSessionParams {
    pub session_id: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionResponse {
    pub id: String,
    pub title: String,
    pub messages: Vec<MessageDto>,
    pub last_updated: DateTime<Utc>,
}

impl From<ChatSession> for SessionResponse {
    fn from(session: ChatSession) -> Self {
        SessionResponse {
            id: session
                .id
                .map(|id| id.to_hex())
                .unwrap_or_default(),
            title: session.title,
            messages: session.messages.into_iter().map(MessageDto::from).collect(),
            last_updated: session.last_updated,
        }
    }
}

// ---------------------------------------------------------------------
// FAQ gateway
// ---------------------------------------------------------------------

#[derive(Debug, Deserialize)]
pub struct FaqRequest {
    pub message: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct FaqResponse {
    pub answer: String,
    pub confidence_score: f64,
    pub forwarded_to_helpdesk: bool,
}

// ---------------------------------------------------------------------
// Tickets
// ---------------------------------------------------------------------

/// Operator-facing projection of a ticket with a stringified id.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TicketResponse {
    pub id: String,
    pub user_id: String,
    pub user_email: String,
    pub question: String,
    pub status: String,
    pub created_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub answer: Option<String>,
}

impl From<Ticket> for TicketResponse {
    fn from(ticket: Ticket) -> Self {
        TicketResponse {
            id: ticket.id.map(|id| id.to_hex()).unwrap_or_default(),
            user_id: ticket.user_id,
            user_email: ticket.user_email,
            question: ticket.question,
            status: ticket.status.to_string(),
            created_at: ticket.created_at,
            answer: ticket.answer,
        }
    }
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateTicketRequest {
    #[validate(length(min = 1, message = "User ID is required"))]
    pub user_id: String,
    #[validate(email(message = "Invalid email format"))]
    pub user_email: String,
    #[validate(length(min = 1, message = "Question is required"))]
    pub question: String,
}

#[derive(Debug, Deserialize, Validate)]
pub struct AnswerTicketRequest {
    #[validate(length(min = 1, message = "Answer is required"))]
    pub answer: String,
}

#[derive(Debug, Deserialize)]
pub struct TicketActionParams {
    pub action: Option<String>,
}

// ---------------------------------------------------------------------
// Notifications
// ---------------------------------------------------------------------

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NotificationResponse {
    pub id: String,
    pub question: String,
    pub answer: Option<String>,
    pub answered_at: Option<DateTime<Utc>>,
    pub seen: bool,
}

impl From<Ticket> for NotificationResponse {
    fn from(ticket: Ticket) -> Self {
        NotificationResponse {
            id: ticket.id.map(|id| id.to_hex()).unwrap_or_default(),
            question: ticket.question,
            answer: ticket.answer,
            answered_at: ticket.answered_at,
            seen: ticket.seen.unwrap_or(false),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MarkSeenRequest {
    pub ticket_id: Option<String>,
}
