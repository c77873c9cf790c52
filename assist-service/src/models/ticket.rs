use chrono::{DateTime, Utc};
use mongodb::bson::oid::ObjectId;
use serde::{Deserialize, Serialize};

use super::opt_chrono_datetime_as_bson_datetime;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "snake_case")]
pub enum TicketStatus {
    Pending,
    InProgress,
    Answered,
    Rejected,
}

impl std::fmt::Display for TicketStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TicketStatus::Pending => write!(f, "pending"),
            TicketStatus::InProgress => write!(f, "in_progress"),
            TicketStatus::Answered => write!(f, "answered"),
            TicketStatus::Rejected => write!(f, "rejected"),
        }
    }
}

/// Support ticket raised when the FAQ model is not confident enough, or
/// created directly by an operator.
///
/// Status lifecycle: `pending -> {answered, rejected}`; both are terminal.
/// Hard delete removes the document outright and is distinct from rejection.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Ticket {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub user_id: String,
    pub user_email: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_name: Option<String>,
    pub question: String,
    pub status: TicketStatus,
    #[serde(with = "mongodb::bson::serde_helpers::chrono_datetime_as_bson_datetime")]
    pub created_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub answer: Option<String>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        with = "opt_chrono_datetime_as_bson_datetime"
    )]
    pub answered_at: Option<DateTime<Utc>>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        with = "opt_chrono_datetime_as_bson_datetime"
    )]
    pub rejected_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub confidence_score: Option<f64>,
    /// Consumer-side read receipt for the notification feed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seen: Option<bool>,
}

impl Ticket {
    pub fn new(
        user_id: String,
        user_email: String,
        user_name: Option<String>,
        question: String,
        confidence_score: Option<f64>,
    ) -> Self {
        Self {
            id: None,
            user_id,
            user_email,
            user_name,
            question,
            status: TicketStatus::Pending,
            created_at: Utc::now(),
            answer: None,
            answered_at: None,
            rejected_at: None,
            confidence_score,
            seen: None,
        }
    }

    pub fn mark_answered(&mut self, answer: String) {
        self.status = TicketStatus::Answered;
        self.answer = Some(answer);
        self.answered_at = Some(Utc::now());
    }

    pub fn mark_rejected(&mut self) {
        self.status = TicketStatus::Rejected;
        self.rejected_at = Some(Utc::now());
    }
}
