use chrono::{DateTime, Utc};
use mongodb::bson::oid::ObjectId;
use serde::{Deserialize, Serialize};

/// Append-only knowledge-base record of a human-provided answer.
///
/// Keyed by the originating ticket so the write can be replayed
/// idempotently if the answer/append pair partially fails.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FaqEntry {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub ticket_id: ObjectId,
    pub question: String,
    pub answer: String,
    pub source: String,
    #[serde(with = "mongodb::bson::serde_helpers::chrono_datetime_as_bson_datetime")]
    pub created_at: DateTime<Utc>,
}

impl FaqEntry {
    pub fn from_helpdesk(ticket_id: ObjectId, question: String, answer: String) -> Self {
        Self {
            id: None,
            ticket_id,
            question,
            answer,
            source: "helpdesk".to_string(),
            created_at: Utc::now(),
        }
    }
}
