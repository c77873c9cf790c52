use assist_core::error::AppError;
use async_trait::async_trait;
use mongodb::bson::oid::ObjectId;
use serde::Deserialize;
use serde_json::json;
use std::time::Duration;

use crate::config::FaqConfig;
use crate::models::Ticket;
use crate::services::database::AssistDb;
use crate::services::jwt::UserClaims;
use crate::services::metrics::record_faq_query;

/// Fixed reassurance returned to the end user when a question is escalated.
pub const ESCALATION_NOTICE: &str = "I'm not confident I have the right answer for this \
question. I've forwarded your query to our help desk team, and they'll get back to you shortly.";

/// Soft in-band message when the answering model is unreachable. The chat UI
/// must stay usable, so upstream failure is never surfaced as a hard error.
pub const UPSTREAM_APOLOGY: &str = "Sorry, I couldn't reach our knowledge base just now. \
Please try again in a moment.";

/// Answer returned by the external FAQ model.
#[derive(Debug, Clone, Deserialize)]
pub struct FaqAnswer {
    pub answer: String,
    /// Reliability of the answer, in [0, 1].
    pub confidence_score: f64,
}

#[async_trait]
pub trait FaqProvider: Send + Sync {
    async fn ask(&self, message: &str) -> Result<FaqAnswer, AppError>;
}

/// Production provider talking to the external answering service over HTTP.
pub struct HttpFaqProvider {
    client: reqwest::Client,
    endpoint: String,
}

impl HttpFaqProvider {
    pub fn new(config: &FaqConfig) -> Result<Self, AppError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| {
                AppError::InternalError(anyhow::anyhow!("Failed to build HTTP client: {}", e))
            })?;
        Ok(Self {
            client,
            endpoint: config.endpoint.clone(),
        })
    }
}

#[async_trait]
impl FaqProvider for HttpFaqProvider {
    async fn ask(&self, message: &str) -> Result<FaqAnswer, AppError> {
        let response = self
            .client
            .post(&self.endpoint)
            .json(&json!({ "message": message }))
            .send()
            .await
            .map_err(|e| {
                tracing::warn!(endpoint = %self.endpoint, "FAQ model unreachable: {}", e);
                AppError::BadGateway(format!("FAQ model unreachable: {}", e))
            })?;

        if !response.status().is_success() {
            tracing::warn!(status = %response.status(), "FAQ model returned an error status");
            return Err(AppError::BadGateway(format!(
                "FAQ model returned {}",
                response.status()
            )));
        }

        response.json::<FaqAnswer>().await.map_err(|e| {
            tracing::warn!("FAQ model returned an unparseable body: {}", e);
            AppError::BadGateway(format!("Invalid FAQ model response: {}", e))
        })
    }
}

/// Canned provider for tests and for running without the external model.
pub struct MockFaqProvider {
    answer: String,
    confidence_score: f64,
}

impl MockFaqProvider {
    pub fn new(answer: impl Into<String>, confidence_score: f64) -> Self {
        Self {
            answer: answer.into(),
            confidence_score,
        }
    }
}

impl Default for MockFaqProvider {
    fn default() -> Self {
        Self::new("This is a canned answer.", 0.95)
    }
}

#[async_trait]
impl FaqProvider for MockFaqProvider {
    async fn ask(&self, _message: &str) -> Result<FaqAnswer, AppError> {
        Ok(FaqAnswer {
            answer: self.answer.clone(),
            confidence_score: self.confidence_score,
        })
    }
}

/// Which path a question took through the gateway. Escalation is observable
/// to callers and tests rather than inferred from a response flag.
#[derive(Debug)]
pub enum FaqOutcome {
    Answered {
        answer: String,
        confidence: f64,
    },
    Escalated {
        ticket_id: ObjectId,
        confidence: f64,
    },
}

pub fn should_escalate(confidence: f64, threshold: f64) -> bool {
    confidence < threshold
}

/// Forward a question to the answering model and route on confidence: below
/// the threshold, persist a pending ticket carrying the verbatim question
/// and requester identity; at or above it, pass the answer through.
pub async fn route_question(
    db: &AssistDb,
    provider: &dyn FaqProvider,
    threshold: f64,
    requester: &UserClaims,
    message: &str,
) -> Result<FaqOutcome, AppError> {
    let reply = provider.ask(message).await?;

    if should_escalate(reply.confidence_score, threshold) {
        let ticket = Ticket::new(
            requester.sub.clone(),
            requester.email.clone(),
            Some(requester.name.clone()),
            message.to_string(),
            Some(reply.confidence_score),
        );
        let ticket_id = db.insert_ticket(&ticket).await?;
        tracing::info!(
            ticket_id = %ticket_id,
            confidence = reply.confidence_score,
            "low-confidence question escalated to help desk"
        );
        record_faq_query("escalated");
        Ok(FaqOutcome::Escalated {
            ticket_id,
            confidence: reply.confidence_score,
        })
    } else {
        record_faq_query("answered");
        Ok(FaqOutcome::Answered {
            answer: reply.answer,
            confidence: reply.confidence_score,
        })
    }
}
