use axum::{extract::State, Json};

use crate::dtos::{FaqRequest, FaqResponse};
use crate::middleware::AuthUser;
use crate::services::{
    record_faq_query, route_question, FaqOutcome, ESCALATION_NOTICE, UPSTREAM_APOLOGY,
};
use crate::AppState;
use assist_core::error::AppError;

/// POST /faq
///
/// Gateway between the chat UI and the answering model. Confidence below the
/// configured threshold opens a pending help-desk ticket and tells the user
/// so; an unreachable model degrades to an in-band apology rather than an
/// error status, so the conversation keeps flowing.
pub async fn ask(
    State(state): State<AppState>,
    AuthUser(claims): AuthUser,
    Json(payload): Json<FaqRequest>,
) -> Result<Json<FaqResponse>, AppError> {
    let message = payload
        .message
        .as_deref()
        .map(str::trim)
        .filter(|m| !m.is_empty())
        .ok_or_else(|| AppError::BadRequest(anyhow::anyhow!("No message provided")))?;

    let outcome = route_question(
        &state.db,
        state.faq.as_ref(),
        state.config.faq.confidence_threshold,
        &claims,
        message,
    )
    .await;

    let response = match outcome {
        Ok(FaqOutcome::Answered { answer, confidence }) => FaqResponse {
            answer,
            confidence_score: confidence,
            forwarded_to_helpdesk: false,
        },
        Ok(FaqOutcome::Escalated { confidence, .. }) => FaqResponse {
            answer: ESCALATION_NOTICE.to_string(),
            confidence_score: confidence,
            forwarded_to_helpdesk: true,
        },
        Err(AppError::BadGateway(reason)) => {
            tracing::warn!(reason = %reason, "degrading upstream failure to in-band apology");
            record_faq_query("upstream_error");
            FaqResponse {
                answer: UPSTREAM_APOLOGY.to_string(),
                confidence_score: 0.0,
                forwarded_to_helpdesk: false,
            }
        }
        Err(other) => return Err(other),
    };

    Ok(Json(response))
}
