use axum::{
    extract::{FromRequestParts, Request, State},
    http::{header, request::Parts, HeaderMap},
    middleware::Next,
    response::Response,
};

use crate::services::{HelpdeskClaims, UserClaims};
use crate::AppState;
use assist_core::error::AppError;

/// Cookie carrying the end-user session token.
pub const USER_COOKIE: &str = "token";
/// Cookie carrying the help-desk operator token.
pub const HELPDESK_COOKIE: &str = "helpdesk_token";

/// Extract a cookie value from a raw Cookie header.
///
/// The name must sit at the start of the header or directly after a
/// semicolon or whitespace, followed by `=`; the value runs to the next
/// semicolon. The name match is case-sensitive, and a cookie whose name
/// merely ends with `name` (e.g. `xtoken`) does not match.
pub fn extract_cookie<'a>(header: &'a str, name: &str) -> Option<&'a str> {
    let bytes = header.as_bytes();
    let mut start = 0;
    while let Some(idx) = header[start..].find(name) {
        let pos = start + idx;
        let left_ok = pos == 0 || bytes[pos - 1] == b';' || bytes[pos - 1].is_ascii_whitespace();
        let after = pos + name.len();
        if left_ok && bytes.get(after) == Some(&b'=') {
            let value = &header[after + 1..];
            let end = value.find(';').unwrap_or(value.len());
            return Some(&value[..end]);
        }
        start = pos + 1;
    }
    None
}

fn cookie_value<'a>(headers: &'a HeaderMap, name: &str) -> Result<&'a str, AppError> {
    // Absence and verification failure must be indistinguishable to callers,
    // so every failure path here carries the same message.
    headers
        .get(header::COOKIE)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| extract_cookie(value, name))
        .ok_or_else(|| AppError::Unauthorized(anyhow::anyhow!("Authentication required")))
}

/// Require a valid user `token` cookie; stores [`UserClaims`] in request
/// extensions for the [`AuthUser`] extractor.
pub async fn user_auth_middleware(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, AppError> {
    let token = cookie_value(req.headers(), USER_COOKIE)?;
    let claims = state.jwt.verify_user_token(token)?;
    req.extensions_mut().insert(claims);
    Ok(next.run(req).await)
}

/// Require a valid `helpdesk_token` cookie with the helpdesk role; stores
/// [`HelpdeskClaims`] in request extensions.
pub async fn helpdesk_auth_middleware(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, AppError> {
    let token = cookie_value(req.headers(), HELPDESK_COOKIE)?;
    let claims = state.jwt.verify_helpdesk_token(token)?;
    req.extensions_mut().insert(claims);
    Ok(next.run(req).await)
}

/// Extractor for the verified user claim in handlers.
pub struct AuthUser(pub UserClaims);

#[axum::async_trait]
impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let claims = parts.extensions.get::<UserClaims>().ok_or_else(|| {
            AppError::InternalError(anyhow::anyhow!(
                "user claims missing from request extensions"
            ))
        })?;
        Ok(AuthUser(claims.clone()))
    }
}

/// Extractor for the verified operator claim in handlers.
pub struct HelpdeskOperator(pub HelpdeskClaims);

#[axum::async_trait]
impl<S> FromRequestParts<S> for HelpdeskOperator
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let claims = parts.extensions.get::<HelpdeskClaims>().ok_or_else(|| {
            AppError::InternalError(anyhow::anyhow!(
                "helpdesk claims missing from request extensions"
            ))
        })?;
        Ok(HelpdeskOperator(claims.clone()))
    }
}
