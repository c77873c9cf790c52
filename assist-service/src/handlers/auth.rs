use axum::{
    extract::State,
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use mongodb::bson::oid::ObjectId;
use serde_json::json;

use crate::dtos::{LoginRequest, RegisterRequest};
use crate::middleware::{AuthUser, USER_COOKIE};
use crate::models::User;
use crate::utils::{
    client_cookie, hash_password, session_cookie, verify_password, Password, PasswordHashString,
    ValidatedJson,
};
use crate::AppState;
use assist_core::error::AppError;

/// Marker cookie read by the browser client to skip the login screen.
const DIRECT_LOGIN_COOKIE: &str = "direct_login";

/// POST /auth/register
pub async fn register(
    State(state): State<AppState>,
    ValidatedJson(payload): ValidatedJson<RegisterRequest>,
) -> Result<Response, AppError> {
    if state
        .db
        .find_user_by_email(&payload.email)
        .await?
        .is_some()
    {
        return Err(AppError::Conflict(anyhow::anyhow!("User already exists")));
    }

    let password_hash = hash_password(&Password::new(payload.password))?;
    let user = User::new(payload.name, payload.email, password_hash.into_string());
    let user_id = state.db.insert_user(&user).await?;
    tracing::info!(user_id = %user_id, "new user registered");

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "message": "User registered successfully",
            "user": user.sanitized(),
        })),
    )
        .into_response())
}

/// POST /auth/login
///
/// On success sets the httpOnly `token` cookie for the token lifetime and a
/// short-lived client-readable `direct_login` marker.
pub async fn login(
    State(state): State<AppState>,
    ValidatedJson(payload): ValidatedJson<LoginRequest>,
) -> Result<Response, AppError> {
    let user = state
        .db
        .find_user_by_email(&payload.email)
        .await?
        .ok_or_else(|| AppError::Unauthorized(anyhow::anyhow!("Invalid credentials")))?;

    let stored_hash = PasswordHashString::new(user.password_hash.clone());
    if verify_password(&Password::new(payload.password), &stored_hash).is_err() {
        return Err(AppError::Unauthorized(anyhow::anyhow!(
            "Invalid credentials"
        )));
    }

    let user_id = user
        .id
        .ok_or_else(|| AppError::InternalError(anyhow::anyhow!("stored user has no id")))?;
    let token = state
        .jwt
        .issue_user_token(&user_id.to_hex(), &user.email, &user.name)?;

    let max_age = state.config.jwt.user_token_expiry_days * 24 * 60 * 60;
    let body = Json(json!({
        "message": "Login successful",
        "user": user.sanitized(),
        "direct_login": true,
    }));
    let mut response = (StatusCode::OK, body).into_response();
    response.headers_mut().append(
        header::SET_COOKIE,
        session_cookie(USER_COOKIE, &token, max_age)
            .parse()
            .map_err(|e| AppError::InternalError(anyhow::anyhow!("invalid cookie value: {}", e)))?,
    );
    // Short-lived marker so the client can skip its landing page right
    // after login.
    response.headers_mut().append(
        header::SET_COOKIE,
        client_cookie(DIRECT_LOGIN_COOKIE, "true", 60)
            .parse()
            .map_err(|e| AppError::InternalError(anyhow::anyhow!("invalid cookie value: {}", e)))?,
    );
    Ok(response)
}

/// GET /auth/user
///
/// Re-reads the identity record so a deleted account is not kept alive by an
/// unexpired token.
pub async fn current_user(
    State(state): State<AppState>,
    AuthUser(claims): AuthUser,
) -> Result<Json<serde_json::Value>, AppError> {
    let user_id = ObjectId::parse_str(&claims.sub)
        .map_err(|_| AppError::Unauthorized(anyhow::anyhow!("Authentication required")))?;
    let user = state
        .db
        .find_user_by_id(user_id)
        .await?
        .ok_or_else(|| AppError::NotFound(anyhow::anyhow!("User not found")))?;

    Ok(Json(json!({ "user": user.sanitized() })))
}
