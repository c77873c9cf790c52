use assist_core::error::AppError;
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use crate::config::JwtConfig;

/// HS256 token service for the two credential namespaces.
///
/// Both the user `token` and the operator `helpdesk_token` are signed with
/// the same shared secret; the embedded claim shape discriminates them.
/// Tokens are not persisted server-side, so validity is entirely signature
/// plus expiry.
#[derive(Clone)]
pub struct JwtService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    user_token_expiry_days: i64,
    helpdesk_token_expiry_hours: i64,
}

/// Claims embedded in the user `token` cookie.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserClaims {
    /// Subject (user id, hex ObjectId)
    pub sub: String,
    pub email: String,
    pub name: String,
    /// Expiration time (Unix timestamp)
    pub exp: i64,
    /// Issued at (Unix timestamp)
    pub iat: i64,
}

/// Claims embedded in the operator `helpdesk_token` cookie.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HelpdeskClaims {
    #[serde(default)]
    pub role: String,
    pub exp: i64,
    pub iat: i64,
}

pub const HELPDESK_ROLE: &str = "helpdesk";

impl JwtService {
    pub fn new(config: &JwtConfig) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(config.secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(config.secret.as_bytes()),
            user_token_expiry_days: config.user_token_expiry_days,
            helpdesk_token_expiry_hours: config.helpdesk_token_expiry_hours,
        }
    }

    pub fn issue_user_token(
        &self,
        user_id: &str,
        email: &str,
        name: &str,
    ) -> Result<String, AppError> {
        let now = Utc::now();
        let claims = UserClaims {
            sub: user_id.to_string(),
            email: email.to_string(),
            name: name.to_string(),
            exp: (now + Duration::days(self.user_token_expiry_days)).timestamp(),
            iat: now.timestamp(),
        };
        encode(&Header::default(), &claims, &self.encoding_key)
            .map_err(|e| AppError::InternalError(anyhow::anyhow!("Failed to encode token: {}", e)))
    }

    pub fn issue_helpdesk_token(&self) -> Result<String, AppError> {
        let now = Utc::now();
        let claims = HelpdeskClaims {
            role: HELPDESK_ROLE.to_string(),
            exp: (now + Duration::hours(self.helpdesk_token_expiry_hours)).timestamp(),
            iat: now.timestamp(),
        };
        encode(&Header::default(), &claims, &self.encoding_key)
            .map_err(|e| AppError::InternalError(anyhow::anyhow!("Failed to encode token: {}", e)))
    }

    /// Verify a user token. Any failure (bad signature, expired, malformed,
    /// wrong claim shape) collapses into the same generic `Unauthorized` so
    /// callers cannot distinguish it from an absent cookie.
    pub fn verify_user_token(&self, token: &str) -> Result<UserClaims, AppError> {
        decode::<UserClaims>(token, &self.decoding_key, &Validation::default())
            .map(|data| data.claims)
            .map_err(|_| AppError::Unauthorized(anyhow::anyhow!("Authentication required")))
    }

    /// Verify a helpdesk token. A structurally valid token without the
    /// helpdesk role (a user token, say) is `Forbidden` rather than
    /// `Unauthorized`.
    pub fn verify_helpdesk_token(&self, token: &str) -> Result<HelpdeskClaims, AppError> {
        let claims = decode::<HelpdeskClaims>(token, &self.decoding_key, &Validation::default())
            .map(|data| data.claims)
            .map_err(|_| AppError::Unauthorized(anyhow::anyhow!("Authentication required")))?;
        if claims.role != HELPDESK_ROLE {
            return Err(AppError::Forbidden(anyhow::anyhow!("Not authorized")));
        }
        Ok(claims)
    }
}
