use assist_core::config as core_config;
use assist_core::error::AppError;
use serde::Deserialize;
use std::env;

#[derive(Debug, Clone, Deserialize)]
pub struct AssistConfig {
    #[serde(flatten)]
    pub common: core_config::Config,
    pub mongodb: MongoConfig,
    pub jwt: JwtConfig,
    pub faq: FaqConfig,
    pub helpdesk: HelpdeskConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MongoConfig {
    pub uri: String,
    pub database: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct JwtConfig {
    pub secret: String,
    pub user_token_expiry_days: i64,
    pub helpdesk_token_expiry_hours: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct FaqConfig {
    /// Endpoint of the external FAQ answering model.
    pub endpoint: String,
    /// Answers scoring below this are escalated to the help desk.
    pub confidence_threshold: f64,
    pub timeout_secs: u64,
}

/// Single hardcoded operator credential pair for the help-desk dashboard.
#[derive(Debug, Clone, Deserialize)]
pub struct HelpdeskConfig {
    pub email: String,
    pub password: String,
}

impl AssistConfig {
    pub fn load() -> Result<Self, AppError> {
        let common_config = core_config::Config::load()?;
        let is_prod = env::var("ENVIRONMENT").unwrap_or_else(|_| "dev".to_string()) == "prod";

        Ok(AssistConfig {
            common: common_config,
            mongodb: MongoConfig {
                uri: get_env("MONGODB_URI", Some("mongodb://localhost:27017"), is_prod)?,
                database: get_env("MONGODB_DATABASE", Some("faq_assist"), is_prod)?,
            },
            jwt: JwtConfig {
                secret: get_env("JWT_SECRET", Some("dev-only-secret"), is_prod)?,
                user_token_expiry_days: get_env("JWT_USER_EXPIRY_DAYS", Some("7"), is_prod)?
                    .parse()
                    .unwrap_or(7),
                helpdesk_token_expiry_hours: get_env(
                    "JWT_HELPDESK_EXPIRY_HOURS",
                    Some("24"),
                    is_prod,
                )?
                .parse()
                .unwrap_or(24),
            },
            faq: FaqConfig {
                endpoint: get_env(
                    "FAQ_MODEL_URL",
                    Some("http://localhost:5000/api/faq"),
                    is_prod,
                )?,
                confidence_threshold: get_env("FAQ_CONFIDENCE_THRESHOLD", Some("0.80"), is_prod)?
                    .parse()
                    .unwrap_or(0.80),
                timeout_secs: get_env("FAQ_TIMEOUT_SECS", Some("30"), is_prod)?
                    .parse()
                    .unwrap_or(30),
            },
            helpdesk: HelpdeskConfig {
                email: get_env("HELPDESK_EMAIL", Some("helpdesk@example.com"), is_prod)?,
                password: get_env("HELPDESK_PASSWORD", Some("helpdesk123"), is_prod)?,
            },
        })
    }
}

fn get_env(key: &str, default: Option<&str>, is_prod: bool) -> Result<String, AppError> {
    match env::var(key) {
        Ok(val) => Ok(val),
        Err(_) => {
            if is_prod {
                Err(AppError::ConfigError(anyhow::anyhow!(
                    "{} is required in production but not set",
                    key
                )))
            } else if let Some(def) = default {
                Ok(def.to_string())
            } else {
                Err(AppError::ConfigError(anyhow::anyhow!(
                    "{} is required but not set",
                    key
                )))
            }
        }
    }
}
