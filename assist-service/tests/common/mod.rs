//! Common test utilities for API integration tests.
//!
//! These tests need a reachable MongoDB; set `TEST_MONGODB_URI` to run them.
//! Without it every test skips, so the suite stays green on machines without
//! a database.

use std::sync::Arc;

use assist_service::config::{
    AssistConfig, FaqConfig, HelpdeskConfig, JwtConfig, MongoConfig,
};
use assist_service::services::{AssistDb, FaqAnswer, FaqProvider, MockFaqProvider};
use assist_service::startup::Application;
use assist_core::error::AppError;
use uuid::Uuid;

pub const HELPDESK_EMAIL: &str = "helpdesk@example.com";
pub const HELPDESK_PASSWORD: &str = "helpdesk123";

/// Provider standing in for an answering model that is down.
pub struct UnreachableFaqProvider;

#[async_trait::async_trait]
impl FaqProvider for UnreachableFaqProvider {
    async fn ask(&self, _message: &str) -> Result<FaqAnswer, AppError> {
        Err(AppError::BadGateway(
            "FAQ model unreachable: connection refused".to_string(),
        ))
    }
}

pub struct TestApp {
    pub address: String,
    pub db: AssistDb,
    pub client: reqwest::Client,
}

/// Returns `None` when `TEST_MONGODB_URI` is unset.
pub fn mongodb_uri() -> Option<String> {
    std::env::var("TEST_MONGODB_URI").ok()
}

fn test_config(uri: String) -> AssistConfig {
    AssistConfig {
        common: assist_core::config::Config {
            port: 0,
            ..Default::default()
        },
        mongodb: MongoConfig {
            uri,
            database: format!("faq_assist_test_{}", Uuid::new_v4().simple()),
        },
        jwt: JwtConfig {
            secret: "integration-test-secret".to_string(),
            user_token_expiry_days: 7,
            helpdesk_token_expiry_hours: 24,
        },
        faq: FaqConfig {
            endpoint: "http://localhost:1/api/faq".to_string(),
            confidence_threshold: 0.80,
            timeout_secs: 2,
        },
        helpdesk: HelpdeskConfig {
            email: HELPDESK_EMAIL.to_string(),
            password: HELPDESK_PASSWORD.to_string(),
        },
    }
}

impl TestApp {
    /// Spawn the service against a fresh database with an injected answering
    /// provider. Each call gets its own database name, so tests are isolated.
    pub async fn spawn_with_faq(faq: Arc<dyn FaqProvider>) -> Option<Self> {
        let uri = mongodb_uri()?;
        let config = test_config(uri);

        let application = Application::build_with_faq(config, faq)
            .await
            .expect("Failed to build application");
        let port = application.port();
        let db = application.db();
        tokio::spawn(application.run_until_stopped());

        let client = reqwest::Client::builder()
            .cookie_store(true)
            .build()
            .expect("Failed to build HTTP client");

        Some(Self {
            address: format!("http://127.0.0.1:{}", port),
            db,
            client,
        })
    }

    /// Spawn with a canned high-confidence provider.
    pub async fn spawn() -> Option<Self> {
        Self::spawn_with_faq(Arc::new(MockFaqProvider::new("Canned answer.", 0.95))).await
    }

    /// Spawn with a provider whose confidence falls below the threshold.
    pub async fn spawn_low_confidence() -> Option<Self> {
        Self::spawn_with_faq(Arc::new(MockFaqProvider::new("Unsure answer.", 0.42))).await
    }

    /// Spawn with a provider that fails every request.
    pub async fn spawn_unreachable_faq() -> Option<Self> {
        Self::spawn_with_faq(Arc::new(UnreachableFaqProvider)).await
    }

    /// Register a user and log in, leaving the session cookie in the
    /// client's cookie store.
    pub async fn register_and_login(&self, name: &str, email: &str, password: &str) {
        let response = self
            .client
            .post(format!("{}/auth/register", self.address))
            .json(&serde_json::json!({
                "name": name,
                "email": email,
                "password": password,
            }))
            .send()
            .await
            .expect("Failed to execute register request");
        assert_eq!(response.status().as_u16(), 201);

        let response = self
            .client
            .post(format!("{}/auth/login", self.address))
            .json(&serde_json::json!({
                "email": email,
                "password": password,
            }))
            .send()
            .await
            .expect("Failed to execute login request");
        assert_eq!(response.status().as_u16(), 200);
    }

    /// Log in as the help-desk operator on this client.
    pub async fn helpdesk_login(&self) {
        let response = self
            .client
            .post(format!("{}/helpdesk/login", self.address))
            .json(&serde_json::json!({
                "email": HELPDESK_EMAIL,
                "password": HELPDESK_PASSWORD,
            }))
            .send()
            .await
            .expect("Failed to execute helpdesk login request");
        assert_eq!(response.status().as_u16(), 200);
    }
}

/// Skip the calling test when no test database is configured.
#[macro_export]
macro_rules! require_mongodb {
    ($spawn:expr) => {
        match $spawn.await {
            Some(app) => app,
            None => {
                eprintln!("Skipping integration test (TEST_MONGODB_URI is not set)");
                return;
            }
        }
    };
}
