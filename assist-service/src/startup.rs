use std::net::SocketAddr;
use std::sync::Arc;

use crate::config::AssistConfig;
use crate::services::{AssistDb, FaqProvider, HttpFaqProvider, JwtService};
use crate::{build_router, AppState};
use assist_core::error::AppError;

/// Running application handle.
///
/// `build` binds the listener before returning, so tests can ask for port 0
/// and read the assigned port back.
pub struct Application {
    port: u16,
    db: AssistDb,
    listener: tokio::net::TcpListener,
    router: axum::Router,
}

impl Application {
    pub async fn build(config: AssistConfig) -> Result<Self, AppError> {
        let provider = HttpFaqProvider::new(&config.faq)?;
        Self::build_with_faq(config, Arc::new(provider)).await
    }

    /// Same as [`build`](Self::build) with an injected answering provider.
    pub async fn build_with_faq(
        config: AssistConfig,
        faq: Arc<dyn FaqProvider>,
    ) -> Result<Self, AppError> {
        let db = AssistDb::connect(&config.mongodb.uri, &config.mongodb.database).await?;
        db.initialize_indexes().await?;

        let jwt = JwtService::new(&config.jwt);
        let state = AppState {
            config: config.clone(),
            db: db.clone(),
            jwt,
            faq,
        };
        let router = build_router(state);

        let addr = SocketAddr::from(([0, 0, 0, 0], config.common.port));
        let listener = tokio::net::TcpListener::bind(addr).await?;
        let port = listener.local_addr()?.port();

        Ok(Self {
            port,
            db,
            listener,
            router,
        })
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    pub fn db(&self) -> AssistDb {
        self.db.clone()
    }

    pub async fn run_until_stopped(self) -> Result<(), AppError> {
        tracing::info!(port = self.port, "Listening");
        axum::serve(self.listener, self.router).await?;
        Ok(())
    }
}
