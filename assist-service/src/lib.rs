pub mod config;
pub mod dtos;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod services;
pub mod startup;
pub mod utils;

use axum::{
    middleware::{from_fn, from_fn_with_state},
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::config::AssistConfig;
use crate::services::{AssistDb, FaqProvider, JwtService};
use assist_core::middleware::security_headers::security_headers_middleware;
use assist_core::middleware::tracing::request_id_middleware;

#[derive(Clone)]
pub struct AppState {
    pub config: AssistConfig,
    pub db: AssistDb,
    pub jwt: JwtService,
    pub faq: Arc<dyn FaqProvider>,
}

pub fn build_router(state: AppState) -> Router {
    // End-user surface, gated by the `token` cookie.
    let user_routes = Router::new()
        .route("/auth/user", get(handlers::auth::current_user))
        .route(
            "/chat/sessions",
            get(handlers::chat::list_sessions)
                .post(handlers::chat::save_session)
                .put(handlers::chat::update_session)
                .delete(handlers::chat::delete_session),
        )
        .route("/chat/sessions/:id", get(handlers::chat::get_session))
        .route("/faq", post(handlers::faq::ask))
        .route(
            "/user/notifications",
            get(handlers::notifications::list_notifications)
                .put(handlers::notifications::mark_seen),
        )
        .layer(from_fn_with_state(
            state.clone(),
            middleware::user_auth_middleware,
        ));

    // Operator surface, gated by the `helpdesk_token` cookie.
    let helpdesk_routes = Router::new()
        .route("/helpdesk/auth", get(handlers::helpdesk::auth_status))
        .route(
            "/helpdesk/tickets",
            get(handlers::tickets::list_tickets).post(handlers::tickets::create_ticket),
        )
        .route(
            "/helpdesk/tickets/:id",
            post(handlers::tickets::answer_ticket).delete(handlers::tickets::close_ticket),
        )
        .route("/helpdesk/queries/stats", get(handlers::helpdesk::stats))
        .layer(from_fn_with_state(
            state.clone(),
            middleware::helpdesk_auth_middleware,
        ));

    Router::new()
        .route("/health", get(handlers::health::health_check))
        .route("/metrics", get(handlers::health::metrics))
        .route("/auth/register", post(handlers::auth::register))
        .route("/auth/login", post(handlers::auth::login))
        .route("/helpdesk/login", post(handlers::helpdesk::login))
        .route("/helpdesk/logout", post(handlers::helpdesk::logout))
        .merge(user_routes)
        .merge(helpdesk_routes)
        .with_state(state)
        .layer(TraceLayer::new_for_http().make_span_with(
            |request: &axum::http::Request<_>| {
                let request_id = request
                    .headers()
                    .get("x-request-id")
                    .and_then(|value| value.to_str().ok())
                    .unwrap_or("-");

                tracing::info_span!(
                    "http_request",
                    request_id = %request_id,
                    method = %request.method(),
                    uri = %request.uri(),
                )
            },
        ))
        .layer(from_fn(request_id_middleware))
        .layer(from_fn(security_headers_middleware))
        .layer(CorsLayer::permissive())
}
