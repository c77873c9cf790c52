pub mod analytics;
pub mod database;
pub mod faq;
pub mod jwt;
pub mod metrics;

pub use analytics::{compute_stats, TicketStats, UserQueryCount};
pub use database::AssistDb;
pub use faq::{
    route_question, FaqAnswer, FaqOutcome, FaqProvider, HttpFaqProvider, MockFaqProvider,
    ESCALATION_NOTICE, UPSTREAM_APOLOGY,
};
pub use jwt::{HelpdeskClaims, JwtService, UserClaims};
pub use metrics::{get_metrics, init_metrics, record_faq_query, record_ticket_action};
