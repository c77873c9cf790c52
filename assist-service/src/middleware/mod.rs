pub mod auth;

pub use auth::{
    extract_cookie, helpdesk_auth_middleware, user_auth_middleware, AuthUser, HelpdeskOperator,
    HELPDESK_COOKIE, USER_COOKIE,
};
