pub mod auth;
pub mod chat;
pub mod faq;
pub mod health;
pub mod helpdesk;
pub mod notifications;
pub mod tickets;
