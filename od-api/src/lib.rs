//! OpsDeck API - HTTP client for the ops-console backend REST API.
//!
//! This crate provides a typed HTTP client over the backend's route table:
//! auth (login/refresh), teams, users, meetings (including transcript parse
//! jobs), WhatsApp messages, and chatbot history, plus a separate client for
//! the third-party chat-completion API. The central client attaches bearer
//! tokens to non-public requests and runs a single silent token refresh when
//! a request comes back 401, queuing concurrent callers behind the in-flight
//! refresh.

pub mod client;
pub mod completion;
pub mod endpoints;
pub mod flatten;
pub mod response;
pub mod routes;
pub mod token;

// Re-export key types
pub use client::{ApiClient, HttpRefresher};
pub use endpoints::whatsapp::WhatsappFilter;
pub use completion::CompletionClient;
pub use flatten::parse_error_to_string;
pub use response::{ListEnvelope, LoginResponse, RefreshResponse};
pub use token::{RefreshTokens, SessionEvent, TokenManager};
