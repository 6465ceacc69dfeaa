//! OpsDeck Models - Backend entity types and the local SQLite store.
//!
//! This crate provides:
//! - Typed mirrors of the backend-owned entities (teams, users, meetings,
//!   WhatsApp messages, assistant chat rows, session tokens)
//! - Client-side validation for create/update payloads
//! - A small local store for state the browser app kept in local storage:
//!   the cached session and tracked transcript-parse jobs, plus a local
//!   log of assistant exchanges

pub mod db;
pub mod migrations;
pub mod models;
pub mod schema;
pub mod store;

// Re-export key types
pub use db::{Database, StoreStats};
pub use models::chatbot::{ChatExchange, ChatMessage};
pub use models::meeting::{Meeting, MeetingPayload, ParseJob};
pub use models::session::{Session, SessionUser, TokenSet};
pub use models::team::{Team, TeamMember, TeamPayload};
pub use models::user::{User, UserPayload};
pub use models::whatsapp::WhatsappMessage;
