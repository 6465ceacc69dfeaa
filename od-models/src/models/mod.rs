//! Backend entity models.
//!
//! Field names follow the backend's camelCase JSON; timestamps stay as the
//! RFC 3339 strings the API returns.

pub mod chatbot;
pub mod meeting;
pub mod session;
pub mod team;
pub mod user;
pub mod whatsapp;

use serde::{Deserialize, Serialize};

/// A `{ id, name }` reference the backend uses for roles and statuses.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NamedRef {
    pub id: serde_json::Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

impl NamedRef {
    /// Reference by numeric id only (for request payloads).
    pub fn by_id(id: i64) -> Self {
        Self {
            id: serde_json::Value::from(id),
            name: None,
        }
    }

    /// Display name, falling back to the id.
    pub fn display(&self) -> String {
        self.name
            .clone()
            .unwrap_or_else(|| self.id.to_string().trim_matches('"').to_string())
    }
}
