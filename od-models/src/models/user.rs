//! User entity model and create/update payload.

use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};

use od_core::error::{OdError, OdResult};

use super::NamedRef;

lazy_static! {
    static ref EMAIL_RE: Regex = Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap();
    // International format, matching the dashboard form: +, then 10-15 digits.
    static ref PHONE_RE: Regex = Regex::new(r"^\+\d{10,15}$").unwrap();
}

/// A user as the backend returns it.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    #[serde(default)]
    pub id: Option<i64>,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    #[serde(default)]
    pub phone_number: Option<String>,
    #[serde(default)]
    pub role: Option<NamedRef>,
    #[serde(default)]
    pub status: Option<NamedRef>,
    #[serde(default)]
    pub team: Option<UserTeam>,
}

/// The team object embedded in a user response.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserTeam {
    pub id: serde_json::Value,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub code: Option<String>,
    #[serde(default)]
    pub is_active: Option<bool>,
}

impl User {
    /// Full display name.
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }

    /// Role name, if present.
    pub fn role_name(&self) -> Option<&str> {
        self.role.as_ref().and_then(|r| r.name.as_deref())
    }
}

/// Payload for creating or updating a user. The backend expects nested
/// `{ "team": { "id": ... } }` references, which `to_body` produces.
#[derive(Debug, Clone)]
pub struct UserPayload {
    pub email: String,
    /// Required on create, optional on update.
    pub password: Option<String>,
    pub first_name: String,
    pub last_name: String,
    pub phone_number: String,
    pub team_id: i64,
    pub role_id: Option<i64>,
    pub status_id: Option<i64>,
}

impl UserPayload {
    /// Validate the payload against the dashboard form rules.
    pub fn validate(&self) -> OdResult<()> {
        if !EMAIL_RE.is_match(self.email.trim()) {
            return Err(OdError::Validation("invalid email".into()));
        }
        if self.first_name.trim().len() < 2 {
            return Err(OdError::Validation(
                "first name must be at least 2 characters".into(),
            ));
        }
        if self.last_name.trim().len() < 2 {
            return Err(OdError::Validation(
                "last name must be at least 2 characters".into(),
            ));
        }
        if !PHONE_RE.is_match(self.phone_number.trim()) {
            return Err(OdError::Validation(
                "invalid phone number format (expected +<10-15 digits>)".into(),
            ));
        }
        Ok(())
    }

    /// Serialize into the request body shape the backend expects.
    pub fn to_body(&self) -> serde_json::Value {
        let mut body = serde_json::json!({
            "email": self.email,
            "firstName": self.first_name,
            "lastName": self.last_name,
            "phoneNumber": self.phone_number,
            "team": { "id": self.team_id },
        });
        if let Some(ref password) = self.password {
            body["password"] = serde_json::Value::from(password.clone());
        }
        if let Some(role_id) = self.role_id {
            body["role"] = serde_json::json!({ "id": role_id });
        }
        if let Some(status_id) = self.status_id {
            body["status"] = serde_json::json!({ "id": status_id });
        }
        body
    }
}
