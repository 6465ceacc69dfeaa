//! Backend response shapes.
//!
//! The backend is inconsistent about envelopes: list endpoints for meetings
//! wrap results in `{ "data": [...] }` while single objects come back bare.
//! `ListEnvelope` absorbs both.

use serde::{Deserialize, Serialize};

use od_core::error::{OdError, OdResult};
use od_models::{Session, SessionUser, TokenSet, User};

/// A list response that may or may not be wrapped in a `data` envelope.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ListEnvelope<T> {
    Wrapped { data: Vec<T> },
    Bare(Vec<T>),
}

impl<T> ListEnvelope<T> {
    /// Extract the items regardless of envelope shape.
    pub fn into_items(self) -> Vec<T> {
        match self {
            ListEnvelope::Wrapped { data } => data,
            ListEnvelope::Bare(items) => items,
        }
    }
}

/// Response from `POST /auth/email/login`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    pub token: String,
    pub refresh_token: String,
    /// Access token expiry, milliseconds since the epoch.
    pub token_expires: i64,
    pub user: User,
}

impl LoginResponse {
    /// Map the login body into a stored session, the way the original
    /// credentials provider did (full name joined, role flattened).
    pub fn into_session(self) -> OdResult<Session> {
        let user_id = self
            .user
            .id
            .ok_or_else(|| OdError::AuthFailed("login response has no user id".into()))?;

        Ok(Session {
            user: SessionUser {
                id: user_id,
                name: self.user.full_name(),
                email: self.user.email.clone(),
                role: self.user.role_name().unwrap_or_default().to_string(),
            },
            tokens: TokenSet {
                access_token: self.token,
                refresh_token: self.refresh_token,
                token_expires: self.token_expires,
            },
        })
    }
}

/// Response from `POST /auth/refresh`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RefreshResponse {
    pub token: String,
    pub refresh_token: String,
    pub token_expires: i64,
}

impl RefreshResponse {
    pub fn into_tokens(self) -> TokenSet {
        TokenSet {
            access_token: self.token,
            refresh_token: self.refresh_token,
            token_expires: self.token_expires,
        }
    }
}

/// Response from `POST /meetings/{id}/parse-transcript`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParseJobStarted {
    pub job_id: String,
    #[serde(default)]
    pub status: Option<String>,
}

/// Response from `GET /meetings/{id}/parse-status`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParseJobStatus {
    pub job_id: String,
    pub status: String,
    #[serde(default)]
    pub error: Option<String>,
}
