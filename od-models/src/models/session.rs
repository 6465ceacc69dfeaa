//! Session and token types.

use chrono::Utc;
use serde::{Deserialize, Serialize};

use od_core::constants;

/// The access/refresh token pair plus its expiry, as returned by the
/// backend login and refresh endpoints.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TokenSet {
    /// Short-lived bearer credential attached to authenticated calls.
    pub access_token: String,
    /// Longer-lived credential exchanged for a new access token.
    pub refresh_token: String,
    /// Access token expiry, milliseconds since the epoch.
    pub token_expires: i64,
}

impl TokenSet {
    /// Whether the access token expires within the given buffer from now.
    pub fn expires_within_ms(&self, buffer_ms: i64) -> bool {
        let now = Utc::now().timestamp_millis();
        now >= self.token_expires - buffer_ms
    }

    /// Whether the access token is inside the proactive-refresh window
    /// (5 minutes before expiry, as the original session layer used).
    pub fn needs_refresh(&self) -> bool {
        self.expires_within_ms(constants::TOKEN_EXPIRY_BUFFER_MS)
    }
}

/// The signed-in user's identity, as stored in the session.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SessionUser {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub role: String,
}

/// A complete stored session: who is signed in plus their tokens.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Session {
    pub user: SessionUser,
    pub tokens: TokenSet,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tokens_expiring_in(ms: i64) -> TokenSet {
        TokenSet {
            access_token: "access".into(),
            refresh_token: "refresh".into(),
            token_expires: Utc::now().timestamp_millis() + ms,
        }
    }

    #[test]
    fn test_needs_refresh_inside_buffer() {
        // Expires in 2 minutes: inside the 5-minute buffer.
        assert!(tokens_expiring_in(120_000).needs_refresh());
    }

    #[test]
    fn test_needs_refresh_outside_buffer() {
        // Expires in an hour: no proactive refresh needed.
        assert!(!tokens_expiring_in(3_600_000).needs_refresh());
    }

    #[test]
    fn test_expired_token_needs_refresh() {
        assert!(tokens_expiring_in(-1_000).needs_refresh());
    }
}
