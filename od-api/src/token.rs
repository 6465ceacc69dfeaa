//! Token state and the single-flight refresh coordinator.
//!
//! Concurrent requests that hit a 401 all funnel through
//! [`TokenManager::refreshed_token`]. A `tokio::sync::Mutex` serializes the
//! refresh itself: the first caller performs the network refresh while the
//! rest queue on the lock, then observe the published token instead of
//! starting refreshes of their own. Session transitions are broadcast so
//! services can react (persist new tokens, notify on expiry).

use async_trait::async_trait;
use tokio::sync::{broadcast, Mutex, RwLock};
use tracing::{debug, info, warn};

use od_core::error::{OdError, OdResult};
use od_models::TokenSet;

/// Session lifecycle events broadcast by the token manager.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    /// Tokens were replaced after a successful refresh.
    Refreshed(TokenSet),
    /// The session ended because a refresh failed or a replayed request
    /// came back 401 again.
    Expired,
}

/// Performs the actual token refresh against the backend.
///
/// Split out as a trait so refresh coordination can be exercised without a
/// network; the production implementation lives in the client module.
#[async_trait]
pub trait RefreshTokens: Send + Sync {
    /// Exchange a refresh token for a new token set.
    async fn refresh(&self, refresh_token: &str) -> OdResult<TokenSet>;
}

/// Holds the current token set and coordinates refreshes.
#[derive(Debug)]
pub struct TokenManager {
    tokens: RwLock<Option<TokenSet>>,
    /// Serializes refresh attempts. Held for the whole refresh so queued
    /// 401 handlers see the outcome before deciding anything.
    refresh_gate: Mutex<()>,
    events: broadcast::Sender<SessionEvent>,
}

impl Default for TokenManager {
    fn default() -> Self {
        Self::new()
    }
}

impl TokenManager {
    pub fn new() -> Self {
        let (events, _) = broadcast::channel(16);
        Self {
            tokens: RwLock::new(None),
            refresh_gate: Mutex::new(()),
            events,
        }
    }

    /// Subscribe to session lifecycle events.
    pub fn subscribe(&self) -> broadcast::Receiver<SessionEvent> {
        self.events.subscribe()
    }

    /// Install a token set (after login or session restore).
    pub async fn set_tokens(&self, tokens: TokenSet) {
        *self.tokens.write().await = Some(tokens);
    }

    /// The current access token, if signed in.
    pub async fn access_token(&self) -> Option<String> {
        self.tokens
            .read()
            .await
            .as_ref()
            .map(|t| t.access_token.clone())
    }

    /// The current token set, if signed in.
    pub async fn current(&self) -> Option<TokenSet> {
        self.tokens.read().await.clone()
    }

    pub async fn is_signed_in(&self) -> bool {
        self.tokens.read().await.is_some()
    }

    /// Whether the stored access token is inside the proactive-refresh
    /// window.
    pub async fn needs_refresh(&self) -> bool {
        self.tokens
            .read()
            .await
            .as_ref()
            .map(|t| t.needs_refresh())
            .unwrap_or(false)
    }

    /// Clear tokens without emitting anything (explicit sign-out).
    pub async fn clear(&self) {
        *self.tokens.write().await = None;
    }

    /// Terminate the session and emit `Expired`, at most once.
    ///
    /// Used when a replayed request comes back 401 a second time.
    pub async fn force_sign_out(&self) {
        let mut guard = self.tokens.write().await;
        if guard.take().is_some() {
            warn!("session terminated");
            let _ = self.events.send(SessionEvent::Expired);
        }
    }

    /// Get an access token that is newer than `stale_access`, refreshing if
    /// necessary. This is the single-flight entry point for 401 handling.
    ///
    /// - The first caller in performs the refresh through `refresher` and
    ///   publishes the outcome.
    /// - Callers queued behind the gate find the token already replaced and
    ///   return it without refreshing again.
    /// - On refresh failure the session is cleared and `Expired` is emitted
    ///   exactly once; every queued caller gets an auth error.
    pub async fn refreshed_token(
        &self,
        stale_access: &str,
        refresher: &dyn RefreshTokens,
    ) -> OdResult<String> {
        let _gate = self.refresh_gate.lock().await;

        // Someone ahead of us in the queue may have already resolved this.
        match self.tokens.read().await.as_ref() {
            Some(current) if current.access_token != stale_access => {
                debug!("token already refreshed by a concurrent request");
                return Ok(current.access_token.clone());
            }
            Some(_) => {}
            None => {
                return Err(OdError::AuthFailed("session expired".into()));
            }
        }

        let refresh_token = self
            .tokens
            .read()
            .await
            .as_ref()
            .map(|t| t.refresh_token.clone())
            .ok_or_else(|| OdError::NotSignedIn("no refresh token stored".into()))?;

        info!("access token rejected, running silent refresh");
        match refresher.refresh(&refresh_token).await {
            Ok(new_tokens) => {
                let access = new_tokens.access_token.clone();
                *self.tokens.write().await = Some(new_tokens.clone());
                let _ = self.events.send(SessionEvent::Refreshed(new_tokens));
                Ok(access)
            }
            Err(e) => {
                warn!("token refresh failed: {e}");
                let mut guard = self.tokens.write().await;
                if guard.take().is_some() {
                    let _ = self.events.send(SessionEvent::Expired);
                }
                Err(OdError::TokenRefresh(e.to_string()))
            }
        }
    }
}
