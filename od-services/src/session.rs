//! Session service: sign-in, sign-out, restore, and token persistence.
//!
//! The browser app delegated this to its auth framework (JWT session
//! cookie, refresh in the jwt callback). Here the session lives in the
//! local store and the shared [`TokenManager`]; a background bridge task
//! keeps the store in sync with token transitions and republishes them on
//! the application event bus.

use std::sync::Arc;

use tokio::sync::RwLock;
use tokio::task::JoinHandle;
use tracing::{info, warn};

use od_api::token::{SessionEvent, TokenManager};
use od_api::{ApiClient, HttpRefresher};
use od_core::error::{OdError, OdResult};
use od_models::store;
use od_models::{Database, Session, SessionUser};

use crate::event_bus::{AppEvent, EventBus};
use crate::service::{Service, ServiceState};

/// Service owning the signed-in session.
pub struct SessionService {
    state: ServiceState,
    db: Database,
    bus: EventBus,
    tokens: Arc<TokenManager>,
    current: Arc<RwLock<Option<Session>>>,
    bridge: Option<JoinHandle<()>>,
}

impl SessionService {
    pub fn new(db: Database, bus: EventBus, tokens: Arc<TokenManager>) -> Self {
        Self {
            state: ServiceState::Created,
            db,
            bus,
            tokens,
            current: Arc::new(RwLock::new(None)),
            bridge: None,
        }
    }

    /// The shared token manager.
    pub fn tokens(&self) -> &Arc<TokenManager> {
        &self.tokens
    }

    /// Restore a persisted session from the local store, if any.
    ///
    /// Installs the stored tokens on the token manager so subsequent
    /// requests authenticate (and refresh) without a new login.
    pub async fn restore(&self) -> OdResult<Option<SessionUser>> {
        let session = {
            let conn = self.db.conn()?;
            store::load_session(&conn)?
        };

        match session {
            Some(session) => {
                self.tokens.set_tokens(session.tokens.clone()).await;
                let user = session.user.clone();
                *self.current.write().await = Some(session);
                info!("restored session for {}", user.email);
                Ok(Some(user))
            }
            None => Ok(None),
        }
    }

    /// Sign in with credentials. Rejected when a session already exists,
    /// mirroring the original's redirect away from the sign-in page.
    pub async fn sign_in(
        &self,
        api: &ApiClient,
        email: &str,
        password: &str,
    ) -> OdResult<SessionUser> {
        if self.current.read().await.is_some() {
            return Err(OdError::Service(
                "already signed in; sign out first".into(),
            ));
        }

        let session = api.login(email, password).await?;

        {
            let conn = self.db.conn()?;
            store::save_session(&conn, &session)?;
        }

        let user = session.user.clone();
        *self.current.write().await = Some(session);
        self.bus.emit(AppEvent::SignedIn {
            email: user.email.clone(),
        });
        Ok(user)
    }

    /// Sign out: clear tokens, the persisted session, and memory.
    pub async fn sign_out(&self) -> OdResult<()> {
        self.tokens.clear().await;
        {
            let conn = self.db.conn()?;
            store::clear_session(&conn)?;
        }
        *self.current.write().await = None;
        self.bus.emit(AppEvent::SignedOut);
        info!("signed out");
        Ok(())
    }

    /// The signed-in user, if any.
    pub async fn current_user(&self) -> Option<SessionUser> {
        self.current.read().await.as_ref().map(|s| s.user.clone())
    }

    /// Require a signed-in session, the route-guard equivalent.
    pub async fn require_session(&self) -> OdResult<SessionUser> {
        self.current_user().await.ok_or_else(|| {
            OdError::NotSignedIn("not signed in; run `opsdeck login` first".into())
        })
    }

    /// Refresh proactively when the access token is inside the expiry
    /// buffer, so the next request does not waste a round trip on a 401.
    pub async fn ensure_fresh(&self, api: &ApiClient) -> OdResult<()> {
        if !self.tokens.needs_refresh().await {
            return Ok(());
        }

        let stale = self
            .tokens
            .access_token()
            .await
            .ok_or_else(|| OdError::NotSignedIn("not signed in".into()))?;

        info!("access token near expiry, refreshing proactively");
        self.tokens
            .refreshed_token(&stale, &HttpRefresher::from(api))
            .await?;
        Ok(())
    }

    /// Bridge token-manager transitions into the store and the app bus.
    fn spawn_bridge(&mut self) {
        let mut events = self.tokens.subscribe();
        let db = self.db.clone();
        let bus = self.bus.clone();
        let current = Arc::clone(&self.current);

        self.bridge = Some(tokio::spawn(async move {
            while let Ok(event) = events.recv().await {
                match event {
                    SessionEvent::Refreshed(tokens) => {
                        if let Some(session) = current.write().await.as_mut() {
                            session.tokens = tokens.clone();
                        }
                        match db.conn() {
                            Ok(conn) => {
                                if let Err(e) = store::update_session_tokens(&conn, &tokens) {
                                    warn!("failed to persist refreshed tokens: {e}");
                                }
                            }
                            Err(e) => warn!("failed to persist refreshed tokens: {e}"),
                        }
                        bus.emit(AppEvent::SessionRefreshed);
                    }
                    SessionEvent::Expired => {
                        *current.write().await = None;
                        match db.conn() {
                            Ok(conn) => {
                                if let Err(e) = store::clear_session(&conn) {
                                    warn!("failed to clear expired session: {e}");
                                }
                            }
                            Err(e) => warn!("failed to clear expired session: {e}"),
                        }
                        bus.emit(AppEvent::SessionExpired);
                    }
                }
            }
        }));
    }
}

impl Service for SessionService {
    fn name(&self) -> &str {
        "session"
    }

    fn state(&self) -> ServiceState {
        self.state
    }

    fn init(&mut self) -> OdResult<()> {
        self.spawn_bridge();
        self.state = ServiceState::Running;
        info!("session service initialized");
        Ok(())
    }

    fn shutdown(&mut self) -> OdResult<()> {
        if let Some(bridge) = self.bridge.take() {
            bridge.abort();
        }
        self.state = ServiceState::Stopped;
        Ok(())
    }
}
