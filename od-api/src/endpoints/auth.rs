//! Auth endpoints: credential login.
//!
//! The refresh endpoint lives in the client module because it backs the
//! 401 refresh flow rather than a user-facing operation.

use serde_json::json;
use tracing::info;

use od_core::error::OdResult;
use od_models::Session;

use crate::client::ApiClient;
use crate::response::LoginResponse;
use crate::routes;

impl ApiClient {
    /// Sign in with email and password. Installs the returned tokens on
    /// the client's token manager and returns the mapped session.
    pub async fn login(&self, email: &str, password: &str) -> OdResult<Session> {
        let body = json!({ "email": email, "password": password });
        let response: LoginResponse = self.post_json(routes::auth::LOGIN, &body).await?;
        let session = response.into_session()?;

        self.tokens().set_tokens(session.tokens.clone()).await;
        info!("signed in as {}", session.user.email);
        Ok(session)
    }
}
