//! HTTP client for the ops-console backend REST API.
//!
//! Attaches the session's bearer token to every non-public request and
//! handles 401s with a single silent token refresh followed by one replay
//! of the original request. Concurrent 401s queue behind the token
//! manager's refresh gate instead of refreshing in parallel. A 401 on a
//! replayed request terminates the session.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Method, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use od_core::config::{AppConfig, BackendConfig};
use od_core::error::{OdError, OdResult};
use od_models::TokenSet;

use crate::flatten::flatten_error_body;
use crate::response::RefreshResponse;
use crate::routes;
use crate::token::{RefreshTokens, TokenManager};

/// HTTP client for communicating with the backend.
///
/// Wraps reqwest::Client with bearer-token injection, the public-endpoint
/// allow-list, 401 refresh-and-replay, and error flattening.
#[derive(Clone, Debug)]
pub struct ApiClient {
    inner: Client,
    /// Base URL for the API (e.g. "https://api.example.com/api/v1").
    base_url: String,
    /// Default request timeout.
    timeout: Duration,
    /// Shared token state and refresh coordinator.
    tokens: Arc<TokenManager>,
}

impl ApiClient {
    /// Create a new ApiClient from backend configuration.
    pub fn new(config: &BackendConfig, tokens: Arc<TokenManager>) -> OdResult<Self> {
        let base_url = AppConfig::sanitize_base_url(&config.base_url);
        if base_url.is_empty() {
            return Err(OdError::MissingConfig("backend.base_url".into()));
        }

        let timeout = Duration::from_millis(config.timeout_ms);

        let mut builder = Client::builder()
            .timeout(timeout)
            .connect_timeout(Duration::from_secs(15))
            .pool_max_idle_per_host(5)
            .tcp_keepalive(Duration::from_secs(30));

        if config.accept_invalid_certs {
            builder = builder.danger_accept_invalid_certs(true);
        }

        let inner = builder
            .build()
            .map_err(|e| OdError::Http(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            inner,
            base_url,
            timeout,
            tokens,
        })
    }

    /// The shared token manager.
    pub fn tokens(&self) -> &Arc<TokenManager> {
        &self.tokens
    }

    /// The configured API base URL.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// The bearer token to attach for a path, honoring the public
    /// allow-list.
    async fn bearer_for_path(&self, path: &str) -> Option<String> {
        if routes::is_public(path) {
            None
        } else {
            self.tokens.access_token().await
        }
    }

    /// Build a request with an optional bearer token and JSON body.
    fn build_request(
        &self,
        method: Method,
        url: &str,
        bearer: Option<&str>,
        body: Option<&serde_json::Value>,
    ) -> RequestBuilder {
        let mut builder = self
            .inner
            .request(method, url)
            .timeout(self.timeout)
            .header("Content-Type", "application/json");
        if let Some(token) = bearer {
            builder = builder.bearer_auth(token);
        }
        if let Some(b) = body {
            builder = builder.json(b);
        }
        builder
    }

    /// Execute a request with the 401 refresh-and-replay guard.
    async fn request(
        &self,
        method: Method,
        path: &str,
        body: Option<&serde_json::Value>,
    ) -> OdResult<Response> {
        let url = self.url(path);
        let bearer = self.bearer_for_path(path).await;
        debug!("{} {}", method, path);

        let response = self
            .build_request(method.clone(), &url, bearer.as_deref(), body)
            .send()
            .await
            .map_err(Self::classify_error)?;

        // Only requests that actually carried a token enter the refresh
        // flow; a 401 on a public or unauthenticated request is final.
        let stale = match (&bearer, response.status()) {
            (Some(token), StatusCode::UNAUTHORIZED) => token.clone(),
            _ => return Self::check_status(response).await,
        };

        let fresh = self
            .tokens
            .refreshed_token(&stale, &HttpRefresher::from(self))
            .await?;

        debug!("replaying {} {} with refreshed token", method, path);
        let retried = self
            .build_request(method, &url, Some(&fresh), body)
            .send()
            .await
            .map_err(Self::classify_error)?;

        // Second 401 on the replay: do not re-enter the refresh flow.
        if retried.status() == StatusCode::UNAUTHORIZED {
            warn!("replayed request rejected, signing out");
            self.tokens.force_sign_out().await;
            return Err(OdError::AuthFailed(
                "request rejected after token refresh".into(),
            ));
        }

        Self::check_status(retried).await
    }

    // --- Public HTTP methods ---

    pub async fn get(&self, path: &str) -> OdResult<Response> {
        self.request(Method::GET, path, None).await
    }

    pub async fn post(&self, path: &str, body: &serde_json::Value) -> OdResult<Response> {
        self.request(Method::POST, path, Some(body)).await
    }

    /// The backend uses PATCH for entity updates.
    pub async fn patch(&self, path: &str, body: &serde_json::Value) -> OdResult<Response> {
        self.request(Method::PATCH, path, Some(body)).await
    }

    pub async fn delete(&self, path: &str) -> OdResult<Response> {
        self.request(Method::DELETE, path, None).await
    }

    // --- Response helpers ---

    /// Deserialize a response body into T.
    pub async fn parse_response<T: DeserializeOwned>(response: Response) -> OdResult<T> {
        response
            .json::<T>()
            .await
            .map_err(|e| OdError::Serialization(format!("failed to parse response: {e}")))
    }

    /// Convenience: GET + parse.
    pub async fn get_json<T: DeserializeOwned>(&self, path: &str) -> OdResult<T> {
        let resp = self.get(path).await?;
        Self::parse_response(resp).await
    }

    /// Convenience: POST + parse.
    pub async fn post_json<T: DeserializeOwned>(
        &self,
        path: &str,
        body: &serde_json::Value,
    ) -> OdResult<T> {
        let resp = self.post(path, body).await?;
        Self::parse_response(resp).await
    }

    /// Convenience: PATCH + parse.
    pub async fn patch_json<T: DeserializeOwned>(
        &self,
        path: &str,
        body: &serde_json::Value,
    ) -> OdResult<T> {
        let resp = self.patch(path, body).await?;
        Self::parse_response(resp).await
    }

    /// Map non-success statuses to errors, flattening the body into a
    /// readable message.
    async fn check_status(response: Response) -> OdResult<Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        let message = flatten_error_body(&body);

        match status {
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
                Err(OdError::AuthFailed(message))
            }
            StatusCode::NOT_FOUND => Err(OdError::NotFound(message)),
            _ => Err(OdError::ServerError {
                status: status.as_u16(),
                message,
            }),
        }
    }

    /// Classify a reqwest error into an OdError variant.
    fn classify_error(e: reqwest::Error) -> OdError {
        if e.is_timeout() {
            OdError::Timeout(e.to_string())
        } else if e.is_connect() {
            OdError::Http(format!("connection failed: {e}"))
        } else {
            OdError::Http(e.to_string())
        }
    }
}

/// Production refresh implementation: `POST /auth/refresh` with the refresh
/// token as the bearer, the way the original session layer did it.
pub struct HttpRefresher {
    inner: Client,
    base_url: String,
    timeout: Duration,
}

impl From<&ApiClient> for HttpRefresher {
    fn from(client: &ApiClient) -> Self {
        Self {
            inner: client.inner.clone(),
            base_url: client.base_url.clone(),
            timeout: client.timeout,
        }
    }
}

#[async_trait]
impl RefreshTokens for HttpRefresher {
    async fn refresh(&self, refresh_token: &str) -> OdResult<TokenSet> {
        let url = format!("{}{}", self.base_url, routes::auth::REFRESH);
        let response = self
            .inner
            .post(&url)
            .timeout(self.timeout)
            .bearer_auth(refresh_token)
            .send()
            .await
            .map_err(ApiClient::classify_error)?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(OdError::TokenRefresh(format!(
                "refresh endpoint returned {status}: {}",
                flatten_error_body(&body)
            )));
        }

        let refreshed: RefreshResponse = ApiClient::parse_response(response).await?;
        Ok(refreshed.into_tokens())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_client() -> ApiClient {
        let config = BackendConfig {
            base_url: "http://localhost:9999/api/v1".into(),
            timeout_ms: 15000,
            accept_invalid_certs: false,
        };
        ApiClient::new(&config, Arc::new(TokenManager::new())).unwrap()
    }

    async fn signed_in_client() -> ApiClient {
        let client = test_client();
        client
            .tokens
            .set_tokens(TokenSet {
                access_token: "acc-1".into(),
                refresh_token: "ref-1".into(),
                token_expires: i64::MAX,
            })
            .await;
        client
    }

    #[test]
    fn test_base_url_sanitized() {
        let config = BackendConfig {
            base_url: " https://api.example.com/api/v1/ ".into(),
            timeout_ms: 15000,
            accept_invalid_certs: false,
        };
        let client = ApiClient::new(&config, Arc::new(TokenManager::new())).unwrap();
        assert_eq!(client.base_url(), "https://api.example.com/api/v1");
    }

    #[test]
    fn test_missing_base_url_rejected() {
        let config = BackendConfig {
            base_url: String::new(),
            timeout_ms: 15000,
            accept_invalid_certs: false,
        };
        assert!(ApiClient::new(&config, Arc::new(TokenManager::new())).is_err());
    }

    #[tokio::test]
    async fn test_private_path_gets_bearer() {
        let client = signed_in_client().await;
        assert_eq!(
            client.bearer_for_path(routes::teams::INDEX).await.as_deref(),
            Some("acc-1")
        );
    }

    #[tokio::test]
    async fn test_public_path_gets_no_bearer_despite_session() {
        let client = signed_in_client().await;
        assert!(client.bearer_for_path(routes::auth::LOGIN).await.is_none());
        assert!(client.bearer_for_path(routes::auth::REFRESH).await.is_none());
    }

    #[tokio::test]
    async fn test_no_session_no_bearer() {
        let client = test_client();
        assert!(client.bearer_for_path(routes::users::INDEX).await.is_none());
    }

    #[tokio::test]
    async fn test_authorization_header_on_built_request() {
        let client = signed_in_client().await;
        let bearer = client.bearer_for_path("/teams").await;
        let request = client
            .build_request(
                Method::GET,
                &client.url("/teams"),
                bearer.as_deref(),
                None,
            )
            .build()
            .unwrap();
        assert_eq!(
            request.headers().get("Authorization").unwrap(),
            "Bearer acc-1"
        );
    }

    #[tokio::test]
    async fn test_no_authorization_header_on_public_request() {
        let client = signed_in_client().await;
        let bearer = client.bearer_for_path(routes::auth::LOGIN).await;
        let request = client
            .build_request(
                Method::POST,
                &client.url(routes::auth::LOGIN),
                bearer.as_deref(),
                Some(&serde_json::json!({"email": "a@b.c", "password": "pw"})),
            )
            .build()
            .unwrap();
        assert!(request.headers().get("Authorization").is_none());
    }
}
