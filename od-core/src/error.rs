//! Global error types for the OpsDeck application.
//!
//! All error categories across the application are unified into a single
//! `OdError` enum with conversions from underlying library errors.

use thiserror::Error;

/// Convenience type alias for Results using OdError.
pub type OdResult<T> = Result<T, OdError>;

/// Unified error type covering all error categories in OpsDeck.
#[derive(Error, Debug)]
pub enum OdError {
    // -- Configuration errors --
    /// Failed to load or parse application configuration.
    #[error("configuration error: {0}")]
    Config(String),

    /// A required configuration value is missing.
    #[error("missing configuration: {0}")]
    MissingConfig(String),

    // -- Network errors --
    /// HTTP request failed.
    #[error("http error: {0}")]
    Http(String),

    /// HTTP request timed out.
    #[error("request timeout: {0}")]
    Timeout(String),

    /// Backend returned an error response. The message has already been
    /// flattened into a human-readable string.
    #[error("server error (status {status}): {message}")]
    ServerError {
        /// HTTP status code.
        status: u16,
        /// Flattened error message from the backend.
        message: String,
    },

    /// Authentication failed; the session is no longer usable and the
    /// user must sign in again.
    #[error("authentication failed: {0}")]
    AuthFailed(String),

    /// The silent token refresh failed.
    #[error("token refresh failed: {0}")]
    TokenRefresh(String),

    /// No stored session exists for an operation that requires one.
    #[error("not signed in: {0}")]
    NotSignedIn(String),

    /// Completion API (assistant) error.
    #[error("completion error: {0}")]
    Completion(String),

    // -- Validation --
    /// A request payload failed client-side validation.
    #[error("validation failed: {0}")]
    Validation(String),

    /// A requested entity does not exist.
    #[error("not found: {0}")]
    NotFound(String),

    // -- Local store errors --
    /// SQLite store error.
    #[error("store error: {0}")]
    Store(String),

    /// Store migration failed.
    #[error("migration error: {0}")]
    Migration(String),

    /// Store connection pool error.
    #[error("connection pool error: {0}")]
    Pool(String),

    /// Store integrity check failed.
    #[error("store integrity check failed: {0}")]
    IntegrityCheck(String),

    // -- File/IO errors --
    /// File system operation failed.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization error.
    #[error("serialization error: {0}")]
    Serialization(String),

    // -- Service errors --
    /// A service failed to initialize.
    #[error("service init error: {0}")]
    ServiceInit(String),

    /// A service is not yet initialized.
    #[error("service not initialized: {0}")]
    ServiceNotInitialized(String),

    /// A service operation failed.
    #[error("service error: {0}")]
    Service(String),

    // -- Notification errors --
    /// Desktop notification failed.
    #[error("notification error: {0}")]
    Notification(String),

    // -- Generic --
    /// An unexpected internal error.
    #[error("internal error: {0}")]
    Internal(String),

    /// Wrapping anyhow errors for interop.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl From<serde_json::Error> for OdError {
    fn from(e: serde_json::Error) -> Self {
        OdError::Serialization(e.to_string())
    }
}

impl From<toml::de::Error> for OdError {
    fn from(e: toml::de::Error) -> Self {
        OdError::Config(e.to_string())
    }
}

impl OdError {
    /// Whether this error means the session is dead and the user must
    /// sign in again. The CLI uses this to print a sign-in hint instead
    /// of a raw error.
    pub fn is_auth_fatal(&self) -> bool {
        matches!(
            self,
            OdError::AuthFailed(_) | OdError::TokenRefresh(_) | OdError::NotSignedIn(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_od_error_display() {
        let err = OdError::Config("bad value".to_string());
        assert_eq!(err.to_string(), "configuration error: bad value");

        let err = OdError::ServerError {
            status: 422,
            message: "Email: invalid".into(),
        };
        assert_eq!(err.to_string(), "server error (status 422): Email: invalid");
    }

    #[test]
    fn test_auth_fatal_classification() {
        assert!(OdError::AuthFailed("expired".into()).is_auth_fatal());
        assert!(OdError::NotSignedIn("no session".into()).is_auth_fatal());
        assert!(!OdError::Http("connection refused".into()).is_auth_fatal());
        assert!(!OdError::ServerError { status: 500, message: String::new() }.is_auth_fatal());
    }

    #[test]
    fn test_serde_json_conversion() {
        let json_err = serde_json::from_str::<serde_json::Value>("{not json").unwrap_err();
        let err: OdError = json_err.into();
        assert!(matches!(err, OdError::Serialization(_)));
    }
}
