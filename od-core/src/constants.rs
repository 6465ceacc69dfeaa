//! Application-wide constants.

/// Application name.
pub const APP_NAME: &str = "OpsDeck";

/// Application version.
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Default backend API timeout in milliseconds (matches the original
/// dashboard's 15s axios timeout).
pub const DEFAULT_API_TIMEOUT_MS: u64 = 15_000;

/// Buffer before token expiry at which a proactive refresh is triggered.
pub const TOKEN_EXPIRY_BUFFER_MS: i64 = 300_000;

/// Default fixed interval between transcript-job status polls.
pub const DEFAULT_POLL_INTERVAL_SECS: u64 = 5;

/// Default completion model for the assistant.
pub const DEFAULT_COMPLETION_MODEL: &str = "gpt-3.5-turbo";

/// Default completion API base URL.
pub const DEFAULT_COMPLETION_API_BASE: &str = "https://api.openai.com/v1";

/// Environment variable overriding the backend base URL.
pub const ENV_API_BASE_URL: &str = "OPSDECK_API_BASE_URL";

/// Environment variable providing the completion API key.
pub const ENV_COMPLETION_API_KEY: &str = "OPSDECK_COMPLETION_API_KEY";

/// Local store schema version.
pub const STORE_SCHEMA_VERSION: i32 = 1;

/// Meeting status values as the backend reports them.
pub mod meeting_status {
    pub const SCHEDULED: &str = "scheduled";
    pub const COMPLETED: &str = "completed";
    pub const CANCELLED: &str = "cancelled";

    /// All statuses the dashboard knows how to badge.
    pub const ALL: &[&str] = &[SCHEDULED, COMPLETED, CANCELLED];
}

/// Transcript parse-job status values.
pub mod job_status {
    pub const PENDING: &str = "pending";
    pub const PROCESSING: &str = "processing";
    pub const COMPLETED: &str = "completed";
    pub const FAILED: &str = "failed";

    /// Whether a status string is terminal (polling stops).
    pub fn is_terminal(status: &str) -> bool {
        status == COMPLETED || status == FAILED
    }
}

/// WhatsApp message direction/status values.
pub mod whatsapp_status {
    pub const RECEIVED: &str = "received";
    pub const SENT: &str = "sent";
    pub const DELIVERED: &str = "delivered";
    pub const READ: &str = "read";
}

/// Chat roles in the completion transcript.
pub mod chat_role {
    pub const SYSTEM: &str = "system";
    pub const USER: &str = "user";
    pub const ASSISTANT: &str = "assistant";
}
