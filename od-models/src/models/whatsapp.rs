//! WhatsApp message entity model (read-only in this client).

use serde::{Deserialize, Serialize};

/// A WhatsApp message as the backend's message-intake pipeline stores it,
/// including the content-analysis flags the dashboard surfaced.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WhatsappMessage {
    pub id: i64,
    pub whatsapp_message_id: String,
    pub from_number: String,
    pub to_number: String,
    #[serde(default)]
    pub from_name: Option<String>,
    pub message_type: String,
    #[serde(default)]
    pub content: String,
    pub status: String,
    pub timestamp: String,
    #[serde(default)]
    pub media_url: Option<String>,
    #[serde(default)]
    pub media_type: Option<String>,
    #[serde(default)]
    pub media_caption: Option<String>,
    #[serde(default)]
    pub contains_action_items: bool,
    #[serde(default)]
    pub contains_questions: bool,
    #[serde(default)]
    pub contains_decisions: bool,
    #[serde(default)]
    pub content_category: Option<String>,
    #[serde(default)]
    pub context_category: Option<String>,
    #[serde(default)]
    pub is_group_message: bool,
    #[serde(default)]
    pub group_name: Option<String>,
    #[serde(default)]
    pub group_id: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub updated_at: Option<String>,
}

impl WhatsappMessage {
    /// Display name of the sender, falling back to the number.
    pub fn sender(&self) -> &str {
        self.from_name.as_deref().unwrap_or(&self.from_number)
    }

    /// Case-insensitive text match over content, sender name, and group
    /// name, as the dashboard's search box filtered in memory.
    pub fn matches_search(&self, term: &str) -> bool {
        if term.is_empty() {
            return true;
        }
        let needle = term.to_lowercase();
        self.content.to_lowercase().contains(&needle)
            || self.sender().to_lowercase().contains(&needle)
            || self
                .group_name
                .as_deref()
                .map(|g| g.to_lowercase().contains(&needle))
                .unwrap_or(false)
    }

    /// Whether the analysis flagged this message as noteworthy.
    pub fn has_flags(&self) -> bool {
        self.contains_action_items || self.contains_questions || self.contains_decisions
    }
}
