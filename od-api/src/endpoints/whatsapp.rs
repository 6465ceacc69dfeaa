//! WhatsApp message endpoints (read-only).
//!
//! The backend exposes the full message list; search, status, and
//! group/direct filters are applied client-side, as the dashboard did.

use od_core::error::OdResult;
use od_models::WhatsappMessage;

use crate::client::ApiClient;
use crate::response::ListEnvelope;
use crate::routes;

/// Client-side filters for the message list.
#[derive(Debug, Clone, Default)]
pub struct WhatsappFilter {
    /// Case-insensitive text match over content, sender, and group name.
    pub search: Option<String>,
    /// Exact status match (e.g. "received", "read").
    pub status: Option<String>,
    /// Some(true) keeps only group messages, Some(false) only direct ones.
    pub group: Option<bool>,
}

impl WhatsappFilter {
    pub fn matches(&self, message: &WhatsappMessage) -> bool {
        if let Some(ref term) = self.search {
            if !message.matches_search(term) {
                return false;
            }
        }
        if let Some(ref status) = self.status {
            if !message.status.eq_ignore_ascii_case(status) {
                return false;
            }
        }
        if let Some(group) = self.group {
            if message.is_group_message != group {
                return false;
            }
        }
        true
    }
}

impl ApiClient {
    /// Fetch all WhatsApp messages.
    pub async fn list_whatsapp_messages(&self) -> OdResult<Vec<WhatsappMessage>> {
        let envelope: ListEnvelope<WhatsappMessage> =
            self.get_json(routes::whatsapp::INDEX).await?;
        Ok(envelope.into_items())
    }

    /// Fetch messages and apply client-side filters.
    pub async fn filtered_whatsapp_messages(
        &self,
        filter: &WhatsappFilter,
    ) -> OdResult<Vec<WhatsappMessage>> {
        let messages = self.list_whatsapp_messages().await?;
        Ok(messages
            .into_iter()
            .filter(|m| filter.matches(m))
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn message(content: &str, status: &str, group: bool) -> WhatsappMessage {
        serde_json::from_value(serde_json::json!({
            "id": 1,
            "whatsappMessageId": "wamid.1",
            "fromNumber": "+15550001111",
            "toNumber": "+15550002222",
            "fromName": "Mario",
            "messageType": "text",
            "content": content,
            "status": status,
            "timestamp": "2025-06-01T10:00:00Z",
            "isGroupMessage": group,
            "groupName": if group { Some("Ops") } else { None },
        }))
        .unwrap()
    }

    #[test]
    fn test_empty_filter_matches_all() {
        let filter = WhatsappFilter::default();
        assert!(filter.matches(&message("hello", "received", false)));
    }

    #[test]
    fn test_search_filter() {
        let filter = WhatsappFilter {
            search: Some("release".into()),
            ..Default::default()
        };
        assert!(filter.matches(&message("Ship the Release notes", "received", false)));
        assert!(!filter.matches(&message("nothing here", "received", false)));
    }

    #[test]
    fn test_status_filter_case_insensitive() {
        let filter = WhatsappFilter {
            status: Some("Read".into()),
            ..Default::default()
        };
        assert!(filter.matches(&message("x", "read", false)));
        assert!(!filter.matches(&message("x", "received", false)));
    }

    #[test]
    fn test_group_filter() {
        let only_groups = WhatsappFilter {
            group: Some(true),
            ..Default::default()
        };
        assert!(only_groups.matches(&message("x", "received", true)));
        assert!(!only_groups.matches(&message("x", "received", false)));
    }

    #[test]
    fn test_search_matches_group_name() {
        let filter = WhatsappFilter {
            search: Some("ops".into()),
            ..Default::default()
        };
        assert!(filter.matches(&message("unrelated", "received", true)));
    }
}
