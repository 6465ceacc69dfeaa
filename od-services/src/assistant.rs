//! Assistant service for the dashboard chatbot.
//!
//! Rebuilds the conversation from backend history, sends the full
//! transcript to the completion API, then persists the new exchange both
//! to the backend and to the local log. History and persistence failures
//! are tolerated so a flaky backend does not block the reply itself.

use tracing::{debug, info, warn};

use od_api::{ApiClient, CompletionClient};
use od_core::config::ConfigHandle;
use od_core::error::OdResult;
use od_models::models::chatbot::{flatten_history, ChatExchange, ChatMessage};
use od_models::store;
use od_models::Database;

use crate::event_bus::{AppEvent, EventBus};
use crate::service::{Service, ServiceState};

/// Number of local exchanges returned by default.
const DEFAULT_HISTORY_LIMIT: i64 = 20;

/// Service driving assistant conversations.
pub struct AssistantService {
    state: ServiceState,
    db: Database,
    config: ConfigHandle,
    bus: EventBus,
}

impl AssistantService {
    /// Create a new AssistantService.
    pub fn new(db: Database, config: ConfigHandle, bus: EventBus) -> Self {
        Self {
            state: ServiceState::Created,
            db,
            config,
            bus,
        }
    }

    /// Ask the assistant a question on behalf of a user and return the
    /// reply text.
    pub async fn ask(
        &self,
        api: &ApiClient,
        completion: &CompletionClient,
        user_id: i64,
        question: &str,
    ) -> OdResult<String> {
        let history = match api.chatbot_history(user_id).await {
            Ok(rows) => rows,
            Err(e) => {
                // A reply without context beats no reply.
                warn!("failed to load chatbot history: {e}");
                Vec::new()
            }
        };

        let system_prompt = self.config.read().await.assistant.system_prompt.clone();
        let transcript = build_transcript(&system_prompt, history, question);
        debug!("sending {} message(s) to completion api", transcript.len());

        let reply = completion.complete(&transcript).await?;
        let answer = reply.content;

        if let Err(e) = api.save_chatbot_exchange(user_id, question, &answer).await {
            warn!("failed to save exchange to backend: {e}");
        }
        match self.db.conn() {
            Ok(conn) => {
                if let Err(e) = store::log_exchange(&conn, user_id, question, &answer) {
                    warn!("failed to log exchange locally: {e}");
                }
            }
            Err(e) => warn!("failed to log exchange locally: {e}"),
        }

        self.bus.emit(AppEvent::AssistantReply { user_id });
        Ok(answer)
    }

    /// Recent exchanges from the local log, oldest first.
    pub fn local_history(&self, user_id: i64) -> OdResult<Vec<ChatExchange>> {
        let conn = self.db.conn()?;
        store::recent_exchanges(&conn, user_id, DEFAULT_HISTORY_LIMIT)
    }

    /// Drop the local exchange log for a user.
    pub fn clear_local_history(&self, user_id: i64) -> OdResult<usize> {
        let conn = self.db.conn()?;
        store::clear_exchanges(&conn, user_id)
    }
}

/// Assemble the completion transcript: optional system message, prior
/// exchanges oldest first, then the new question.
fn build_transcript(
    system_prompt: &str,
    history: Vec<ChatExchange>,
    question: &str,
) -> Vec<ChatMessage> {
    let mut messages = Vec::new();
    if !system_prompt.trim().is_empty() {
        messages.push(ChatMessage::system(system_prompt.trim()));
    }
    messages.extend(flatten_history(history));
    messages.push(ChatMessage::user(question));
    messages
}

impl Service for AssistantService {
    fn name(&self) -> &str { "assistant" }
    fn state(&self) -> ServiceState { self.state }
    fn init(&mut self) -> OdResult<()> {
        self.state = ServiceState::Running;
        info!("assistant service initialized");
        Ok(())
    }
    fn shutdown(&mut self) -> OdResult<()> {
        self.state = ServiceState::Stopped;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn exchange(question: &str, answer: &str, created_at: &str) -> ChatExchange {
        ChatExchange {
            id: None,
            user_id: 7,
            kind: Some("ai_general".into()),
            question: question.into(),
            answer: answer.into(),
            created_at: Some(created_at.into()),
        }
    }

    #[test]
    fn test_transcript_with_system_prompt() {
        let history = vec![exchange("hi?", "hello", "2025-06-01T10:00:00+00:00")];
        let messages = build_transcript("You are a helpful dashboard assistant.", history, "next?");
        assert_eq!(messages.len(), 4);
        assert_eq!(messages[0].role, "system");
        assert_eq!(messages[1], ChatMessage::user("hi?"));
        assert_eq!(messages[2], ChatMessage::assistant("hello"));
        assert_eq!(messages[3], ChatMessage::user("next?"));
    }

    #[test]
    fn test_transcript_without_system_prompt() {
        let messages = build_transcript("   ", vec![], "only question");
        assert_eq!(messages.len(), 1);
        assert_eq!(messages[0], ChatMessage::user("only question"));
    }

    #[test]
    fn test_transcript_orders_history() {
        let history = vec![
            exchange("later?", "b", "2025-06-01T11:00:00+00:00"),
            exchange("earlier?", "a", "2025-06-01T10:00:00+00:00"),
        ];
        let messages = build_transcript("", history, "now?");
        assert_eq!(messages[0], ChatMessage::user("earlier?"));
        assert_eq!(messages[2], ChatMessage::user("later?"));
        assert_eq!(messages.last().unwrap(), &ChatMessage::user("now?"));
    }
}
