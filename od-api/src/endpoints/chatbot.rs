//! Chatbot history endpoints.

use serde_json::json;

use od_core::error::OdResult;
use od_models::ChatExchange;

use crate::client::ApiClient;
use crate::routes;

impl ApiClient {
    /// Load a user's saved chatbot exchanges.
    pub async fn chatbot_history(&self, user_id: i64) -> OdResult<Vec<ChatExchange>> {
        self.get_json(&routes::chatbot::history_for_user(user_id))
            .await
    }

    /// Save a new question/answer exchange to the backend.
    pub async fn save_chatbot_exchange(
        &self,
        user_id: i64,
        question: &str,
        answer: &str,
    ) -> OdResult<()> {
        let body = json!({
            "userId": user_id,
            "type": "ai_general",
            "question": question,
            "answer": answer,
        });
        self.post(routes::chatbot::INDEX, &body).await?;
        Ok(())
    }
}
