//! Client for the third-party chat-completion API.
//!
//! Separate from the backend client on purpose: the completion API has its
//! own base URL and API key and takes no part in the backend's token
//! refresh flow.

use std::time::Duration;

use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

use od_core::config::AssistantConfig;
use od_core::error::{OdError, OdResult};
use od_models::ChatMessage;

/// Request body for `POST /chat/completions`.
#[derive(Debug, Serialize)]
struct CompletionRequest<'a> {
    model: &'a str,
    messages: &'a [ChatMessage],
}

#[derive(Debug, Deserialize)]
struct CompletionResponse {
    choices: Vec<CompletionChoice>,
}

#[derive(Debug, Deserialize)]
struct CompletionChoice {
    message: ChatMessage,
}

/// Client for the OpenAI-style completion API.
#[derive(Clone)]
pub struct CompletionClient {
    inner: Client,
    api_base: String,
    api_key: String,
    model: String,
}

impl CompletionClient {
    pub fn new(config: &AssistantConfig) -> OdResult<Self> {
        if config.api_key.is_empty() {
            return Err(OdError::MissingConfig("assistant.api_key".into()));
        }

        let inner = Client::builder()
            .timeout(Duration::from_secs(60))
            .build()
            .map_err(|e| OdError::Http(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            inner,
            api_base: config.api_base.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
            model: config.model.clone(),
        })
    }

    /// The configured model identifier.
    pub fn model(&self) -> &str {
        &self.model
    }

    /// Send a transcript and return the assistant's reply.
    pub async fn complete(&self, messages: &[ChatMessage]) -> OdResult<ChatMessage> {
        if messages.is_empty() {
            return Err(OdError::Completion("no messages to send".into()));
        }

        let url = format!("{}/chat/completions", self.api_base);
        debug!("requesting completion ({} messages)", messages.len());

        let body = CompletionRequest {
            model: &self.model,
            messages,
        };

        let response = self
            .inner
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    OdError::Timeout(e.to_string())
                } else {
                    OdError::Completion(e.to_string())
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(OdError::Completion(format!(
                "completion API returned {status}: {body}"
            )));
        }

        let completion: CompletionResponse = response
            .json()
            .await
            .map_err(|e| OdError::Completion(format!("failed to parse completion: {e}")))?;

        completion
            .choices
            .into_iter()
            .next()
            .map(|choice| choice.message)
            .ok_or_else(|| OdError::Completion("no choices in completion response".into()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> AssistantConfig {
        AssistantConfig {
            api_base: "https://api.openai.com/v1/".into(),
            api_key: "sk-test".into(),
            model: "gpt-3.5-turbo".into(),
            system_prompt: String::new(),
        }
    }

    #[test]
    fn test_missing_api_key_rejected() {
        let mut c = config();
        c.api_key = String::new();
        assert!(CompletionClient::new(&c).is_err());
    }

    #[test]
    fn test_base_url_trailing_slash_trimmed() {
        let client = CompletionClient::new(&config()).unwrap();
        assert_eq!(client.api_base, "https://api.openai.com/v1");
    }

    #[tokio::test]
    async fn test_empty_transcript_rejected() {
        let client = CompletionClient::new(&config()).unwrap();
        assert!(client.complete(&[]).await.is_err());
    }

    #[test]
    fn test_completion_response_shape() {
        let json = r#"{"choices": [{"message": {"role": "assistant", "content": "hi"}}]}"#;
        let resp: CompletionResponse = serde_json::from_str(json).unwrap();
        assert_eq!(resp.choices[0].message.content, "hi");
    }

    #[test]
    fn test_request_serializes_messages() {
        let messages = vec![ChatMessage::user("hello")];
        let req = CompletionRequest {
            model: "gpt-3.5-turbo",
            messages: &messages,
        };
        let json = serde_json::to_value(&req).unwrap();
        assert_eq!(json["model"], "gpt-3.5-turbo");
        assert_eq!(json["messages"][0]["role"], "user");
    }
}
