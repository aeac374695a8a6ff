//! Language-model completion boundary.
//!
//! Treated as a pure function: prompt text in, completion text out. The
//! production implementation talks to an OpenAI-compatible chat completions
//! endpoint.

use crate::error::AppError;
use async_trait::async_trait;
use serde::Deserialize;

/// Requested shape of the completion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponseFormat {
    /// Strict JSON object output.
    JsonObject,
    /// Free text.
    Text,
}

/// Completion boundary.
#[async_trait]
pub trait Completion {
    /// Run one completion and return the raw message content.
    async fn complete(
        &self,
        system_prompt: &str,
        user_content: &str,
        format: ResponseFormat,
    ) -> Result<String, AppError>;
}

/// OpenAI chat completions client.
pub struct OpenAiClient {
    client: reqwest::Client,
    api_key: String,
    model: String,
}

const OPENAI_API_URL: &str = "https://api.openai.com/v1/chat/completions";

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatMessage,
}

#[derive(Debug, Deserialize)]
struct ChatMessage {
    content: String,
}

impl OpenAiClient {
    pub fn new(api_key: String, model: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_key,
            model,
        }
    }
}

#[async_trait]
impl Completion for OpenAiClient {
    async fn complete(
        &self,
        system_prompt: &str,
        user_content: &str,
        format: ResponseFormat,
    ) -> Result<String, AppError> {
        let mut body = serde_json::json!({
            "model": self.model,
            "messages": [
                {"role": "system", "content": system_prompt},
                {"role": "user", "content": user_content},
            ],
            "temperature": 0.3,
        });
        if format == ResponseFormat::JsonObject {
            body["response_format"] = serde_json::json!({"type": "json_object"});
        }

        let response = self
            .client
            .post(OPENAI_API_URL)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| AppError::ai(format!("completion request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(AppError::ai(format!(
                "completion failed ({}): {}",
                status, text
            )));
        }

        let parsed: ChatResponse = response
            .json()
            .await
            .map_err(|e| AppError::ai(format!("cannot parse completion response: {}", e)))?;

        parsed
            .choices
            .into_iter()
            .next()
            .map(|c| c.message.content)
            .ok_or_else(|| AppError::ai("completion returned no choices"))
    }
}
