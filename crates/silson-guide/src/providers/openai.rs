//! OpenAI chat completions adapter (system + user two-message exchange).

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::http::{endpoint, post_json};
use super::{ProviderError, ProviderKind, ProviderRequest, TextProvider};
use crate::config::ProviderSettings;

const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";

#[derive(Clone)]
pub struct OpenAiProvider {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
    model: String,
}

impl OpenAiProvider {
    pub fn new(client: reqwest::Client, settings: &ProviderSettings) -> Self {
        Self {
            client,
            base_url: settings
                .base_url
                .clone()
                .unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
            api_key: settings.api_key.clone(),
            model: settings.model.clone(),
        }
    }

    fn request_body(&self, request: ProviderRequest<'_>) -> ChatRequest {
        ChatRequest {
            model: self.model.clone(),
            messages: vec![
                ChatMessage {
                    role: "system".to_string(),
                    content: request.system_instruction.to_string(),
                },
                ChatMessage {
                    role: "user".to_string(),
                    content: request.user_prompt.to_string(),
                },
            ],
        }
    }

    fn extract_text(response: ChatResponse) -> Result<String, ProviderError> {
        let choice = response.choices.into_iter().next().ok_or_else(|| {
            ProviderError::MalformedResponse("OpenAI response missing choices[0]".to_string())
        })?;

        match choice.message.content {
            Some(content) if !content.trim().is_empty() => Ok(content),
            _ => Err(ProviderError::EmptyResponse),
        }
    }
}

#[async_trait]
impl TextProvider for OpenAiProvider {
    fn kind(&self) -> ProviderKind {
        ProviderKind::OpenAi
    }

    async fn generate(&self, request: ProviderRequest<'_>) -> Result<String, ProviderError> {
        debug!(provider = "openai", model = %self.model, "invoking OpenAI");

        let body = self.request_body(request);
        let http_request = self
            .client
            .post(endpoint(&self.base_url, "chat/completions"))
            .bearer_auth(&self.api_key);

        let response: ChatResponse = post_json(http_request, &body).await?;
        Self::extract_text(response)
    }
}

#[derive(Debug, Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<ChatMessage>,
}

#[derive(Debug, Serialize)]
struct ChatMessage {
    role: String,
    content: String,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ChatResponseMessage {
    content: Option<String>,
}
