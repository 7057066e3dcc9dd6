//! Anthropic Messages API adapter.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::http::{endpoint, post_json};
use super::{ProviderError, ProviderKind, ProviderRequest, TextProvider};
use crate::config::ProviderSettings;

const DEFAULT_BASE_URL: &str = "https://api.anthropic.com/v1";
const ANTHROPIC_VERSION: &str = "2023-06-01";
const MAX_OUTPUT_TOKENS: u32 = 2000;

#[derive(Clone)]
pub struct AnthropicProvider {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
    model: String,
}

impl AnthropicProvider {
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

    fn request_body(&self, request: ProviderRequest<'_>) -> MessagesRequest {
        MessagesRequest {
            model: self.model.clone(),
            max_tokens: MAX_OUTPUT_TOKENS,
            system: request.system_instruction.to_string(),
            messages: vec![UserMessage {
                role: "user".to_string(),
                content: request.user_prompt.to_string(),
            }],
        }
    }

    fn extract_text(response: MessagesResponse) -> Result<String, ProviderError> {
        let text: String = response
            .content
            .into_iter()
            .filter(|block| block.block_type == "text")
            .filter_map(|block| block.text)
            .collect();

        if text.trim().is_empty() {
            return Err(ProviderError::EmptyResponse);
        }
        Ok(text)
    }
}

#[async_trait]
impl TextProvider for AnthropicProvider {
    fn kind(&self) -> ProviderKind {
        ProviderKind::Anthropic
    }

    async fn generate(&self, request: ProviderRequest<'_>) -> Result<String, ProviderError> {
        debug!(
            provider = "anthropic",
            model = %self.model,
            max_tokens = MAX_OUTPUT_TOKENS,
            "invoking Anthropic"
        );

        let body = self.request_body(request);
        let http_request = self
            .client
            .post(endpoint(&self.base_url, "messages"))
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", ANTHROPIC_VERSION);

        let response: MessagesResponse = post_json(http_request, &body).await?;
        Self::extract_text(response)
    }
}

#[derive(Debug, Serialize)]
struct MessagesRequest {
    model: String,
    max_tokens: u32,
    system: String,
    messages: Vec<UserMessage>,
}

#[derive(Debug, Serialize)]
struct UserMessage {
    role: String,
    content: String,
}

#[derive(Debug, Deserialize)]
struct MessagesResponse {
    #[serde(default)]
    content: Vec<ContentBlock>,
}

#[derive(Debug, Deserialize)]
struct ContentBlock {
    #[serde(rename = "type")]
    block_type: String,
    text: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn provider() -> AnthropicProvider {
        AnthropicProvider::new(
            reqwest::Client::new(),
            &ProviderSettings {
                api_key: "ak-test".to_string(),
                model: "claude-3-5-sonnet-20241022".to_string(),
                base_url: Some("http://127.0.0.1:9/v1/".to_string()),
            },
        )
    }

    #[test]
    fn request_uses_system_field_and_bounded_output() {
        let body = provider().request_body(ProviderRequest {
            system_instruction: "분석가",
            user_prompt: "4세대 설명",
        });
        let value = serde_json::to_value(&body).expect("serializes");

        assert_eq!(value["system"], "분석가");
        assert_eq!(value["max_tokens"], 2000);
        assert_eq!(value["messages"].as_array().map(Vec::len), Some(1));
        assert_eq!(value["messages"][0]["role"], "user");
    }

    #[test]
    fn extract_text_keeps_only_text_blocks() {
        let response: MessagesResponse = serde_json::from_value(json!({
            "content": [
                { "type": "text", "text": "## 진단" },
                { "type": "tool_use", "id": "t1", "name": "noop", "input": {} },
                { "type": "text", "text": " 완료" }
            ]
        }))
        .expect("response parses");
        assert_eq!(
            AnthropicProvider::extract_text(response).expect("text"),
            "## 진단 완료"
        );
    }

    #[test]
    fn extract_text_rejects_empty_content() {
        let response: MessagesResponse =
            serde_json::from_value(json!({ "content": [] })).expect("response parses");
        assert!(matches!(
            AnthropicProvider::extract_text(response),
            Err(ProviderError::EmptyResponse)
        ));
    }
}
