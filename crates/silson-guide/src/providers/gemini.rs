//! Google Gemini `generateContent` adapter.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::http::{endpoint, post_json};
use super::{ProviderError, ProviderKind, ProviderRequest, TextProvider};
use crate::config::ProviderSettings;

const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

#[derive(Clone)]
pub struct GeminiProvider {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
    model: String,
}

impl GeminiProvider {
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

    fn url(&self) -> String {
        endpoint(
            &self.base_url,
            &format!("models/{}:generateContent", self.model),
        )
    }

    fn request_body(request: ProviderRequest<'_>) -> GeminiRequest {
        GeminiRequest {
            system_instruction: GeminiContent {
                role: None,
                parts: vec![GeminiPart {
                    text: request.system_instruction.to_string(),
                }],
            },
            contents: vec![GeminiContent {
                role: Some("user".to_string()),
                parts: vec![GeminiPart {
                    text: request.user_prompt.to_string(),
                }],
            }],
        }
    }

    fn extract_text(response: GeminiResponse) -> Result<String, ProviderError> {
        let candidate = response.candidates.into_iter().next().ok_or_else(|| {
            ProviderError::MalformedResponse("Gemini response missing candidates[0]".to_string())
        })?;

        let text: String = candidate
            .content
            .map(|content| content.parts)
            .unwrap_or_default()
            .into_iter()
            .filter_map(|part| part.text)
            .collect();

        if text.trim().is_empty() {
            return Err(ProviderError::EmptyResponse);
        }
        Ok(text)
    }
}

#[async_trait]
impl TextProvider for GeminiProvider {
    fn kind(&self) -> ProviderKind {
        ProviderKind::Gemini
    }

    async fn generate(&self, request: ProviderRequest<'_>) -> Result<String, ProviderError> {
        debug!(provider = "gemini", model = %self.model, "invoking Gemini");

        let body = Self::request_body(request);
        let http_request = self
            .client
            .post(self.url())
            .header("x-goog-api-key", &self.api_key);

        let response: GeminiResponse = post_json(http_request, &body).await?;
        Self::extract_text(response)
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GeminiRequest {
    system_instruction: GeminiContent,
    contents: Vec<GeminiContent>,
}

#[derive(Debug, Serialize)]
struct GeminiContent {
    #[serde(skip_serializing_if = "Option::is_none")]
    role: Option<String>,
    parts: Vec<GeminiPart>,
}

#[derive(Debug, Serialize)]
struct GeminiPart {
    text: String,
}

#[derive(Debug, Deserialize)]
struct GeminiResponse {
    #[serde(default)]
    candidates: Vec<GeminiCandidate>,
}

#[derive(Debug, Deserialize)]
struct GeminiCandidate {
    content: Option<GeminiResponseContent>,
}

#[derive(Debug, Deserialize)]
struct GeminiResponseContent {
    #[serde(default)]
    parts: Vec<GeminiResponsePart>,
}

#[derive(Debug, Deserialize)]
struct GeminiResponsePart {
    text: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn settings(base_url: Option<&str>) -> ProviderSettings {
        ProviderSettings {
            api_key: "g-key".to_string(),
            model: "gemini-1.5-pro".to_string(),
            base_url: base_url.map(str::to_string),
        }
    }

    #[test]
    fn url_targets_model_generate_content() {
        let provider = GeminiProvider::new(reqwest::Client::new(), &settings(None));
        assert_eq!(
            provider.url(),
            "https://generativelanguage.googleapis.com/v1beta/models/gemini-1.5-pro:generateContent"
        );
    }

    #[test]
    fn request_carries_system_instruction_separately() {
        let body = GeminiProvider::request_body(ProviderRequest {
            system_instruction: "분석가",
            user_prompt: "2세대 설명",
        });
        let value = serde_json::to_value(&body).expect("serializes");

        assert_eq!(value["systemInstruction"]["parts"][0]["text"], "분석가");
        assert!(value["systemInstruction"].get("role").is_none());
        assert_eq!(value["contents"][0]["role"], "user");
        assert_eq!(value["contents"][0]["parts"][0]["text"], "2세대 설명");
    }

    #[test]
    fn extract_text_joins_parts() {
        let response: GeminiResponse = serde_json::from_value(json!({
            "candidates": [{ "content": { "parts": [{ "text": "## 진단" }, { "text": " 결과" }] } }]
        }))
        .expect("response parses");
        assert_eq!(
            GeminiProvider::extract_text(response).expect("text"),
            "## 진단 결과"
        );
    }

    #[test]
    fn extract_text_rejects_blocked_candidates() {
        let response: GeminiResponse =
            serde_json::from_value(json!({ "candidates": [{ "finishReason": "SAFETY" }] }))
                .expect("response parses");
        assert!(matches!(
            GeminiProvider::extract_text(response),
            Err(ProviderError::EmptyResponse)
        ));

        let response: GeminiResponse =
            serde_json::from_value(json!({})).expect("response parses");
        assert!(matches!(
            GeminiProvider::extract_text(response),
            Err(ProviderError::MalformedResponse(_))
        ));
    }
}
