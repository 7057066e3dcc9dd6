//! Text-generation providers and the priority-ordered gateway in front of them.

mod anthropic;
mod gateway;
mod gemini;
mod http;
mod openai;

pub use anthropic::AnthropicProvider;
pub use gateway::{ProviderGateway, ProviderReply};
pub use gemini::GeminiProvider;
pub use openai::OpenAiProvider;

use async_trait::async_trait;
use serde::Serialize;
use std::fmt;
use std::time::Duration;

/// Supported providers, in fixed fallback priority.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum ProviderKind {
    #[serde(rename = "gemini")]
    Gemini,
    #[serde(rename = "openai")]
    OpenAi,
    #[serde(rename = "anthropic")]
    Anthropic,
}

impl ProviderKind {
    pub const fn ordered() -> [Self; 3] {
        [Self::Gemini, Self::OpenAi, Self::Anthropic]
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Gemini => "Google Gemini",
            Self::OpenAi => "OpenAI",
            Self::Anthropic => "Anthropic",
        }
    }

    pub const fn credential_env(self) -> &'static str {
        match self {
            Self::Gemini => "GOOGLE_API_KEY",
            Self::OpenAi => "OPENAI_API_KEY",
            Self::Anthropic => "ANTHROPIC_API_KEY",
        }
    }

    pub const fn model_env(self) -> &'static str {
        match self {
            Self::Gemini => "GEMINI_MODEL",
            Self::OpenAi => "OPENAI_MODEL",
            Self::Anthropic => "ANTHROPIC_MODEL",
        }
    }

    pub const fn base_url_env(self) -> &'static str {
        match self {
            Self::Gemini => "GEMINI_BASE_URL",
            Self::OpenAi => "OPENAI_BASE_URL",
            Self::Anthropic => "ANTHROPIC_BASE_URL",
        }
    }

    pub const fn default_model(self) -> &'static str {
        match self {
            Self::Gemini => "gemini-1.5-pro",
            Self::OpenAi => "gpt-4o",
            Self::Anthropic => "claude-3-5-sonnet-20241022",
        }
    }
}

impl fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Provider-agnostic request: a system-level instruction plus one user turn.
#[derive(Debug, Clone, Copy)]
pub struct ProviderRequest<'a> {
    pub system_instruction: &'a str,
    pub user_prompt: &'a str,
}

/// Reasons a single provider attempt yields no text. Always absorbed by the gateway.
#[derive(Debug, thiserror::Error)]
pub enum ProviderError {
    #[error("http client could not be constructed: {0}")]
    Client(String),
    #[error("transport failure: {0}")]
    Transport(String),
    #[error("provider returned status {status}: {body}")]
    Status { status: u16, body: String },
    #[error("malformed provider response: {0}")]
    MalformedResponse(String),
    #[error("provider returned no text")]
    EmptyResponse,
    #[error("provider did not answer within {0:?}")]
    DeadlineExceeded(Duration),
}

/// Adapter seam for a text-generation service.
///
/// Adapters return a tagged result and never panic on bad responses; the gateway
/// decides what happens next.
#[async_trait]
pub trait TextProvider: Send + Sync {
    fn kind(&self) -> ProviderKind;

    async fn generate(&self, request: ProviderRequest<'_>) -> Result<String, ProviderError>;
}
