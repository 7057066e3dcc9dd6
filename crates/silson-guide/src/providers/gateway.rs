use std::sync::Arc;
use std::time::Duration;

use tracing::{info, warn};

use super::http::build_client;
use super::{
    AnthropicProvider, GeminiProvider, OpenAiProvider, ProviderError, ProviderKind,
    ProviderRequest, TextProvider,
};
use crate::config::ProvidersConfig;

/// First non-empty answer produced by the fallback chain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderReply {
    pub provider: ProviderKind,
    pub text: String,
}

/// Tries providers in priority order and returns the first non-empty text.
///
/// Every failure, including an expired per-call deadline, is logged and
/// swallowed; exhaustion is reported as `None`.
#[derive(Clone)]
pub struct ProviderGateway {
    providers: Vec<Arc<dyn TextProvider>>,
    call_timeout: Duration,
}

impl ProviderGateway {
    pub fn new(providers: Vec<Arc<dyn TextProvider>>, call_timeout: Duration) -> Self {
        Self {
            providers,
            call_timeout,
        }
    }

    /// Gateway with no providers; every explanation falls back to the synthesizer.
    pub fn disabled() -> Self {
        Self::new(Vec::new(), ProvidersConfig::disabled().call_timeout)
    }

    /// Build adapters for each provider whose credential is configured.
    pub fn from_config(config: &ProvidersConfig) -> Result<Self, ProviderError> {
        let client = build_client(config.call_timeout)?;
        let mut providers: Vec<Arc<dyn TextProvider>> = Vec::new();

        for kind in ProviderKind::ordered() {
            let Some(settings) = config.settings(kind) else {
                continue;
            };

            let provider: Arc<dyn TextProvider> = match kind {
                ProviderKind::Gemini => Arc::new(GeminiProvider::new(client.clone(), settings)),
                ProviderKind::OpenAi => Arc::new(OpenAiProvider::new(client.clone(), settings)),
                ProviderKind::Anthropic => {
                    Arc::new(AnthropicProvider::new(client.clone(), settings))
                }
            };
            providers.push(provider);
        }

        info!(
            providers = ?providers.iter().map(|p| p.kind()).collect::<Vec<_>>(),
            timeout_secs = config.call_timeout.as_secs(),
            "provider chain configured"
        );

        Ok(Self::new(providers, config.call_timeout))
    }

    /// Providers in the order they will be attempted.
    pub fn chain(&self) -> Vec<ProviderKind> {
        self.providers.iter().map(|provider| provider.kind()).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.providers.is_empty()
    }

    pub async fn invoke(
        &self,
        system_instruction: &str,
        user_prompt: &str,
    ) -> Option<ProviderReply> {
        let request = ProviderRequest {
            system_instruction,
            user_prompt,
        };

        for provider in &self.providers {
            let kind = provider.kind();
            let attempt = tokio::time::timeout(self.call_timeout, provider.generate(request));
            let outcome = match attempt.await {
                Ok(outcome) => outcome,
                Err(_) => Err(ProviderError::DeadlineExceeded(self.call_timeout)),
            };

            match outcome {
                Ok(text) if !text.trim().is_empty() => {
                    info!(provider = %kind, "explanation generated");
                    return Some(ProviderReply {
                        provider: kind,
                        text,
                    });
                }
                Ok(_) => warn!(
                    provider = %kind,
                    error = %ProviderError::EmptyResponse,
                    "provider failed; trying next"
                ),
                Err(err) => warn!(
                    provider = %kind,
                    error = %err,
                    "provider failed; trying next"
                ),
            }
        }

        None
    }
}

impl std::fmt::Debug for ProviderGateway {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProviderGateway")
            .field("chain", &self.chain())
            .field("call_timeout", &self.call_timeout)
            .finish()
    }
}
