use std::fmt;
use std::sync::Arc;

use serde::Serialize;
use tracing::{info, warn};

use super::mock::synthesize;
use super::prompt::{compose, SYSTEM_INSTRUCTION};
use super::resolver::{resolve, Classification, ClassificationError};
use crate::catalog::{Catalog, GenerationId};
use crate::providers::{ProviderGateway, ProviderKind};

/// Where the explanation text came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ExplanationSource {
    Gemini,
    #[serde(rename = "openai")]
    OpenAi,
    Anthropic,
    Mock,
}

impl ExplanationSource {
    /// Wire name, as serialized in responses.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Gemini => "gemini",
            Self::OpenAi => "openai",
            Self::Anthropic => "anthropic",
            Self::Mock => "mock",
        }
    }
}

impl fmt::Display for ExplanationSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<ProviderKind> for ExplanationSource {
    fn from(kind: ProviderKind) -> Self {
        match kind {
            ProviderKind::Gemini => Self::Gemini,
            ProviderKind::OpenAi => Self::OpenAi,
            ProviderKind::Anthropic => Self::Anthropic,
        }
    }
}

/// Successful pipeline output returned to callers as JSON.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Explanation {
    pub generation: GenerationId,
    pub generation_name: String,
    pub explanation: String,
    pub source: ExplanationSource,
}

/// Terminal pipeline failures; the message is what the caller sees.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ExplainError {
    #[error(transparent)]
    Classification(#[from] ClassificationError),
    #[error("해당 세대의 기초 데이터를 찾을 수 없습니다.")]
    CatalogInconsistency(GenerationId),
}

/// Resolver → composer → provider gateway (or offline synthesizer).
///
/// Holds only read-only state, so one instance is shared by every request.
#[derive(Debug, Clone)]
pub struct ExplanationService {
    catalog: Arc<Catalog>,
    gateway: ProviderGateway,
}

impl ExplanationService {
    pub fn new(catalog: Arc<Catalog>, gateway: ProviderGateway) -> Self {
        Self { catalog, gateway }
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn gateway(&self) -> &ProviderGateway {
        &self.gateway
    }

    pub fn classify(&self, join_date: &str) -> Result<Classification, ClassificationError> {
        resolve(&self.catalog, join_date)
    }

    pub async fn explain(&self, join_date: &str) -> Result<Explanation, ExplainError> {
        let classification = self.classify(join_date)?;
        self.explain_classified(classification).await
    }

    pub(crate) async fn explain_classified(
        &self,
        classification: Classification,
    ) -> Result<Explanation, ExplainError> {
        let record = self
            .catalog
            .generation(classification.generation)
            .ok_or(ExplainError::CatalogInconsistency(classification.generation))?;

        let prompt = compose(&self.catalog, record);

        let (explanation, source) = match self.gateway.invoke(SYSTEM_INSTRUCTION, &prompt).await {
            Some(reply) => (reply.text, ExplanationSource::from(reply.provider)),
            None => {
                warn!(
                    generation = %record.generation,
                    "no provider produced an explanation; using offline report"
                );
                (synthesize(record), ExplanationSource::Mock)
            }
        };

        info!(
            generation = %record.generation,
            source = %source,
            "explanation ready"
        );

        Ok(Explanation {
            generation: classification.generation,
            generation_name: classification.generation_name,
            explanation,
            source,
        })
    }
}
