//! Explanation pipeline: date classification, prompt composition, provider
//! fallback, and the offline report.

pub mod mock;
pub mod prompt;
pub mod resolver;
pub mod router;
pub mod service;

#[cfg(test)]
mod tests;

pub use mock::synthesize;
pub use prompt::{compose, render_prompt, COMPOSITION_FAILED, SYSTEM_INSTRUCTION};
pub use resolver::{parse_join_date, resolve, Classification, ClassificationError};
pub use router::{explanation_router, ExplainRequest, GenerationSummary, ProviderStatus};
pub use service::{ExplainError, Explanation, ExplanationService, ExplanationSource};
