use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::json;

use super::service::ExplanationService;
use crate::catalog::GenerationId;
use crate::error::AppError;
use crate::providers::ProviderKind;

pub(crate) const MISSING_JOIN_DATE: &str = "가입일이 필요합니다.";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ExplainRequest {
    #[serde(default)]
    pub join_date: Option<String>,
}

/// Catalog entry exposed to front-ends that want to show the generation table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GenerationSummary {
    pub generation: GenerationId,
    pub name: String,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub period: String,
    pub premium_level: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProviderStatus {
    pub provider: ProviderKind,
    pub label: &'static str,
    pub priority: usize,
    pub configured: bool,
}

/// Router builder exposing the explanation endpoints.
pub fn explanation_router(service: Arc<ExplanationService>) -> Router {
    Router::new()
        .route("/api/analyze-insurance", post(analyze_handler))
        .route("/api/generations", get(generations_handler))
        .route("/api/providers", get(providers_handler))
        .with_state(service)
}

pub(crate) async fn analyze_handler(
    State(service): State<Arc<ExplanationService>>,
    payload: Result<Json<ExplainRequest>, JsonRejection>,
) -> Response {
    let request = match payload {
        Ok(Json(request)) => request,
        Err(rejection) => {
            return error_response(StatusCode::BAD_REQUEST, rejection.body_text());
        }
    };

    let join_date = match request.join_date.as_deref().map(str::trim) {
        Some(date) if !date.is_empty() => date,
        _ => return error_response(StatusCode::BAD_REQUEST, MISSING_JOIN_DATE.to_string()),
    };

    match service.explain(join_date).await {
        Ok(explanation) => (StatusCode::OK, Json(explanation)).into_response(),
        Err(err) => AppError::from(err).into_response(),
    }
}

pub(crate) async fn generations_handler(
    State(service): State<Arc<ExplanationService>>,
) -> Json<Vec<GenerationSummary>> {
    let summaries = service
        .catalog()
        .generations()
        .iter()
        .map(|record| GenerationSummary {
            generation: record.generation,
            name: record.name.clone(),
            start_date: record.join_period.start_date.clone(),
            end_date: record.join_period.end_date.clone(),
            period: record.join_period.label(),
            premium_level: record.premium.level.clone(),
        })
        .collect();

    Json(summaries)
}

pub(crate) async fn providers_handler(
    State(service): State<Arc<ExplanationService>>,
) -> Json<serde_json::Value> {
    let chain = service.gateway().chain();
    let providers: Vec<ProviderStatus> = ProviderKind::ordered()
        .into_iter()
        .enumerate()
        .map(|(index, provider)| ProviderStatus {
            provider,
            label: provider.label(),
            priority: index + 1,
            configured: chain.contains(&provider),
        })
        .collect();

    Json(json!({
        "providers": providers,
        "fallback": "mock",
    }))
}

fn error_response(status: StatusCode, message: String) -> Response {
    (status, Json(json!({ "error": message }))).into_response()
}
