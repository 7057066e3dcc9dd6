use crate::catalog::CatalogError;
use crate::config::ConfigError;
use crate::explain::{ClassificationError, ExplainError};
use crate::providers::ProviderError;
use crate::telemetry::TelemetryError;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use std::fmt;

#[derive(Debug)]
pub enum AppError {
    Config(ConfigError),
    Telemetry(TelemetryError),
    Io(std::io::Error),
    Server(axum::Error),
    Catalog(CatalogError),
    Provider(ProviderError),
    Explain(ExplainError),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::Config(err) => write!(f, "configuration error: {}", err),
            AppError::Telemetry(err) => write!(f, "telemetry error: {}", err),
            AppError::Io(err) => write!(f, "io error: {}", err),
            AppError::Server(err) => write!(f, "server error: {}", err),
            AppError::Catalog(err) => write!(f, "catalog error: {}", err),
            AppError::Provider(err) => write!(f, "provider setup error: {}", err),
            AppError::Explain(err) => write!(f, "{}", err),
        }
    }
}

impl std::error::Error for AppError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            AppError::Config(err) => Some(err),
            AppError::Telemetry(err) => Some(err),
            AppError::Io(err) => Some(err),
            AppError::Server(err) => Some(err),
            AppError::Catalog(err) => Some(err),
            AppError::Provider(err) => Some(err),
            AppError::Explain(err) => Some(err),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = match &self {
            AppError::Explain(ExplainError::Classification(
                ClassificationError::InvalidDateFormat { .. },
            )) => StatusCode::BAD_REQUEST,
            AppError::Explain(ExplainError::Classification(
                ClassificationError::NoMatchingGeneration { .. },
            )) => StatusCode::NOT_FOUND,
            AppError::Config(_)
            | AppError::Telemetry(_)
            | AppError::Io(_)
            | AppError::Server(_)
            | AppError::Catalog(_)
            | AppError::Provider(_)
            | AppError::Explain(ExplainError::CatalogInconsistency(_)) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };

        let body = Json(json!({ "error": self.to_string() }));
        (status, body).into_response()
    }
}

impl From<ConfigError> for AppError {
    fn from(value: ConfigError) -> Self {
        Self::Config(value)
    }
}

impl From<TelemetryError> for AppError {
    fn from(value: TelemetryError) -> Self {
        Self::Telemetry(value)
    }
}

impl From<std::io::Error> for AppError {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value)
    }
}

impl From<axum::Error> for AppError {
    fn from(value: axum::Error) -> Self {
        Self::Server(value)
    }
}

impl From<CatalogError> for AppError {
    fn from(value: CatalogError) -> Self {
        Self::Catalog(value)
    }
}

impl From<ProviderError> for AppError {
    fn from(value: ProviderError) -> Self {
        Self::Provider(value)
    }
}

impl From<ExplainError> for AppError {
    fn from(value: ExplainError) -> Self {
        Self::Explain(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::GenerationId;
    use chrono::NaiveDate;

    async fn error_body(response: Response) -> serde_json::Value {
        let body = axum::body::to_bytes(response.into_body(), 1024)
            .await
            .expect("read body");
        serde_json::from_slice(&body).expect("json payload")
    }

    #[tokio::test]
    async fn malformed_dates_render_as_bad_request() {
        let err = AppError::from(ExplainError::from(ClassificationError::InvalidDateFormat {
            input: "yesterday".to_string(),
        }));

        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = error_body(response).await;
        assert_eq!(body["error"], "유효하지 않은 날짜 형식입니다. (YYYY-MM-DD)");
    }

    #[tokio::test]
    async fn unmatched_dates_render_as_not_found() {
        let err = AppError::from(ExplainError::from(
            ClassificationError::NoMatchingGeneration {
                date: NaiveDate::from_ymd_opt(1999, 1, 1).expect("valid date"),
            },
        ));

        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        let body = error_body(response).await;
        assert_eq!(
            body["error"],
            "해당 날짜에 맞는 실손 보험 세대를 찾을 수 없습니다."
        );
    }

    #[tokio::test]
    async fn catalog_inconsistency_is_internal_error() {
        let err = AppError::from(ExplainError::CatalogInconsistency(GenerationId(2)));
        assert_eq!(err.into_response().status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
