use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use axum::response::Response;
use axum::Router;
use serde_json::{json, Value};

use crate::catalog::Catalog;
use crate::explain::{explanation_router, ExplanationService};
use crate::providers::{
    ProviderError, ProviderGateway, ProviderKind, ProviderRequest, TextProvider,
};

pub(super) fn generation(id: u32, start: &str, end: &str) -> Value {
    json!({
        "generation": id,
        "name": format!("{id}세대 실손"),
        "join_period": {
            "start_date": start,
            "end_date": end,
            "description": format!("{start} ~ {end} 가입")
        },
        "coverage_structure": { "type": "기본형 + 특약형" },
        "guarantees": {
            "급여_의료비": { "coverage": format!("{id}세대 급여 보장"), "limits": "연간 5,000만원" }
        },
        "exclusions": { "주요_비보장_항목": ["치과 비급여", "한방 비급여", "미용 목적 시술"] },
        "special_features": [format!("{id}세대 핵심 특징"), "비급여 특약 분리"],
        "premium": { "level": "보통" },
        "pros": [format!("{id}세대 장점")],
        "cons": [format!("{id}세대 단점")]
    })
}

/// Two contiguous generations with a transition guide between them.
pub(super) fn catalog() -> Catalog {
    let document = json!({
        "generations": [
            generation(3, "2017-04-01", "2021-06-30"),
            generation(4, "2021-07-01", "2099-12-31")
        ],
        "switch_guide": {
            "from_3rd_to_4th": { "premium_change": "약 10~20% 인하" }
        }
    });
    Catalog::from_json_str(&document.to_string()).expect("fixture catalog is valid")
}

pub(super) enum Script {
    Answer(&'static str),
    Fail,
}

/// Provider double that records the prompts it receives.
pub(super) struct RecordingProvider {
    kind: ProviderKind,
    script: Script,
    calls: AtomicUsize,
    prompts: std::sync::Mutex<Vec<String>>,
}

impl RecordingProvider {
    pub(super) fn new(kind: ProviderKind, script: Script) -> Arc<Self> {
        Arc::new(Self {
            kind,
            script,
            calls: AtomicUsize::new(0),
            prompts: std::sync::Mutex::new(Vec::new()),
        })
    }

    pub(super) fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub(super) fn prompts(&self) -> Vec<String> {
        self.prompts.lock().expect("prompt log lock").clone()
    }
}

#[async_trait]
impl TextProvider for RecordingProvider {
    fn kind(&self) -> ProviderKind {
        self.kind
    }

    async fn generate(&self, request: ProviderRequest<'_>) -> Result<String, ProviderError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.prompts
            .lock()
            .expect("prompt log lock")
            .push(request.user_prompt.to_string());

        match self.script {
            Script::Answer(text) => Ok(text.to_string()),
            Script::Fail => Err(ProviderError::Status {
                status: 500,
                body: "upstream unavailable".to_string(),
            }),
        }
    }
}

pub(super) fn gateway(providers: Vec<Arc<RecordingProvider>>) -> ProviderGateway {
    let providers = providers
        .into_iter()
        .map(|provider| provider as Arc<dyn TextProvider>)
        .collect();
    ProviderGateway::new(providers, Duration::from_secs(1))
}

pub(super) fn build_service(providers: Vec<Arc<RecordingProvider>>) -> Arc<ExplanationService> {
    Arc::new(ExplanationService::new(
        Arc::new(catalog()),
        gateway(providers),
    ))
}

pub(super) fn offline_router() -> Router {
    explanation_router(build_service(Vec::new()))
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 64 * 1024)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}
