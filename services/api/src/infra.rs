use chrono::NaiveDate;
use metrics_exporter_prometheus::PrometheusHandle;
use silson_guide::catalog::{Catalog, DATE_FORMAT};
use silson_guide::config::ProvidersConfig;
use silson_guide::error::AppError;
use silson_guide::explain::ExplanationService;
use silson_guide::providers::ProviderGateway;
use std::path::Path;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

/// Load the catalog (degrading to empty) and wire the configured provider chain.
pub(crate) fn build_explanation_service(
    catalog_path: &Path,
    providers: &ProvidersConfig,
) -> Result<Arc<ExplanationService>, AppError> {
    let catalog = Arc::new(Catalog::load_or_empty(catalog_path));
    let gateway = ProviderGateway::from_config(providers)?;
    Ok(Arc::new(ExplanationService::new(catalog, gateway)))
}

pub(crate) fn parse_date(raw: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(raw.trim(), DATE_FORMAT)
        .map_err(|err| format!("failed to parse '{raw}' as YYYY-MM-DD ({err})"))
}
