use crate::cli::ServeArgs;
use crate::infra::{build_explanation_service, AppState};
use crate::routes::with_explanation_routes;
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use silson_guide::config::AppConfig;
use silson_guide::error::AppError;
use silson_guide::telemetry;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use tracing::info;

pub(crate) async fn run(mut args: ServeArgs) -> Result<(), AppError> {
    let mut config = AppConfig::load()?;

    if let Some(host) = args.host.take() {
        config.server.host = host;
    }
    if let Some(port) = args.port.take() {
        config.server.port = port;
    }
    if let Some(catalog) = args.catalog.take() {
        config.catalog.path = catalog;
    }

    telemetry::init(&config.telemetry)?;

    let (prometheus_layer, prometheus_handle) = PrometheusMetricLayer::pair();
    let readiness_flag = Arc::new(std::sync::atomic::AtomicBool::new(false));
    let app_state = AppState {
        readiness: readiness_flag.clone(),
        metrics: Arc::new(prometheus_handle),
    };

    let explanation_service = build_explanation_service(&config.catalog.path, &config.providers)?;
    let generations = explanation_service.catalog().len();
    let providers = explanation_service.gateway().chain();

    let app = with_explanation_routes(explanation_service)
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(
        ?config.environment,
        %addr,
        generations,
        ?providers,
        "silson guide ready"
    );

    axum::serve(listener, app).await?;
    Ok(())
}
