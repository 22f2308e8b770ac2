use crate::cli::ServeArgs;
use crate::infra::{
    AppState, InMemoryAlertPublisher, InMemoryAssessmentRepository, ReferenceScorer,
};
use crate::routes::with_underwriting_routes;
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use credit_ai::config::AppConfig;
use credit_ai::error::AppError;
use credit_ai::telemetry;
use credit_ai::workflows::underwriting::{DecisionEngine, UnderwritingService};
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

    telemetry::init(&config.telemetry)?;

    let engine = Arc::new(DecisionEngine::new(config.underwriting.engine.clone())?);

    let (prometheus_layer, prometheus_handle) = PrometheusMetricLayer::pair();
    let readiness_flag = Arc::new(std::sync::atomic::AtomicBool::new(false));
    let app_state = AppState {
        readiness: readiness_flag.clone(),
        metrics: Arc::new(prometheus_handle),
        engine: engine.clone(),
        default_appetite: config.underwriting.default_appetite,
    };

    let underwriting_service = Arc::new(UnderwritingService::with_engine(
        engine,
        Arc::new(ReferenceScorer),
        Arc::new(InMemoryAssessmentRepository::default()),
        Arc::new(InMemoryAlertPublisher::default()),
    ));

    let app = with_underwriting_routes(underwriting_service)
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(
        ?config.environment,
        %addr,
        default_appetite = %config.underwriting.default_appetite,
        "underwriting service ready"
    );

    axum::serve(listener, app).await?;
    Ok(())
}
