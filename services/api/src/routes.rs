use crate::infra::AppState;
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::Extension;
use axum::Json;
use credit_ai::workflows::underwriting::{
    underwriting_router, AlertPublisher, AssessmentRepository, PredictiveScorer, RiskAppetite,
    UnderwritingService,
};
use serde::Serialize;
use serde_json::json;
use std::sync::Arc;

#[derive(Debug, Serialize)]
pub(crate) struct ThresholdEntry {
    pub(crate) risk_appetite: RiskAppetite,
    pub(crate) threshold: f64,
}

#[derive(Debug, Serialize)]
pub(crate) struct ThresholdsResponse {
    pub(crate) default_appetite: RiskAppetite,
    pub(crate) thresholds: Vec<ThresholdEntry>,
}

pub(crate) fn with_underwriting_routes<S, R, A>(
    service: Arc<UnderwritingService<S, R, A>>,
) -> axum::Router
where
    S: PredictiveScorer + 'static,
    R: AssessmentRepository + 'static,
    A: AlertPublisher + 'static,
{
    underwriting_router(service)
        .route("/health", axum::routing::get(healthcheck))
        .route("/ready", axum::routing::get(readiness_endpoint))
        .route("/metrics", axum::routing::get(metrics_endpoint))
        .route(
            "/api/v1/underwriting/thresholds",
            axum::routing::get(thresholds_endpoint),
        )
}

pub(crate) async fn healthcheck() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

pub(crate) async fn readiness_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    let ready = state.readiness.load(std::sync::atomic::Ordering::Relaxed);
    let status = if ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    let payload = if ready {
        json!({ "status": "ready" })
    } else {
        json!({ "status": "initializing" })
    };

    (status, Json(payload))
}

pub(crate) async fn metrics_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        state.metrics.render(),
    )
}

pub(crate) async fn thresholds_endpoint(
    Extension(state): Extension<AppState>,
) -> Json<ThresholdsResponse> {
    let thresholds = state
        .engine
        .config()
        .thresholds
        .entries()
        .into_iter()
        .map(|(risk_appetite, threshold)| ThresholdEntry {
            risk_appetite,
            threshold,
        })
        .collect();

    Json(ThresholdsResponse {
        default_appetite: state.default_appetite,
        thresholds,
    })
}
