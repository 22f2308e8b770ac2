use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Router,
};
use serde::Deserialize;
use serde_json::json;

use super::domain::{AssessmentId, PredictiveAssessment};
use super::intake::ApplicationForm;
use super::repository::{AlertPublisher, AssessmentRepository, RepositoryError};
use super::scorer::PredictiveScorer;
use super::service::{UnderwritingService, UnderwritingServiceError};

/// Request body for scorer-backed assessments.
#[derive(Debug, Deserialize)]
pub struct AssessmentRequest {
    pub application: ApplicationForm,
    pub risk_appetite: String,
}

/// Request body for stateless assessments with a caller-supplied probability.
#[derive(Debug, Deserialize)]
pub struct VerdictRequest {
    pub application: ApplicationForm,
    pub risk_appetite: String,
    pub predictive: PredictiveAssessment,
}

/// Router builder exposing HTTP endpoints for underwriting assessments.
pub fn underwriting_router<S, R, A>(service: Arc<UnderwritingService<S, R, A>>) -> Router
where
    S: PredictiveScorer + 'static,
    R: AssessmentRepository + 'static,
    A: AlertPublisher + 'static,
{
    Router::new()
        .route(
            "/api/v1/underwriting/assessments",
            post(submit_handler::<S, R, A>),
        )
        .route(
            "/api/v1/underwriting/assessments/:assessment_id",
            get(status_handler::<S, R, A>),
        )
        .route(
            "/api/v1/underwriting/verdicts",
            post(verdict_handler::<S, R, A>),
        )
        .with_state(service)
}

pub(crate) async fn submit_handler<S, R, A>(
    State(service): State<Arc<UnderwritingService<S, R, A>>>,
    axum::Json(request): axum::Json<AssessmentRequest>,
) -> Response
where
    S: PredictiveScorer + 'static,
    R: AssessmentRepository + 'static,
    A: AlertPublisher + 'static,
{
    match service.submit(request.application, &request.risk_appetite) {
        Ok(record) => (StatusCode::ACCEPTED, axum::Json(record.status_view())).into_response(),
        Err(err) => error_response(err),
    }
}

pub(crate) async fn verdict_handler<S, R, A>(
    State(service): State<Arc<UnderwritingService<S, R, A>>>,
    axum::Json(request): axum::Json<VerdictRequest>,
) -> Response
where
    S: PredictiveScorer + 'static,
    R: AssessmentRepository + 'static,
    A: AlertPublisher + 'static,
{
    match service.assess_with(
        request.application,
        &request.risk_appetite,
        &request.predictive,
    ) {
        Ok(verdict) => (StatusCode::OK, axum::Json(verdict)).into_response(),
        Err(err) => error_response(err),
    }
}

pub(crate) async fn status_handler<S, R, A>(
    State(service): State<Arc<UnderwritingService<S, R, A>>>,
    Path(assessment_id): Path<String>,
) -> Response
where
    S: PredictiveScorer + 'static,
    R: AssessmentRepository + 'static,
    A: AlertPublisher + 'static,
{
    let id = AssessmentId(assessment_id);
    match service.get(&id) {
        Ok(record) => (StatusCode::OK, axum::Json(record.status_view())).into_response(),
        Err(UnderwritingServiceError::Repository(RepositoryError::NotFound)) => {
            let payload = json!({
                "assessment_id": id.0,
                "error": "assessment not found",
            });
            (StatusCode::NOT_FOUND, axum::Json(payload)).into_response()
        }
        Err(err) => error_response(err),
    }
}

/// HTTP status for a service failure, shared with `AppError`.
pub(crate) fn status_for(err: &UnderwritingServiceError) -> StatusCode {
    match err {
        UnderwritingServiceError::Assessment(_) => StatusCode::UNPROCESSABLE_ENTITY,
        UnderwritingServiceError::Scorer(_) => StatusCode::BAD_GATEWAY,
        UnderwritingServiceError::Repository(RepositoryError::Conflict) => StatusCode::CONFLICT,
        UnderwritingServiceError::Repository(RepositoryError::NotFound) => StatusCode::NOT_FOUND,
        UnderwritingServiceError::Repository(_) | UnderwritingServiceError::Alert(_) => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    }
}

fn error_response(err: UnderwritingServiceError) -> Response {
    let status = status_for(&err);
    let payload = json!({
        "error": err.to_string(),
    });
    (status, axum::Json(payload)).into_response()
}
