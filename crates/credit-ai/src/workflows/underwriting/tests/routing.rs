use super::common::*;
use axum::extract::State;
use axum::http::StatusCode;
use serde_json::json;
use std::sync::Arc;
use tower::ServiceExt;

use crate::workflows::underwriting::evaluation::EngineConfig;
use crate::workflows::underwriting::router::{submit_handler, AssessmentRequest};
use crate::workflows::underwriting::UnderwritingService;

fn request(appetite: &str) -> AssessmentRequest {
    AssessmentRequest {
        application: form(&approvable_record()),
        risk_appetite: appetite.to_string(),
    }
}

fn post_json(uri: &str, payload: serde_json::Value) -> axum::http::Request<axum::body::Body> {
    axum::http::Request::post(uri)
        .header(axum::http::header::CONTENT_TYPE, "application/json")
        .body(axum::body::Body::from(
            serde_json::to_vec(&payload).unwrap(),
        ))
        .unwrap()
}

#[tokio::test]
async fn submit_handler_returns_conflict_on_duplicate() {
    let service = Arc::new(
        UnderwritingService::new(
            Arc::new(FixedScorer(0.185)),
            Arc::new(ConflictRepository),
            Arc::new(MemoryAlerts::default()),
            EngineConfig::default(),
        )
        .unwrap(),
    );

    let response = submit_handler::<FixedScorer, ConflictRepository, MemoryAlerts>(
        State(service),
        axum::Json(request("balanced")),
    )
    .await;

    assert_eq!(response.status(), StatusCode::CONFLICT);
}

#[tokio::test]
async fn submit_handler_returns_internal_error_on_repository_failure() {
    let service = Arc::new(
        UnderwritingService::new(
            Arc::new(FixedScorer(0.185)),
            Arc::new(UnavailableRepository),
            Arc::new(MemoryAlerts::default()),
            EngineConfig::default(),
        )
        .unwrap(),
    );

    let response = submit_handler::<FixedScorer, UnavailableRepository, MemoryAlerts>(
        State(service),
        axum::Json(request("balanced")),
    )
    .await;

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
}

#[tokio::test]
async fn submit_handler_returns_bad_gateway_when_scorer_is_offline() {
    let service = Arc::new(
        UnderwritingService::new(
            Arc::new(OfflineScorer),
            Arc::new(MemoryRepository::default()),
            Arc::new(MemoryAlerts::default()),
            EngineConfig::default(),
        )
        .unwrap(),
    );

    let response = submit_handler::<OfflineScorer, MemoryRepository, MemoryAlerts>(
        State(service),
        axum::Json(request("balanced")),
    )
    .await;

    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    let body = read_json_body(response).await;
    assert_eq!(
        body["error"],
        json!("predictive scorer unavailable: model endpoint timed out")
    );
}

#[tokio::test]
async fn submit_route_accepts_payloads() {
    let (service, _, _) = build_service(0.185);
    let router = router_with_service(service);

    let response = router
        .oneshot(post_json(
            "/api/v1/underwriting/assessments",
            json!({
                "application": form(&approvable_record()),
                "risk_appetite": "balanced",
            }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::ACCEPTED);
    let body = read_json_body(response).await;
    assert_eq!(body["decision"], json!("APPROVE"));
    assert_eq!(body["grade"], json!("B"));
    assert_eq!(body["conflict"], json!(false));
    assert!(body["assessment_id"]
        .as_str()
        .expect("id is a string")
        .starts_with("asm-"));
}

#[tokio::test]
async fn submit_route_rejects_unknown_appetite() {
    let (service, _, _) = build_service(0.185);
    let router = router_with_service(service);

    let response = router
        .oneshot(post_json(
            "/api/v1/underwriting/assessments",
            json!({
                "application": form(&approvable_record()),
                "risk_appetite": "reckless",
            }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let body = read_json_body(response).await;
    assert_eq!(
        body["error"],
        json!("invalid configuration: unrecognized risk appetite 'reckless'")
    );
}

#[tokio::test]
async fn submit_route_rejects_incomplete_applications() {
    let (service, _, _) = build_service(0.185);
    let router = router_with_service(service);

    let response = router
        .oneshot(post_json(
            "/api/v1/underwriting/assessments",
            json!({
                "application": { "age": 40, "annual_income": 50000.0 },
                "risk_appetite": "balanced",
            }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn verdict_route_returns_full_rationale() {
    let (service, _, _) = build_service(0.99);
    let router = router_with_service(service);

    let response = router
        .oneshot(post_json(
            "/api/v1/underwriting/verdicts",
            json!({
                "application": form(&distressed_record()),
                "risk_appetite": "balanced",
                "predictive": { "probability": 0.60 },
            }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = read_json_body(response).await;
    assert_eq!(body["decision"], json!("REJECT"));
    assert_eq!(body["overrides"].as_array().map(Vec::len), Some(5));
    assert_eq!(body["overrides"][0]["rule"], json!("extreme_risk_weak_profile"));
    assert_eq!(body["overrides"][0]["forced_decision"], json!("REJECT"));
    assert!(body["rationale"][0]
        .as_str()
        .expect("rationale entries are strings")
        .starts_with("override extreme_risk_weak_profile forced REJECT"));
}

#[tokio::test]
async fn status_route_returns_stored_assessment() {
    let (service, _, _) = build_service(0.30);
    let stored = service
        .submit(form(&approvable_record()), "conservative")
        .expect("submission succeeds");
    let router = router_with_service(service);

    let response = router
        .oneshot(
            axum::http::Request::get(format!(
                "/api/v1/underwriting/assessments/{}",
                stored.assessment_id.0
            ))
            .body(axum::body::Body::empty())
            .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = read_json_body(response).await;
    assert_eq!(body["decision"], json!("REVIEW"));
    assert_eq!(body["conflict"], json!(true));
}

#[tokio::test]
async fn status_route_returns_not_found_for_unknown_ids() {
    let (service, _, _) = build_service(0.185);
    let router = router_with_service(service);

    let response = router
        .oneshot(
            axum::http::Request::get("/api/v1/underwriting/assessments/asm-404404")
                .body(axum::body::Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let body = read_json_body(response).await;
    assert_eq!(body["assessment_id"], json!("asm-404404"));
    assert_eq!(body["error"], json!("assessment not found"));
}
