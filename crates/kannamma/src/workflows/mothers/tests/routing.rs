use super::common::*;
use axum::body::Body;
use axum::extract::{Query, State};
use axum::http::{header, Request, StatusCode};
use serde_json::{json, Value};
use std::sync::Arc;
use tower::ServiceExt;

use crate::workflows::campaign::CallOutcome;
use crate::workflows::mothers::MotherRegistryService;

fn json_request(method: &str, uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(serde_json::to_vec(&body).unwrap()))
        .unwrap()
}

fn empty_request(method: &str, uri: &str) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

#[tokio::test]
async fn create_route_returns_created_record() {
    let (service, _) = build_service();
    let router = mother_router_with_service(service);

    let response = router
        .oneshot(json_request(
            "POST",
            "/api/v1/mothers",
            serde_json::to_value(high_risk_submission()).unwrap(),
        ))
        .await
        .expect("route executes");

    assert_eq!(response.status(), StatusCode::CREATED);
    let payload = read_json_body(response).await;
    assert_eq!(payload["risk_label"], "red");
    assert_eq!(payload["last_call_status"], "not-yet-called");
    assert_eq!(payload["contact"]["phone"], "+918888877777");
}

#[tokio::test]
async fn create_handler_returns_unprocessable_for_intake_violation() {
    let (service, _) = build_service();
    let mut invalid = submission();
    invalid.name = String::new();

    let response = crate::workflows::mothers::router::create_handler::<MemoryRepository>(
        State(Arc::new(service)),
        axum::Json(invalid),
    )
    .await;

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let payload = read_json_body(response).await;
    assert_eq!(payload["error"], "mother name is required");
}

#[tokio::test]
async fn list_handler_returns_internal_error_on_repository_failure() {
    let service = Arc::new(MotherRegistryService::new(Arc::new(UnavailableRepository)));

    let response = crate::workflows::mothers::router::list_handler::<UnavailableRepository>(
        State(service),
        Query(crate::workflows::mothers::router::MotherListQuery::default()),
    )
    .await;

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
}

#[tokio::test]
async fn list_route_returns_masked_summaries() {
    let (service, _) = build_service();
    service.create(submission()).expect("created");
    let router = mother_router_with_service(service);

    let response = router
        .oneshot(empty_request("GET", "/api/v1/mothers"))
        .await
        .expect("route executes");

    assert_eq!(response.status(), StatusCode::OK);
    let payload = read_json_body(response).await;
    let summaries = payload.as_array().expect("array");
    assert_eq!(summaries.len(), 1);
    assert_eq!(summaries[0]["masked_phone"], "+919***10");
    assert_eq!(summaries[0]["last_call_status"], "N/A");
}

#[tokio::test]
async fn list_route_filters_by_flagged_state() {
    let (service, _) = build_service();
    let calm = service.create(submission()).expect("created");
    let needs_help = service.create(high_risk_submission()).expect("created");
    service
        .apply_call_outcome(&needs_help.id, CallOutcome::AlertAcknowledged)
        .expect("outcome applied");
    let router = mother_router_with_service(service);

    let response = router
        .clone()
        .oneshot(empty_request("GET", "/api/v1/mothers?flagged=true"))
        .await
        .expect("route executes");
    assert_eq!(response.status(), StatusCode::OK);
    let payload = read_json_body(response).await;
    let flagged = payload.as_array().expect("array");
    assert_eq!(flagged.len(), 1);
    assert_eq!(flagged[0]["id"], needs_help.id.0.as_str());
    assert_eq!(flagged[0]["flagged"], true);

    let response = router
        .clone()
        .oneshot(empty_request("GET", "/api/v1/mothers?flagged=false"))
        .await
        .expect("route executes");
    let payload = read_json_body(response).await;
    let unflagged = payload.as_array().expect("array");
    assert_eq!(unflagged.len(), 1);
    assert_eq!(unflagged[0]["id"], calm.id.0.as_str());

    let response = router
        .oneshot(empty_request("GET", "/api/v1/mothers?flagged=maybe"))
        .await
        .expect("route executes");
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn unknown_mother_returns_not_found() {
    let (service, _) = build_service();
    let router = mother_router_with_service(service);

    let response = router
        .oneshot(empty_request("GET", "/api/v1/mothers/m-nobody"))
        .await
        .expect("route executes");

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn patch_route_reclassifies() {
    let (service, _) = build_service();
    let record = service.create(submission()).expect("created");
    let router = mother_router_with_service(service);

    let response = router
        .oneshot(json_request(
            "PATCH",
            &format!("/api/v1/mothers/{}", record.id),
            json!({ "medical_conditions": "High BP" }),
        ))
        .await
        .expect("route executes");

    assert_eq!(response.status(), StatusCode::OK);
    let payload = read_json_body(response).await;
    assert_eq!(payload["risk_label"], "yellow");
}

#[tokio::test]
async fn call_route_flags_on_help_request() {
    let (service, repository) = build_service();
    let record = service.create(submission()).expect("created");
    let router = mother_router_with_service(service);

    let response = router
        .oneshot(json_request(
            "POST",
            &format!("/api/v1/mothers/{}/call", record.id),
            json!({ "pressed": "2" }),
        ))
        .await
        .expect("route executes");

    assert_eq!(response.status(), StatusCode::OK);
    let payload = read_json_body(response).await;
    assert_eq!(payload["outcome"], "alert-acknowledged");
    assert_eq!(payload["mother"]["flagged"], true);
    assert_eq!(payload["mother"]["last_call_status"], "Missed (1)");

    let logs = repository.logs.lock().expect("log mutex poisoned");
    assert_eq!(logs.len(), 1);
    assert_eq!(logs[0].outcome, CallOutcome::AlertAcknowledged);
}

#[tokio::test]
async fn call_route_rejects_unknown_keys() {
    let (service, _) = build_service();
    let record = service.create(submission()).expect("created");
    let router = mother_router_with_service(service);

    let response = router
        .oneshot(json_request(
            "POST",
            &format!("/api/v1/mothers/{}/call", record.id),
            json!({ "pressed": "7" }),
        ))
        .await
        .expect("route executes");

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn visited_route_clears_flag() {
    let (service, _) = build_service();
    let record = service.create(submission()).expect("created");
    service.toggle_flag(&record.id).expect("flagged");
    let router = mother_router_with_service(service);

    let response = router
        .oneshot(empty_request(
            "POST",
            &format!("/api/v1/mothers/{}/visited", record.id),
        ))
        .await
        .expect("route executes");

    assert_eq!(response.status(), StatusCode::OK);
    let payload = read_json_body(response).await;
    assert_eq!(payload["visited"], true);
    assert_eq!(payload["flagged"], false);
}

#[tokio::test]
async fn risk_groups_and_call_logs_routes() {
    let (service, _) = build_service();
    let green = service.create(submission()).expect("green");
    service.create(high_risk_submission()).expect("red");
    service
        .apply_call_outcome(&green.id, CallOutcome::NoAnswer)
        .expect("missed");
    service
        .apply_call_outcome(&green.id, CallOutcome::Answered)
        .expect("answered");
    let router = mother_router_with_service(service);

    let response = router
        .clone()
        .oneshot(empty_request("GET", "/api/v1/mothers/risk-groups"))
        .await
        .expect("route executes");
    assert_eq!(response.status(), StatusCode::OK);
    let groups = read_json_body(response).await;
    assert_eq!(groups["red"].as_array().map(Vec::len), Some(1));
    assert_eq!(groups["green"].as_array().map(Vec::len), Some(1));

    let response = router
        .oneshot(empty_request("GET", "/api/v1/call-logs?limit=1"))
        .await
        .expect("route executes");
    assert_eq!(response.status(), StatusCode::OK);
    let logs = read_json_body(response).await;
    let logs = logs.as_array().expect("array");
    assert_eq!(logs.len(), 1);
    assert_eq!(logs[0]["outcome"], "answered");
}

#[tokio::test]
async fn call_route_returns_not_found_for_unknown_mother() {
    let (service, repository) = build_service();
    let router = mother_router_with_service(service);

    let response = router
        .oneshot(json_request(
            "POST",
            "/api/v1/mothers/m-nobody/call",
            json!({ "pressed": "1" }),
        ))
        .await
        .expect("route executes");

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert!(repository.logs.lock().expect("log mutex poisoned").is_empty());
}
