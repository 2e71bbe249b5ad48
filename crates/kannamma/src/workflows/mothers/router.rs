use std::sync::Arc;
use std::time::Duration;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;
use serde_json::json;

use super::domain::{MotherId, MotherSubmission, MotherUpdate};
use super::repository::{MotherRepository, RepositoryError};
use super::service::{MotherRegistryService, MotherServiceError};
use super::views::MotherSummaryView;
use crate::workflows::campaign::{run_single_call, CallTarget, MenuKey, SingleCallError};

const DEFAULT_CALL_LOG_LIMIT: usize = 100;

#[derive(Debug, Deserialize)]
pub(crate) struct CallLogQuery {
    limit: Option<usize>,
}

/// Optional `?flagged=true|false` filter for the mother list.
#[derive(Debug, Default, Deserialize)]
pub(crate) struct MotherListQuery {
    pub(crate) flagged: Option<bool>,
}

/// Menu key pressed at the end of a single call, e.g. `{ "pressed": "2" }`.
#[derive(Debug, Deserialize)]
pub(crate) struct SingleCallRequest {
    pressed: String,
}

/// Router builder exposing registration, intents, and risk views.
pub fn mother_router<R>(service: Arc<MotherRegistryService<R>>) -> Router
where
    R: MotherRepository + 'static,
{
    Router::new()
        .route(
            "/api/v1/mothers",
            get(list_handler::<R>).post(create_handler::<R>),
        )
        .route(
            "/api/v1/mothers/:mother_id",
            get(get_handler::<R>).patch(update_handler::<R>),
        )
        .route(
            "/api/v1/mothers/:mother_id/visited",
            post(visited_handler::<R>),
        )
        .route("/api/v1/mothers/:mother_id/flag", post(flag_handler::<R>))
        .route("/api/v1/mothers/:mother_id/call", post(call_handler::<R>))
        .route("/api/v1/mothers/risk-groups", get(risk_groups_handler::<R>))
        .route("/api/v1/call-logs", get(call_logs_handler::<R>))
        .with_state(service)
}

pub(crate) fn error_response(error: MotherServiceError) -> Response {
    let status = match &error {
        MotherServiceError::Intake(_) => StatusCode::UNPROCESSABLE_ENTITY,
        MotherServiceError::Repository(RepositoryError::NotFound) => StatusCode::NOT_FOUND,
        MotherServiceError::Repository(RepositoryError::Conflict) => StatusCode::CONFLICT,
        MotherServiceError::Repository(RepositoryError::Unavailable(_)) => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    };
    let payload = json!({ "error": error.to_string() });
    (status, Json(payload)).into_response()
}

pub(crate) async fn list_handler<R>(
    State(service): State<Arc<MotherRegistryService<R>>>,
    Query(query): Query<MotherListQuery>,
) -> Response
where
    R: MotherRepository + 'static,
{
    let records = match query.flagged {
        Some(flagged) => service.flagged(flagged),
        None => service.list(),
    };
    match records {
        Ok(records) => {
            let views: Vec<MotherSummaryView> =
                records.iter().map(MotherSummaryView::from_record).collect();
            (StatusCode::OK, Json(views)).into_response()
        }
        Err(error) => error_response(error),
    }
}

pub(crate) async fn create_handler<R>(
    State(service): State<Arc<MotherRegistryService<R>>>,
    Json(submission): Json<MotherSubmission>,
) -> Response
where
    R: MotherRepository + 'static,
{
    match service.create(submission) {
        Ok(record) => (StatusCode::CREATED, Json(record)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn get_handler<R>(
    State(service): State<Arc<MotherRegistryService<R>>>,
    Path(mother_id): Path<String>,
) -> Response
where
    R: MotherRepository + 'static,
{
    match service.get(&MotherId(mother_id)) {
        Ok(record) => (StatusCode::OK, Json(record)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn update_handler<R>(
    State(service): State<Arc<MotherRegistryService<R>>>,
    Path(mother_id): Path<String>,
    Json(update): Json<MotherUpdate>,
) -> Response
where
    R: MotherRepository + 'static,
{
    match service.update(&MotherId(mother_id), update) {
        Ok(record) => (StatusCode::OK, Json(record)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn visited_handler<R>(
    State(service): State<Arc<MotherRegistryService<R>>>,
    Path(mother_id): Path<String>,
) -> Response
where
    R: MotherRepository + 'static,
{
    match service.mark_visited(&MotherId(mother_id)) {
        Ok(record) => (StatusCode::OK, Json(MotherSummaryView::from_record(&record))).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn flag_handler<R>(
    State(service): State<Arc<MotherRegistryService<R>>>,
    Path(mother_id): Path<String>,
) -> Response
where
    R: MotherRepository + 'static,
{
    match service.toggle_flag(&MotherId(mother_id)) {
        Ok(record) => (StatusCode::OK, Json(MotherSummaryView::from_record(&record))).into_response(),
        Err(error) => error_response(error),
    }
}

/// Settle a health-worker initiated call with the key the mother pressed.
pub(crate) async fn call_handler<R>(
    State(service): State<Arc<MotherRegistryService<R>>>,
    Path(mother_id): Path<String>,
    Json(request): Json<SingleCallRequest>,
) -> Response
where
    R: MotherRepository + 'static,
{
    let mother_id = MotherId(mother_id);
    let key = match request.pressed.parse::<MenuKey>() {
        Ok(key) => key,
        Err(error) => return unprocessable(error),
    };
    let target = match service.get(&mother_id) {
        Ok(record) => CallTarget::from(&record),
        Err(error) => return error_response(error),
    };

    // The key arrives with the request, so the greeting has already played.
    let outcome = match run_single_call(target, Duration::ZERO, async move { key }).await {
        Ok(outcome) => outcome,
        Err(error) => return unprocessable(error),
    };

    match service.apply_call_outcome(&mother_id, outcome) {
        Ok(record) => {
            let payload = json!({
                "outcome": outcome,
                "mother": MotherSummaryView::from_record(&record),
            });
            (StatusCode::OK, Json(payload)).into_response()
        }
        Err(error) => error_response(error),
    }
}

fn unprocessable(error: SingleCallError) -> Response {
    let payload = json!({ "error": error.to_string() });
    (StatusCode::UNPROCESSABLE_ENTITY, Json(payload)).into_response()
}

pub(crate) async fn risk_groups_handler<R>(
    State(service): State<Arc<MotherRegistryService<R>>>,
) -> Response
where
    R: MotherRepository + 'static,
{
    match service.risk_groups() {
        Ok(groups) => (StatusCode::OK, Json(groups)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn call_logs_handler<R>(
    State(service): State<Arc<MotherRegistryService<R>>>,
    Query(query): Query<CallLogQuery>,
) -> Response
where
    R: MotherRepository + 'static,
{
    let limit = query.limit.unwrap_or(DEFAULT_CALL_LOG_LIMIT);
    match service.call_logs(limit) {
        Ok(entries) => (StatusCode::OK, Json(entries)).into_response(),
        Err(error) => error_response(error),
    }
}
