use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::post,
    Json, Router,
};
use serde::Deserialize;
use serde_json::json;

use super::engine::CampaignEngine;
use super::webhook::{IvrCallback, WebhookCallProvider, WebhookDelivery};
use crate::workflows::mothers::domain::MotherId;
use crate::workflows::mothers::repository::MotherRepository;
use crate::workflows::mothers::router::error_response;
use crate::workflows::mothers::service::MotherRegistryService;
use crate::workflows::mothers::views::MotherSummaryView;

/// Shared state for campaign routes.
///
/// `webhook` is set only when the engine was built over a
/// [`WebhookCallProvider`], so IVR callbacks reach the same pending calls.
pub struct CampaignState<R> {
    pub registry: Arc<MotherRegistryService<R>>,
    pub engine: CampaignEngine,
    pub webhook: Option<Arc<WebhookCallProvider>>,
}

impl<R> Clone for CampaignState<R> {
    fn clone(&self) -> Self {
        Self {
            registry: self.registry.clone(),
            engine: self.engine.clone(),
            webhook: self.webhook.clone(),
        }
    }
}

/// Optional body for `POST /api/v1/campaigns`.
///
/// Every mother is called only when the body is empty or leaves out
/// `mother_ids`; a body that does not parse is rejected.
#[derive(Debug, Default, Deserialize)]
pub(crate) struct CampaignRequest {
    #[serde(default)]
    mother_ids: Option<Vec<MotherId>>,
}

pub fn campaign_router<R>(state: CampaignState<R>) -> Router
where
    R: MotherRepository + 'static,
{
    Router::new()
        .route("/api/v1/campaigns", post(run_campaign_handler::<R>))
        .route("/api/v1/ivr/webhook", post(ivr_webhook_handler::<R>))
        .with_state(state)
}

pub(crate) async fn run_campaign_handler<R>(
    State(state): State<CampaignState<R>>,
    body: Bytes,
) -> Response
where
    R: MotherRepository + 'static,
{
    let request = match parse_campaign_request(&body) {
        Ok(request) => request,
        Err(error) => {
            let payload = json!({ "error": format!("invalid campaign request: {error}") });
            return (StatusCode::UNPROCESSABLE_ENTITY, Json(payload)).into_response();
        }
    };
    let targets = match state.registry.campaign_targets(request.mother_ids.as_deref()) {
        Ok(targets) => targets,
        Err(error) => return error_response(error),
    };

    let Some(results) = state.engine.start(targets).wait().await else {
        let payload = json!({ "error": "campaign run ended before completion" });
        return (StatusCode::INTERNAL_SERVER_ERROR, Json(payload)).into_response();
    };

    let reconciliation = state.registry.apply_campaign_results(&results);
    let updated: Vec<MotherSummaryView> = reconciliation
        .updated
        .iter()
        .map(MotherSummaryView::from_record)
        .collect();

    let payload = json!({
        "summary": results.summary(),
        "results": results,
        "updated": updated,
        "skipped": reconciliation.skipped,
    });
    (StatusCode::OK, Json(payload)).into_response()
}

fn parse_campaign_request(body: &[u8]) -> Result<CampaignRequest, serde_json::Error> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(CampaignRequest::default());
    }
    serde_json::from_slice(body)
}

pub(crate) async fn ivr_webhook_handler<R>(
    State(state): State<CampaignState<R>>,
    Json(callback): Json<IvrCallback>,
) -> Response
where
    R: MotherRepository + 'static,
{
    let Some(provider) = state.webhook.as_ref() else {
        let payload = json!({ "error": "IVR webhook provider is not enabled" });
        return (StatusCode::NOT_FOUND, Json(payload)).into_response();
    };

    let delivery = provider.deliver(&callback);
    let status = match delivery {
        WebhookDelivery::Resolved(_) => StatusCode::OK,
        WebhookDelivery::Ignored => StatusCode::ACCEPTED,
        WebhookDelivery::NoPendingCall => StatusCode::NOT_FOUND,
    };
    (status, Json(delivery)).into_response()
}
