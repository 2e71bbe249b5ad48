use crate::cli::ServeArgs;
use crate::infra::{seed_mothers, AppState};
use crate::routes::with_service_routes;
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use kannamma::config::{AppConfig, CallProviderKind, CampaignConfig};
use kannamma::error::AppError;
use kannamma::telemetry;
use kannamma::workflows::campaign::{
    CallProvider, CampaignEngine, CampaignState, MockCallProvider, WebhookCallProvider,
};
use kannamma::workflows::mothers::{InMemoryMotherRepository, MotherRegistryService};
use std::sync::atomic::Ordering;
use std::sync::Arc;
use tracing::info;

fn build_engine(config: &CampaignConfig) -> (CampaignEngine, Option<Arc<WebhookCallProvider>>) {
    match config.provider {
        CallProviderKind::Mock => {
            let provider: Arc<dyn CallProvider> = Arc::new(MockCallProvider::from_config(config));
            (CampaignEngine::new(provider), None)
        }
        CallProviderKind::Webhook => {
            let webhook = Arc::new(WebhookCallProvider::from_config(config));
            (CampaignEngine::new(webhook.clone()), Some(webhook))
        }
    }
}

pub(crate) async fn run(mut args: ServeArgs) -> Result<(), AppError> {
    let mut config = AppConfig::load()?;

    if let Some(host) = args.host.take() {
        config.server.host = host;
    }
    if let Some(port) = args.port.take() {
        config.server.port = port;
    }

    telemetry::init(&config.telemetry)?;

    let (prometheus_layer, prometheus_handle) = PrometheusMetricLayer::pair();
    let readiness_flag = Arc::new(std::sync::atomic::AtomicBool::new(false));
    let app_state = AppState {
        readiness: readiness_flag.clone(),
        metrics: Arc::new(prometheus_handle),
    };

    let repository = Arc::new(InMemoryMotherRepository::default());
    let registry = Arc::new(MotherRegistryService::new(repository));
    if !args.no_seed {
        let seeded = seed_mothers(&registry)?;
        info!(count = seeded.len(), "sample mothers loaded");
    }

    let (engine, webhook) = build_engine(&config.campaign);
    info!(provider = ?config.campaign.provider, "call provider selected");

    let app = with_service_routes(CampaignState {
        registry,
        engine,
        webhook,
    })
    .layer(Extension(app_state))
    .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(?config.environment, %addr, "maternal outreach service ready");

    axum::serve(listener, app).await?;
    Ok(())
}
