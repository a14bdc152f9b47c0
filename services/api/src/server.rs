use crate::cli::ServeArgs;
use crate::infra::{build_review_service, AppState};
use crate::routes::with_access_routes;
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use interview_access::config::AppConfig;
use interview_access::error::AppError;
use interview_access::telemetry;
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

    let (prometheus_layer, prometheus_handle) = PrometheusMetricLayer::pair();
    let readiness_flag = Arc::new(std::sync::atomic::AtomicBool::new(false));
    let app_state = AppState {
        readiness: readiness_flag.clone(),
        metrics: Arc::new(prometheus_handle),
    };

    let review_service = Arc::new(build_review_service(&config)?);

    let app = with_access_routes(review_service)
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(
        ?config.environment,
        %addr,
        upstream = %config.upstream.base_url,
        page_size = config.upstream.page_size.get(),
        cache_ttl_secs = config.cache.ttl.as_secs(),
        bearer_auth = config.auth.api_token.is_some(),
        "interview access service ready"
    );

    axum::serve(listener, app).await?;
    Ok(())
}
