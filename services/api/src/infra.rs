use interview_access::access::{policy_from_config, AccessReviewService, LeverClient};
use interview_access::config::AppConfig;
use interview_access::error::AppError;
use metrics_exporter_prometheus::PrometheusHandle;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

/// Wires the Lever client, snapshot cache, and caller policy from config.
pub(crate) fn build_review_service(
    config: &AppConfig,
) -> Result<AccessReviewService<LeverClient>, AppError> {
    let client = LeverClient::from_config(&config.upstream)?;
    let service = AccessReviewService::new(
        Arc::new(client),
        config.upstream.page_size,
        config.cache.ttl,
    )
    .with_policy(Arc::from(policy_from_config(&config.auth)));
    Ok(service)
}
