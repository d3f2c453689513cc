use std::time::Duration;

use tracing::warn;

use crate::ops::LiveFeedSnapshot;
use crate::{AppError, AppState};

/// Ready when the store answers within the request timeout.
pub async fn readiness(state: &AppState) -> Result<(), AppError> {
    let budget = Duration::from_secs(state.config.request_timeout_seconds.max(1));
    match tokio::time::timeout(budget, state.health_service.check_database()).await {
        Ok(Ok(true)) => Ok(()),
        Ok(Ok(false)) => Err(AppError::Unavailable("store is not ready".to_string())),
        Ok(Err(err)) => {
            warn!("readiness check failed: {}", err);
            Err(AppError::Unavailable("store check failed".to_string()))
        }
        Err(_) => Err(AppError::Unavailable("store check timed out".to_string())),
    }
}

pub async fn live_feed_snapshot(state: &AppState) -> LiveFeedSnapshot {
    state.hub.snapshot().await
}

pub async fn prometheus_metrics(state: &AppState) -> String {
    let live = state.hub.channel_count().await;
    state.metrics.render_prometheus(live)
}
