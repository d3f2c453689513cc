use sentinel_domain::{
    DashboardMetrics,
    MetricHistoryQuery,
    MetricType,
    SystemMetric,
    DEFAULT_AI_CONFIDENCE,
    DEFAULT_SYSTEM_HEALTH,
};

use crate::commands::input::parse_enum;
use crate::queries::clamp_limit;
use crate::{AppError, AppState};

const HISTORY_DEFAULT_LIMIT: usize = 50;
const HISTORY_MAX_LIMIT: usize = 500;

/// Dashboard summary: active threats plus the latest health and confidence samples.
pub async fn dashboard_metrics(state: &AppState) -> Result<DashboardMetrics, AppError> {
    let threat_stats = state
        .threat_repo
        .fetch_threat_stats()
        .await
        .map_err(AppError::Internal)?;
    let system_health = latest_value(state, MetricType::SystemHealth)
        .await?
        .unwrap_or(DEFAULT_SYSTEM_HEALTH);
    let ai_confidence = latest_value(state, MetricType::AiConfidence)
        .await?
        .unwrap_or(DEFAULT_AI_CONFIDENCE);
    Ok(DashboardMetrics {
        threat_count: threat_stats.total(),
        system_health,
        ai_confidence,
        threat_stats,
    })
}

pub async fn metric_history(
    state: &AppState,
    query: MetricHistoryQuery,
) -> Result<Vec<SystemMetric>, AppError> {
    let metric_type = parse_enum::<MetricType>(query.metric_type)?;
    let limit = clamp_limit(query.limit, HISTORY_DEFAULT_LIMIT, HISTORY_MAX_LIMIT);
    state
        .metric_repo
        .fetch_metrics(metric_type, limit)
        .await
        .map_err(AppError::Internal)
}

async fn latest_value(state: &AppState, metric_type: MetricType) -> Result<Option<i32>, AppError> {
    let latest = state
        .metric_repo
        .fetch_latest_metric(metric_type)
        .await
        .map_err(AppError::Internal)?;
    Ok(latest.map(|metric| metric.value))
}
