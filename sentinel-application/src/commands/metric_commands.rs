use sentinel_domain::{EventKind, MetricSampleDraft, MetricType, MetricUpdate, NewMetric, SystemMetric};
use tracing::info;

use crate::commands::emit;
use crate::commands::input::{bounded_int, parse_enum};
use crate::{AppError, AppState};

/// Appends a new sample; earlier samples of the same type are kept as history.
pub async fn update_metric(
    state: &AppState,
    draft: MetricSampleDraft,
) -> Result<SystemMetric, AppError> {
    let sample = validate_metric_sample(draft)?;
    let stored = state
        .metric_repo
        .insert_metric(sample)
        .await
        .map_err(AppError::Internal)?;
    state.metrics.record_mutation();
    info!(metric = stored.metric_type.as_str(), value = stored.value, "metric sample recorded");
    emit(state, EventKind::MetricUpdated, &MetricUpdate::from(&stored)).await;
    Ok(stored)
}

pub fn validate_metric_sample(draft: MetricSampleDraft) -> Result<NewMetric, AppError> {
    let metric_type = parse_enum::<MetricType>(draft.metric_type)?
        .ok_or_else(|| AppError::BadRequest("type is required".to_string()))?;
    let raw = draft
        .value
        .ok_or_else(|| AppError::BadRequest("value is required".to_string()))?;
    let max = if metric_type.is_percentage() {
        100
    } else {
        i64::from(i32::MAX)
    };
    let value = bounded_int("value", raw, 0, max)?;
    Ok(NewMetric {
        metric_type,
        value,
        metadata: draft.metadata.filter(|value| !value.is_null()),
    })
}
