use axum::body::Bytes;
use axum::extract::{Query, State};
use axum::Json;

use sentinel_application::commands::metric_commands;
use sentinel_application::queries::metric_queries;
use sentinel_application::AppState;
use sentinel_domain::{DashboardMetrics, MetricHistoryQuery, MetricSampleDraft, SystemMetric};

use crate::error::HttpError;
use crate::middleware::parse_json_body;

pub async fn dashboard_metrics(
    State(state): State<AppState>,
) -> Result<Json<DashboardMetrics>, HttpError> {
    let metrics = metric_queries::dashboard_metrics(&state).await?;
    Ok(Json(metrics))
}

pub async fn metric_history(
    State(state): State<AppState>,
    Query(query): Query<MetricHistoryQuery>,
) -> Result<Json<Vec<SystemMetric>>, HttpError> {
    let samples = metric_queries::metric_history(&state, query).await?;
    Ok(Json(samples))
}

pub async fn update_metric(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<SystemMetric>, HttpError> {
    let draft: MetricSampleDraft = parse_json_body(&body)?;
    let metric = metric_commands::update_metric(&state, draft).await?;
    Ok(Json(metric))
}
