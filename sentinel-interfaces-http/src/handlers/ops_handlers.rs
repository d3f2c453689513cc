use axum::body::Bytes;
use axum::extract::State;
use axum::http::{header, HeaderMap, HeaderValue, StatusCode};
use axum::response::IntoResponse;
use axum::Json;
use tracing::error;

use sentinel_application::commands::alert_commands::{self, SystemAlertReceipt};
use sentinel_application::ops::LiveFeedSnapshot;
use sentinel_application::queries::ops_queries;
use sentinel_application::AppState;
use sentinel_domain::SystemAlertDraft;

use crate::error::HttpError;
use crate::middleware::parse_json_body;

pub async fn raise_system_alert(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<SystemAlertReceipt>, HttpError> {
    let draft: SystemAlertDraft = parse_json_body(&body)?;
    let receipt = alert_commands::raise_system_alert(&state, draft).await?;
    Ok(Json(receipt))
}

pub async fn health_live() -> StatusCode {
    StatusCode::OK
}

pub async fn health_ready(State(state): State<AppState>) -> StatusCode {
    match ops_queries::readiness(&state).await {
        Ok(()) => StatusCode::OK,
        Err(err) => {
            error!("ready check failed: {}", err);
            StatusCode::SERVICE_UNAVAILABLE
        }
    }
}

pub async fn live_feed_snapshot(State(state): State<AppState>) -> Json<LiveFeedSnapshot> {
    Json(ops_queries::live_feed_snapshot(&state).await)
}

pub async fn metrics_prometheus(State(state): State<AppState>) -> impl IntoResponse {
    let payload = ops_queries::prometheus_metrics(&state).await;
    let mut headers = HeaderMap::new();
    headers.insert(
        header::CONTENT_TYPE,
        HeaderValue::from_static("text/plain; version=0.0.4; charset=utf-8"),
    );
    (headers, payload)
}
