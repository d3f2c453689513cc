use axum::body::Bytes;
use axum::extract::{Path, Query, State};
use axum::Json;

use sentinel_application::commands::threat_commands;
use sentinel_application::queries::threat_queries::{self, ThreatSummary};
use sentinel_application::AppState;
use sentinel_domain::{Threat, ThreatDraft, ThreatPatch, ThreatQuery, ThreatStats};

use crate::error::HttpError;
use crate::middleware::parse_json_body;

pub async fn list_threats(
    State(state): State<AppState>,
    Query(query): Query<ThreatQuery>,
) -> Result<Json<Vec<Threat>>, HttpError> {
    let threats = threat_queries::list_threats(&state, query).await?;
    Ok(Json(threats))
}

pub async fn get_threat(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Threat>, HttpError> {
    let threat = threat_queries::get_threat(&state, &id).await?;
    Ok(Json(threat))
}

pub async fn threat_stats(State(state): State<AppState>) -> Result<Json<ThreatStats>, HttpError> {
    let stats = threat_queries::threat_stats(&state).await?;
    Ok(Json(stats))
}

pub async fn threat_summary(
    State(state): State<AppState>,
) -> Result<Json<ThreatSummary>, HttpError> {
    let summary = threat_queries::threat_summary(&state).await?;
    Ok(Json(summary))
}

pub async fn create_threat(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<Threat>, HttpError> {
    let draft: ThreatDraft = parse_json_body(&body)?;
    let threat = threat_commands::create_threat(&state, draft).await?;
    Ok(Json(threat))
}

pub async fn update_threat(
    State(state): State<AppState>,
    Path(id): Path<String>,
    body: Bytes,
) -> Result<Json<Threat>, HttpError> {
    let patch: ThreatPatch = parse_json_body(&body)?;
    let threat = threat_commands::update_threat(&state, &id, patch).await?;
    Ok(Json(threat))
}

pub async fn mitigate_threat(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Threat>, HttpError> {
    let threat = threat_commands::mitigate_threat(&state, &id).await?;
    Ok(Json(threat))
}
