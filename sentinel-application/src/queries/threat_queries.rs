use sentinel_domain::{
    Severity,
    Threat,
    ThreatFilter,
    ThreatQuery,
    ThreatStats,
    ThreatStatus,
    NO_THREATS_SUMMARY,
    SUMMARY_THREAT_LIMIT,
};
use serde::Serialize;
use tracing::error;

use crate::commands::input::{normalize_text, parse_enum};
use crate::{AppError, AppState};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ThreatSummary {
    pub summary: String,
    pub active_threats: usize,
}

pub async fn list_threats(state: &AppState, query: ThreatQuery) -> Result<Vec<Threat>, AppError> {
    let filter = ThreatFilter {
        status: parse_enum::<ThreatStatus>(query.status)?,
        severity: parse_enum::<Severity>(query.severity)?,
        threat_type: normalize_text(query.threat_type),
        search: normalize_text(query.search).map(|needle| needle.to_lowercase()),
    };
    state.threat_repo.fetch_threats(&filter).await.map_err(|err| {
        error!("failed to fetch threats: {}", err);
        AppError::Internal(err)
    })
}

pub async fn get_threat(state: &AppState, id: &str) -> Result<Threat, AppError> {
    state
        .threat_repo
        .fetch_threat(id.trim())
        .await
        .map_err(AppError::Internal)?
        .ok_or_else(|| AppError::NotFound(format!("threat {id}")))
}

pub async fn threat_stats(state: &AppState) -> Result<ThreatStats, AppError> {
    state
        .threat_repo
        .fetch_threat_stats()
        .await
        .map_err(AppError::Internal)
}

pub async fn threat_summary(state: &AppState) -> Result<ThreatSummary, AppError> {
    let active = state
        .threat_repo
        .fetch_threats(&ThreatFilter::active())
        .await
        .map_err(AppError::Internal)?;
    if active.is_empty() {
        return Ok(ThreatSummary {
            summary: NO_THREATS_SUMMARY.to_string(),
            active_threats: 0,
        });
    }
    let head = &active[..active.len().min(SUMMARY_THREAT_LIMIT)];
    let summary = state.assistant.summarize_threats(head).await;
    Ok(ThreatSummary {
        summary,
        active_threats: active.len(),
    })
}
