use chrono::Utc;
use sentinel_domain::{
    EventKind,
    NewThreat,
    Severity,
    Threat,
    ThreatChanges,
    ThreatDraft,
    ThreatPatch,
    ThreatStatus,
};
use tracing::info;

use crate::commands::emit;
use crate::commands::input::{bounded_int, normalize_text, parse_enum, patch_text, required_text};
use crate::{AppError, AppState};

const MAX_AFFECTED_USERS: i64 = i32::MAX as i64;

pub async fn create_threat(state: &AppState, draft: ThreatDraft) -> Result<Threat, AppError> {
    let threat = validate_new_threat(draft)?;
    let created = state
        .threat_repo
        .insert_threat(threat)
        .await
        .map_err(AppError::Internal)?;
    state.metrics.record_mutation();
    info!(threat = %created.id, severity = created.severity.as_str(), "threat created");
    emit(state, EventKind::NewThreat, &created).await;
    Ok(created)
}

pub async fn update_threat(
    state: &AppState,
    id: &str,
    patch: ThreatPatch,
) -> Result<Threat, AppError> {
    let changes = validate_threat_patch(patch)?;
    apply_threat_changes(state, id, &changes).await
}

/// Marks the threat mitigated now. The write happens whatever the current status.
pub async fn mitigate_threat(state: &AppState, id: &str) -> Result<Threat, AppError> {
    apply_threat_changes(state, id, &ThreatChanges::mitigation(Utc::now())).await
}

async fn apply_threat_changes(
    state: &AppState,
    id: &str,
    changes: &ThreatChanges,
) -> Result<Threat, AppError> {
    let id = id.trim();
    if id.is_empty() {
        return Err(AppError::BadRequest("threat id is required".to_string()));
    }
    let updated = state
        .threat_repo
        .update_threat(id, changes)
        .await
        .map_err(AppError::Internal)?
        .ok_or_else(|| AppError::NotFound(format!("threat {id}")))?;
    state.metrics.record_mutation();
    info!(threat = %updated.id, status = updated.status.as_str(), "threat updated");
    emit(state, EventKind::ThreatUpdated, &updated).await;
    Ok(updated)
}

pub fn validate_new_threat(draft: ThreatDraft) -> Result<NewThreat, AppError> {
    let threat_type = required_text("type", draft.threat_type)?;
    let title = required_text("title", draft.title)?;
    let description = required_text("description", draft.description)?;
    let severity = parse_enum::<Severity>(draft.severity)?
        .ok_or_else(|| AppError::BadRequest("severity is required".to_string()))?;
    let status = parse_enum::<ThreatStatus>(draft.status)?.unwrap_or_default();
    let ai_confidence = match draft.ai_confidence {
        Some(value) => bounded_int("aiConfidence", value, 0, 100)?,
        None => 0,
    };
    let affected_users = match draft.affected_users {
        Some(value) => bounded_int("affectedUsers", value, 0, MAX_AFFECTED_USERS)?,
        None => 0,
    };

    Ok(NewThreat {
        threat_type,
        title,
        description,
        severity,
        status,
        source_ip: normalize_text(draft.source_ip),
        target_system: normalize_text(draft.target_system),
        location: normalize_text(draft.location),
        ai_confidence,
        affected_users,
        mitigated_at: draft.mitigated_at,
        metadata: draft.metadata.filter(|value| !value.is_null()),
    })
}

pub fn validate_threat_patch(patch: ThreatPatch) -> Result<ThreatChanges, AppError> {
    let changes = ThreatChanges {
        threat_type: patch_text("type", patch.threat_type)?,
        title: patch_text("title", patch.title)?,
        description: patch_text("description", patch.description)?,
        severity: parse_enum::<Severity>(patch.severity)?,
        status: parse_enum::<ThreatStatus>(patch.status)?,
        source_ip: normalize_text(patch.source_ip),
        target_system: normalize_text(patch.target_system),
        location: normalize_text(patch.location),
        ai_confidence: patch
            .ai_confidence
            .map(|value| bounded_int("aiConfidence", value, 0, 100))
            .transpose()?,
        affected_users: patch
            .affected_users
            .map(|value| bounded_int("affectedUsers", value, 0, MAX_AFFECTED_USERS))
            .transpose()?,
        mitigated_at: patch.mitigated_at,
        metadata: patch.metadata.filter(|value| !value.is_null()),
    };
    if changes.is_empty() {
        return Err(AppError::BadRequest(
            "threat update must change at least one field".to_string(),
        ));
    }
    Ok(changes)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn draft() -> ThreatDraft {
        ThreatDraft {
            threat_type: Some("ddos".to_string()),
            title: Some("T".to_string()),
            description: Some("D".to_string()),
            severity: Some("high".to_string()),
            ..ThreatDraft::default()
        }
    }

    #[test]
    fn new_threat_defaults_status_and_confidence() {
        let threat = validate_new_threat(draft()).expect("valid");
        assert_eq!(threat.status, ThreatStatus::Active);
        assert_eq!(threat.ai_confidence, 0);
        assert_eq!(threat.severity, Severity::High);
    }

    #[test]
    fn empty_draft_is_rejected() {
        let err = validate_new_threat(ThreatDraft::default()).expect_err("invalid");
        assert!(matches!(err, AppError::BadRequest(_)));
    }

    #[test]
    fn confidence_outside_percentage_is_rejected() {
        let mut input = draft();
        input.ai_confidence = Some(140);
        assert!(validate_new_threat(input).is_err());
    }

    #[test]
    fn unknown_status_in_patch_is_rejected() {
        let patch = ThreatPatch {
            status: Some("exploded".to_string()),
            ..ThreatPatch::default()
        };
        assert!(matches!(
            validate_threat_patch(patch),
            Err(AppError::BadRequest(_))
        ));
    }

    #[test]
    fn empty_patch_is_rejected() {
        assert!(validate_threat_patch(ThreatPatch::default()).is_err());
    }

    #[test]
    fn patch_keeps_only_supplied_fields() {
        let patch = ThreatPatch {
            status: Some("resolved".to_string()),
            ..ThreatPatch::default()
        };
        let changes = validate_threat_patch(patch).expect("valid");
        assert_eq!(changes.status, Some(ThreatStatus::Resolved));
        assert!(changes.title.is_none());
        assert!(changes.severity.is_none());
    }
}
