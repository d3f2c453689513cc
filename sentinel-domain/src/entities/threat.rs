// Threat entity
// A detected security incident shown on the command center

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::value_objects::{Severity, ThreatStatus};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Threat {
    pub id: String,
    #[serde(rename = "type")]
    pub threat_type: String,
    pub title: String,
    pub description: String,
    pub severity: Severity,
    pub status: ThreatStatus,
    pub source_ip: Option<String>,
    pub target_system: Option<String>,
    pub location: Option<String>,
    pub ai_confidence: i32,
    pub affected_users: i32,
    pub detected_at: DateTime<Utc>,
    pub mitigated_at: Option<DateTime<Utc>>,
    pub metadata: Option<Value>,
}

/// Validated input for a new threat. The store assigns `id` and `detected_at`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewThreat {
    #[serde(rename = "type")]
    pub threat_type: String,
    pub title: String,
    pub description: String,
    pub severity: Severity,
    #[serde(default)]
    pub status: ThreatStatus,
    #[serde(default)]
    pub source_ip: Option<String>,
    #[serde(default)]
    pub target_system: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub ai_confidence: i32,
    #[serde(default)]
    pub affected_users: i32,
    #[serde(default)]
    pub mitigated_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub metadata: Option<Value>,
}

impl NewThreat {
    pub fn into_threat(self, id: String, detected_at: DateTime<Utc>) -> Threat {
        Threat {
            id,
            threat_type: self.threat_type,
            title: self.title,
            description: self.description,
            severity: self.severity,
            status: self.status,
            source_ip: self.source_ip,
            target_system: self.target_system,
            location: self.location,
            ai_confidence: self.ai_confidence,
            affected_users: self.affected_users,
            detected_at,
            mitigated_at: self.mitigated_at,
            metadata: self.metadata,
        }
    }
}

/// Create payload as sent by dashboard clients, before validation.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ThreatDraft {
    #[serde(rename = "type")]
    pub threat_type: Option<String>,
    pub title: Option<String>,
    pub description: Option<String>,
    pub severity: Option<String>,
    pub status: Option<String>,
    pub source_ip: Option<String>,
    pub target_system: Option<String>,
    pub location: Option<String>,
    pub ai_confidence: Option<i64>,
    pub affected_users: Option<i64>,
    pub mitigated_at: Option<DateTime<Utc>>,
    pub metadata: Option<Value>,
}

/// Partial update payload. Absent fields are left untouched.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ThreatPatch {
    #[serde(rename = "type")]
    pub threat_type: Option<String>,
    pub title: Option<String>,
    pub description: Option<String>,
    pub severity: Option<String>,
    pub status: Option<String>,
    pub source_ip: Option<String>,
    pub target_system: Option<String>,
    pub location: Option<String>,
    pub ai_confidence: Option<i64>,
    pub affected_users: Option<i64>,
    pub mitigated_at: Option<DateTime<Utc>>,
    pub metadata: Option<Value>,
}

/// Validated partial update.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ThreatChanges {
    pub threat_type: Option<String>,
    pub title: Option<String>,
    pub description: Option<String>,
    pub severity: Option<Severity>,
    pub status: Option<ThreatStatus>,
    pub source_ip: Option<String>,
    pub target_system: Option<String>,
    pub location: Option<String>,
    pub ai_confidence: Option<i32>,
    pub affected_users: Option<i32>,
    pub mitigated_at: Option<DateTime<Utc>>,
    pub metadata: Option<Value>,
}

impl ThreatChanges {
    pub fn mitigation(at: DateTime<Utc>) -> Self {
        Self {
            status: Some(ThreatStatus::Mitigated),
            mitigated_at: Some(at),
            ..Self::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    pub fn apply(&self, threat: &mut Threat) {
        if let Some(value) = &self.threat_type {
            threat.threat_type = value.clone();
        }
        if let Some(value) = &self.title {
            threat.title = value.clone();
        }
        if let Some(value) = &self.description {
            threat.description = value.clone();
        }
        if let Some(value) = self.severity {
            threat.severity = value;
        }
        if let Some(value) = self.status {
            threat.status = value;
        }
        if let Some(value) = &self.source_ip {
            threat.source_ip = Some(value.clone());
        }
        if let Some(value) = &self.target_system {
            threat.target_system = Some(value.clone());
        }
        if let Some(value) = &self.location {
            threat.location = Some(value.clone());
        }
        if let Some(value) = self.ai_confidence {
            threat.ai_confidence = value;
        }
        if let Some(value) = self.affected_users {
            threat.affected_users = value;
        }
        if let Some(value) = self.mitigated_at {
            threat.mitigated_at = Some(value);
        }
        if let Some(value) = &self.metadata {
            threat.metadata = Some(value.clone());
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ThreatQuery {
    pub status: Option<String>,
    pub severity: Option<String>,
    #[serde(rename = "type")]
    pub threat_type: Option<String>,
    pub search: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ThreatFilter {
    pub status: Option<ThreatStatus>,
    pub severity: Option<Severity>,
    pub threat_type: Option<String>,
    /// Lowercased needle matched against title and description.
    pub search: Option<String>,
}

impl ThreatFilter {
    pub fn active() -> Self {
        Self {
            status: Some(ThreatStatus::Active),
            ..Self::default()
        }
    }

    pub fn matches(&self, threat: &Threat) -> bool {
        if let Some(status) = self.status {
            if threat.status != status {
                return false;
            }
        }
        if let Some(severity) = self.severity {
            if threat.severity != severity {
                return false;
            }
        }
        if let Some(threat_type) = &self.threat_type {
            if !threat.threat_type.eq_ignore_ascii_case(threat_type) {
                return false;
            }
        }
        if let Some(needle) = &self.search {
            let in_title = threat.title.to_lowercase().contains(needle);
            let in_description = threat.description.to_lowercase().contains(needle);
            if !in_title && !in_description {
                return false;
            }
        }
        true
    }
}

/// Active threat counts per severity.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ThreatStats {
    pub critical: u64,
    pub high: u64,
    pub medium: u64,
    pub low: u64,
}

impl ThreatStats {
    pub fn record(&mut self, severity: Severity, count: u64) {
        match severity {
            Severity::Critical => self.critical += count,
            Severity::High => self.high += count,
            Severity::Medium => self.medium += count,
            Severity::Low => self.low += count,
        }
    }

    pub fn total(&self) -> u64 {
        self.critical + self.high + self.medium + self.low
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Threat {
        NewThreat {
            threat_type: "ddos".to_string(),
            title: "Massive DDoS Campaign".to_string(),
            description: "Volumetric attack on edge routers".to_string(),
            severity: Severity::High,
            status: ThreatStatus::Active,
            source_ip: None,
            target_system: None,
            location: None,
            ai_confidence: 80,
            affected_users: 0,
            mitigated_at: None,
            metadata: None,
        }
        .into_threat("t-1".to_string(), Utc::now())
    }

    #[test]
    fn serializes_with_camel_case_wire_names() {
        let value = serde_json::to_value(sample()).expect("serialize");
        assert_eq!(value["type"], "ddos");
        assert_eq!(value["severity"], "high");
        assert_eq!(value["aiConfidence"], 80);
        assert!(value.get("detectedAt").is_some());
        assert!(value.get("threat_type").is_none());
    }

    #[test]
    fn mitigation_changes_touch_only_status_and_timestamp() {
        let mut threat = sample();
        let at = Utc::now();
        ThreatChanges::mitigation(at).apply(&mut threat);
        assert_eq!(threat.status, ThreatStatus::Mitigated);
        assert_eq!(threat.mitigated_at, Some(at));
        assert_eq!(threat.severity, Severity::High);
        assert_eq!(threat.title, "Massive DDoS Campaign");
    }

    #[test]
    fn filter_combines_fields_and_search() {
        let threat = sample();
        let mut filter = ThreatFilter::active();
        assert!(filter.matches(&threat));
        filter.search = Some("edge".to_string());
        assert!(filter.matches(&threat));
        filter.severity = Some(Severity::Low);
        assert!(!filter.matches(&threat));
    }

    #[test]
    fn stats_total_sums_all_levels() {
        let mut stats = ThreatStats::default();
        stats.record(Severity::Critical, 2);
        stats.record(Severity::Low, 1);
        stats.record(Severity::Critical, 1);
        assert_eq!(stats.critical, 3);
        assert_eq!(stats.total(), 4);
    }
}
