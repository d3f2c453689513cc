// System metric samples
// Append-only; the latest sample per type is the dashboard read model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::entities::ThreatStats;
use crate::value_objects::MetricType;

pub const DEFAULT_SYSTEM_HEALTH: i32 = 96;
pub const DEFAULT_AI_CONFIDENCE: i32 = 94;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SystemMetric {
    pub id: String,
    pub metric_type: MetricType,
    pub value: i32,
    pub metadata: Option<Value>,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewMetric {
    pub metric_type: MetricType,
    pub value: i32,
    #[serde(default)]
    pub metadata: Option<Value>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct MetricSampleDraft {
    #[serde(rename = "type")]
    pub metric_type: Option<String>,
    pub value: Option<i64>,
    pub metadata: Option<Value>,
}

/// Payload carried by a `metric_updated` envelope.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetricUpdate {
    #[serde(rename = "type")]
    pub metric_type: MetricType,
    pub value: i32,
}

impl From<&SystemMetric> for MetricUpdate {
    fn from(metric: &SystemMetric) -> Self {
        Self {
            metric_type: metric.metric_type,
            value: metric.value,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct MetricHistoryQuery {
    #[serde(rename = "type")]
    pub metric_type: Option<String>,
    pub limit: Option<usize>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardMetrics {
    pub threat_count: u64,
    pub system_health: i32,
    pub ai_confidence: i32,
    pub threat_stats: ThreatStats,
}
