// System metric kinds

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::DomainError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MetricType {
    ThreatCount,
    SystemHealth,
    AiConfidence,
}

impl MetricType {
    pub fn as_str(&self) -> &'static str {
        match self {
            MetricType::ThreatCount => "threat_count",
            MetricType::SystemHealth => "system_health",
            MetricType::AiConfidence => "ai_confidence",
        }
    }

    /// Percentage metrics are bounded to 0..=100.
    pub fn is_percentage(&self) -> bool {
        matches!(self, MetricType::SystemHealth | MetricType::AiConfidence)
    }
}

impl FromStr for MetricType {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "threat_count" => Ok(MetricType::ThreatCount),
            "system_health" => Ok(MetricType::SystemHealth),
            "ai_confidence" => Ok(MetricType::AiConfidence),
            _ => Err(DomainError::invalid("metric type", s)),
        }
    }
}

impl fmt::Display for MetricType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
