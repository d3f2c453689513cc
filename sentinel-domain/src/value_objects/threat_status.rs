// Threat lifecycle status

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::DomainError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ThreatStatus {
    #[default]
    Active,
    Mitigated,
    Analyzing,
    Resolved,
}

impl ThreatStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ThreatStatus::Active => "active",
            ThreatStatus::Mitigated => "mitigated",
            ThreatStatus::Analyzing => "analyzing",
            ThreatStatus::Resolved => "resolved",
        }
    }
}

impl FromStr for ThreatStatus {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "active" => Ok(ThreatStatus::Active),
            "mitigated" => Ok(ThreatStatus::Mitigated),
            "analyzing" => Ok(ThreatStatus::Analyzing),
            "resolved" => Ok(ThreatStatus::Resolved),
            _ => Err(DomainError::invalid("status", s)),
        }
    }
}

impl fmt::Display for ThreatStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
