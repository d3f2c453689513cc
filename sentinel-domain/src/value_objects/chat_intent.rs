// Chat message intent, as classified by the assistant

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::DomainError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChatIntent {
    General,
    #[default]
    PlatformHelp,
    CybersecurityInfo,
    ThreatAnalysis,
}

impl ChatIntent {
    pub fn as_str(&self) -> &'static str {
        match self {
            ChatIntent::General => "general",
            ChatIntent::PlatformHelp => "platform_help",
            ChatIntent::CybersecurityInfo => "cybersecurity_info",
            ChatIntent::ThreatAnalysis => "threat_analysis",
        }
    }
}

impl FromStr for ChatIntent {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().replace('-', "_").as_str() {
            "general" => Ok(ChatIntent::General),
            "platform_help" => Ok(ChatIntent::PlatformHelp),
            "cybersecurity_info" => Ok(ChatIntent::CybersecurityInfo),
            "threat_analysis" => Ok(ChatIntent::ThreatAnalysis),
            _ => Err(DomainError::invalid("chat type", s)),
        }
    }
}

impl fmt::Display for ChatIntent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
