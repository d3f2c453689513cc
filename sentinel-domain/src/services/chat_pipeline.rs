// Assistant prompt catalogue and response parsing
//
// Everything here is pure; the network adapter lives in infrastructure.

use serde::Deserialize;
use serde_json::Value;

use crate::entities::{AssistantReply, IntentClassification, Threat};
use crate::value_objects::ChatIntent;

pub const INTENT_TEMPERATURE: f32 = 0.3;
pub const REPLY_TEMPERATURE: f32 = 0.7;
pub const REPLY_MAX_TOKENS: u32 = 500;
pub const SUMMARY_TEMPERATURE: f32 = 0.5;
pub const SUMMARY_MAX_TOKENS: u32 = 300;
pub const SUMMARY_THREAT_LIMIT: usize = 10;

pub const FALLBACK_CONFIDENCE: f64 = 0.5;
pub const DEFAULT_REPLY_CONFIDENCE: f64 = 0.8;
pub const DEFAULT_REPLY_MESSAGE: &str = "I'm here to help with your cybersecurity questions.";
pub const DEGRADED_REPLY_MESSAGE: &str =
    "I'm experiencing technical difficulties. Please try again or contact support for assistance.";
pub const NO_THREATS_SUMMARY: &str = "No threats currently detected.";
pub const SUMMARY_UNAVAILABLE: &str = "Unable to generate threat summary at this time.";

pub const INTENT_SYSTEM_PROMPT: &str = "Analyze the user message and determine intent. Categories:
- platform_help: Questions about using the CyberSentinel platform, navigation, features
- cybersecurity_info: General cybersecurity questions, threat information, best practices
- threat_analysis: Requests to analyze specific threats, incidents, or security scenarios

Respond with JSON: { \"type\": \"category\", \"confidence\": 0.0-1.0 }";

const PLATFORM_HELP_PROMPT: &str = "You are CyberSentinel AI, an intelligent assistant for a cybersecurity command center platform. \
Help users navigate the platform, explain features, and provide guidance on using the threat monitoring, training simulations, \
and reporting capabilities. Be concise and actionable. Respond in JSON format with fields: message, confidence.";

const CYBERSECURITY_INFO_PROMPT: &str = "You are CyberSentinel AI, a cybersecurity expert. Provide accurate, up-to-date information about \
cybersecurity threats, best practices, and incident response. Include recent threat intelligence and recommendations. \
Be technical but accessible. Respond in JSON format with fields: message, confidence, sources (array of strings).";

const THREAT_ANALYSIS_PROMPT: &str = "You are CyberSentinel AI, specializing in threat analysis. Analyze the provided threat data or scenario \
and provide detailed assessment including risk level, potential impact, and mitigation strategies. \
Respond in JSON format with fields: message, confidence, sources.";

pub const THREAT_SUMMARY_SYSTEM_PROMPT: &str =
    "Create a concise executive summary of current cybersecurity threats. Focus on key risks and recommendations.";

/// The classifier only produces three intents; anything else is answered as platform help.
pub fn answerable_intent(intent: ChatIntent) -> ChatIntent {
    match intent {
        ChatIntent::CybersecurityInfo | ChatIntent::ThreatAnalysis => intent,
        ChatIntent::PlatformHelp | ChatIntent::General => ChatIntent::PlatformHelp,
    }
}

pub fn system_prompt(intent: ChatIntent) -> &'static str {
    match answerable_intent(intent) {
        ChatIntent::CybersecurityInfo => CYBERSECURITY_INFO_PROMPT,
        ChatIntent::ThreatAnalysis => THREAT_ANALYSIS_PROMPT,
        _ => PLATFORM_HELP_PROMPT,
    }
}

pub fn fallback_classification() -> IntentClassification {
    IntentClassification {
        intent: ChatIntent::PlatformHelp,
        confidence: FALLBACK_CONFIDENCE,
    }
}

pub fn degraded_reply() -> AssistantReply {
    AssistantReply {
        message: DEGRADED_REPLY_MESSAGE.to_string(),
        intent: ChatIntent::PlatformHelp,
        confidence: FALLBACK_CONFIDENCE,
        sources: Vec::new(),
        degraded: true,
    }
}

#[derive(Debug, Deserialize)]
struct RawClassification {
    #[serde(rename = "type")]
    intent: Option<String>,
    confidence: Option<f64>,
}

/// Parses the classifier's JSON content. Unparseable content or an unknown
/// category yields the fallback classification.
pub fn parse_intent(content: &str) -> IntentClassification {
    let Ok(raw) = serde_json::from_str::<RawClassification>(content) else {
        return fallback_classification();
    };
    let Some(intent) = raw
        .intent
        .and_then(|value| value.parse::<ChatIntent>().ok())
        .map(answerable_intent)
    else {
        return fallback_classification();
    };
    let confidence = raw
        .confidence
        .filter(|value| value.is_finite())
        .map(|value| value.clamp(0.0, 1.0))
        .unwrap_or(FALLBACK_CONFIDENCE);
    IntentClassification { intent, confidence }
}

#[derive(Debug, Deserialize)]
struct RawReply {
    message: Option<String>,
    confidence: Option<f64>,
    sources: Option<Value>,
}

/// Parses the answering model's JSON content, filling missing fields with defaults.
/// Content that is not a JSON object is an error; callers fall back to `degraded_reply`.
pub fn parse_reply(content: &str, intent: ChatIntent) -> serde_json::Result<AssistantReply> {
    let raw: RawReply = serde_json::from_str(content)?;
    let message = raw
        .message
        .filter(|message| !message.trim().is_empty())
        .unwrap_or_else(|| DEFAULT_REPLY_MESSAGE.to_string());
    let confidence = raw
        .confidence
        .filter(|value| value.is_finite() && *value > 0.0)
        .map(|value| value.min(1.0))
        .unwrap_or(DEFAULT_REPLY_CONFIDENCE);
    let sources = match raw.sources {
        Some(Value::Array(items)) => items
            .into_iter()
            .filter_map(|item| match item {
                Value::String(source) => Some(source),
                _ => None,
            })
            .collect(),
        _ => Vec::new(),
    };
    Ok(AssistantReply {
        message,
        intent: answerable_intent(intent),
        confidence,
        sources,
        degraded: false,
    })
}

/// User turn for the threat summary request; only the first few threats are sent.
pub fn threat_summary_prompt(threats: &[Threat]) -> serde_json::Result<String> {
    let head = &threats[..threats.len().min(SUMMARY_THREAT_LIMIT)];
    Ok(format!(
        "Analyze these threats and provide a summary: {}",
        serde_json::to_string(head)?
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_intent_reads_category_and_confidence() {
        let parsed = parse_intent(r#"{"type":"threat_analysis","confidence":0.92}"#);
        assert_eq!(parsed.intent, ChatIntent::ThreatAnalysis);
        assert!((parsed.confidence - 0.92).abs() < f64::EPSILON);
    }

    #[test]
    fn parse_intent_falls_back_on_garbage() {
        assert_eq!(parse_intent("not json"), fallback_classification());
    }

    #[test]
    fn parse_intent_falls_back_on_unknown_category() {
        let parsed = parse_intent(r#"{"type":"weather","confidence":0.9}"#);
        assert_eq!(parsed, fallback_classification());
    }

    #[test]
    fn parse_intent_clamps_confidence() {
        let parsed = parse_intent(r#"{"type":"cybersecurity_info","confidence":2.0}"#);
        assert_eq!(parsed.intent, ChatIntent::CybersecurityInfo);
        assert!((parsed.confidence - 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn parse_reply_fills_defaults() {
        let reply = parse_reply("{}", ChatIntent::CybersecurityInfo).expect("object");
        assert_eq!(reply.message, DEFAULT_REPLY_MESSAGE);
        assert_eq!(reply.intent, ChatIntent::CybersecurityInfo);
        assert!((reply.confidence - DEFAULT_REPLY_CONFIDENCE).abs() < f64::EPSILON);
        assert!(reply.sources.is_empty());
        assert!(!reply.degraded);
    }

    #[test]
    fn parse_reply_keeps_string_sources_only() {
        let reply = parse_reply(
            r#"{"message":"Patch now","confidence":0.7,"sources":["CISA",3,"NVD"]}"#,
            ChatIntent::ThreatAnalysis,
        )
        .expect("object");
        assert_eq!(reply.message, "Patch now");
        assert_eq!(reply.sources, vec!["CISA".to_string(), "NVD".to_string()]);
    }

    #[test]
    fn parse_reply_rejects_non_json() {
        assert!(parse_reply("Sure! Here is some advice.", ChatIntent::General).is_err());
    }

    #[test]
    fn general_intent_uses_platform_prompt() {
        assert_eq!(
            system_prompt(ChatIntent::General),
            system_prompt(ChatIntent::PlatformHelp)
        );
        assert_ne!(
            system_prompt(ChatIntent::ThreatAnalysis),
            system_prompt(ChatIntent::PlatformHelp)
        );
    }

    #[test]
    fn degraded_reply_is_flagged() {
        let reply = degraded_reply();
        assert!(reply.degraded);
        assert_eq!(reply.intent, ChatIntent::PlatformHelp);
        assert_eq!(reply.message, DEGRADED_REPLY_MESSAGE);
    }
}
