// Live-feed envelope pushed to dashboard clients
//
// Wire shape: { "type": "<kind>", "data": <payload>, "timestamp": "<rfc3339>" }

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::value_objects::AlertLevel;

pub const SUBSCRIBED_MESSAGE: &str = "Connected to real-time feed";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    NewThreat,
    ThreatUpdated,
    MetricUpdated,
    Subscribed,
    SystemAlert,
}

impl EventKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            EventKind::NewThreat => "new_threat",
            EventKind::ThreatUpdated => "threat_updated",
            EventKind::MetricUpdated => "metric_updated",
            EventKind::Subscribed => "subscribed",
            EventKind::SystemAlert => "system_alert",
        }
    }
}

/// Immutable once built; the hub shares one instance across all channels.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventEnvelope {
    #[serde(rename = "type")]
    kind: EventKind,
    #[serde(rename = "data")]
    payload: Value,
    #[serde(rename = "timestamp")]
    emitted_at: DateTime<Utc>,
}

impl EventEnvelope {
    pub fn new(kind: EventKind, payload: Value) -> Self {
        Self {
            kind,
            payload,
            emitted_at: Utc::now(),
        }
    }

    pub fn from_record<T: Serialize>(kind: EventKind, record: &T) -> serde_json::Result<Self> {
        Ok(Self::new(kind, serde_json::to_value(record)?))
    }

    pub fn subscribed() -> Self {
        Self::new(
            EventKind::Subscribed,
            Value::String(SUBSCRIBED_MESSAGE.to_string()),
        )
    }

    pub fn kind(&self) -> EventKind {
        self.kind
    }

    pub fn payload(&self) -> &Value {
        &self.payload
    }

    pub fn emitted_at(&self) -> DateTime<Utc> {
        self.emitted_at
    }
}

/// Messages a dashboard client may send over its live-feed connection.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum InboundMessage {
    Subscribe,
}

impl InboundMessage {
    pub fn parse(raw: &str) -> serde_json::Result<Self> {
        serde_json::from_str(raw)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SystemAlert {
    pub message: String,
    pub level: AlertLevel,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SystemAlertDraft {
    pub message: Option<String>,
    pub level: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn envelope_uses_dashboard_wire_names() {
        let envelope = EventEnvelope::new(EventKind::ThreatUpdated, json!({"id": "t-1"}));
        let value = serde_json::to_value(&envelope).expect("serialize");
        assert_eq!(value["type"], "threat_updated");
        assert_eq!(value["data"]["id"], "t-1");
        assert!(value["timestamp"].as_str().is_some());
    }

    #[test]
    fn subscribed_envelope_carries_confirmation_text() {
        let envelope = EventEnvelope::subscribed();
        assert_eq!(envelope.kind(), EventKind::Subscribed);
        assert_eq!(envelope.payload(), &json!(SUBSCRIBED_MESSAGE));
    }

    #[test]
    fn inbound_subscribe_ignores_extra_fields() {
        let parsed = InboundMessage::parse(r#"{"type":"subscribe","topics":["threats"]}"#);
        assert_eq!(parsed.expect("subscribe"), InboundMessage::Subscribe);
    }

    #[test]
    fn inbound_rejects_unknown_or_garbled_messages() {
        assert!(InboundMessage::parse(r#"{"type":"unsubscribe"}"#).is_err());
        assert!(InboundMessage::parse("not json").is_err());
        assert!(InboundMessage::parse(r#"{"kind":"subscribe"}"#).is_err());
    }
}
