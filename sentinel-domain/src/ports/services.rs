use async_trait::async_trait;

use crate::entities::{AssistantReply, EventEnvelope, IntentClassification, Threat};
use crate::value_objects::ChatIntent;

/// Narrow capability handed to the mutation commands: push one envelope to every
/// live channel. Delivery is best-effort; the return value is the number of
/// channels the envelope was queued for.
#[async_trait]
pub trait EventPublisher: Send + Sync {
    async fn publish(&self, envelope: EventEnvelope) -> usize;
}

/// Two-stage assistant: classify, then answer with an intent-specific prompt.
/// Implementations never fail; they degrade to canned replies.
#[async_trait]
pub trait ChatAssistant: Send + Sync {
    async fn classify(&self, message: &str) -> IntentClassification;
    async fn respond(&self, intent: ChatIntent, message: &str) -> AssistantReply;
    async fn summarize_threats(&self, threats: &[Threat]) -> String;
}

#[async_trait]
pub trait HealthCheckService: Send + Sync {
    async fn check_database(&self) -> anyhow::Result<bool>;
}
