// Chat transcript entity and assistant exchange types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::value_objects::ChatIntent;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatMessage {
    pub id: String,
    pub user_id: String,
    pub message: String,
    pub response: Option<String>,
    #[serde(rename = "type")]
    pub chat_type: ChatIntent,
    pub metadata: Option<Value>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewChatMessage {
    pub user_id: String,
    pub message: String,
    pub response: Option<String>,
    pub chat_type: ChatIntent,
    pub metadata: Option<Value>,
}

impl NewChatMessage {
    pub fn into_message(self, id: String, created_at: DateTime<Utc>) -> ChatMessage {
        ChatMessage {
            id,
            user_id: self.user_id,
            message: self.message,
            response: self.response,
            chat_type: self.chat_type,
            metadata: self.metadata,
            created_at,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatRequest {
    pub message: Option<String>,
    pub user_id: Option<String>,
    #[serde(rename = "type")]
    pub requested_type: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatReply {
    pub id: String,
    pub message: String,
    #[serde(rename = "type")]
    pub reply_type: ChatIntent,
    pub confidence: f64,
    pub sources: Vec<String>,
}

/// First stage of the assistant pipeline.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IntentClassification {
    pub intent: ChatIntent,
    pub confidence: f64,
}

/// Second stage of the assistant pipeline.
#[derive(Debug, Clone, PartialEq)]
pub struct AssistantReply {
    pub message: String,
    pub intent: ChatIntent,
    pub confidence: f64,
    pub sources: Vec<String>,
    /// Set when the reply is the canned fallback rather than a model answer.
    pub degraded: bool,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ChatHistoryQuery {
    pub limit: Option<usize>,
}
