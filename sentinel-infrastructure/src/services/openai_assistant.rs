use std::time::Duration;

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use sentinel_domain::ports::ChatAssistant;
use sentinel_domain::{
    degraded_reply,
    fallback_classification,
    parse_intent,
    parse_reply,
    system_prompt,
    threat_summary_prompt,
    AssistantReply,
    ChatIntent,
    IntentClassification,
    LlmConfig,
    Threat,
    INTENT_SYSTEM_PROMPT,
    INTENT_TEMPERATURE,
    NO_THREATS_SUMMARY,
    REPLY_MAX_TOKENS,
    REPLY_TEMPERATURE,
    SUMMARY_MAX_TOKENS,
    SUMMARY_TEMPERATURE,
    SUMMARY_UNAVAILABLE,
    THREAT_SUMMARY_SYSTEM_PROMPT,
};

#[derive(Debug, Serialize)]
struct ChatMessageBody<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Debug, Serialize)]
struct ResponseFormat {
    #[serde(rename = "type")]
    kind: &'static str,
}

#[derive(Debug, Serialize)]
struct CompletionRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessageBody<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_format: Option<ResponseFormat>,
    temperature: f32,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
}

#[derive(Debug, Deserialize)]
struct CompletionResponse {
    #[serde(default)]
    choices: Vec<CompletionChoice>,
}

#[derive(Debug, Deserialize)]
struct CompletionChoice {
    message: CompletionMessage,
}

#[derive(Debug, Deserialize)]
struct CompletionMessage {
    content: Option<String>,
}

/// Chat-completions client. Every failure degrades to a canned answer.
pub struct OpenAiAssistant {
    client: Client,
    config: LlmConfig,
}

impl OpenAiAssistant {
    pub fn new(config: LlmConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds.max(3)))
            .build()?;
        Ok(Self { client, config })
    }

    pub fn is_configured(&self) -> bool {
        self.config.api_key.is_some()
    }

    async fn complete(
        &self,
        system: &str,
        user: &str,
        json_response: bool,
        temperature: f32,
        max_tokens: Option<u32>,
    ) -> Result<Option<String>> {
        let api_key = self
            .config
            .api_key
            .as_deref()
            .ok_or_else(|| anyhow!("assistant api key not configured"))?;
        let request = CompletionRequest {
            model: &self.config.model,
            messages: vec![
                ChatMessageBody {
                    role: "system",
                    content: system,
                },
                ChatMessageBody {
                    role: "user",
                    content: user,
                },
            ],
            response_format: json_response.then_some(ResponseFormat {
                kind: "json_object",
            }),
            temperature,
            max_tokens,
        };
        let url = format!("{}/chat/completions", self.config.base_url);
        let response: CompletionResponse = self
            .client
            .post(url)
            .bearer_auth(api_key)
            .json(&request)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;
        Ok(response
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .filter(|content| !content.trim().is_empty()))
    }
}

#[async_trait]
impl ChatAssistant for OpenAiAssistant {
    async fn classify(&self, message: &str) -> IntentClassification {
        if !self.is_configured() {
            return fallback_classification();
        }
        match self
            .complete(INTENT_SYSTEM_PROMPT, message, true, INTENT_TEMPERATURE, None)
            .await
        {
            Ok(Some(content)) => parse_intent(&content),
            Ok(None) => fallback_classification(),
            Err(err) => {
                warn!("intent classification failed: {}", err);
                fallback_classification()
            }
        }
    }

    async fn respond(&self, intent: ChatIntent, message: &str) -> AssistantReply {
        if !self.is_configured() {
            debug!("assistant not configured; returning fallback reply");
            return degraded_reply();
        }
        let content = self
            .complete(
                system_prompt(intent),
                message,
                true,
                REPLY_TEMPERATURE,
                Some(REPLY_MAX_TOKENS),
            )
            .await;
        match content {
            Ok(Some(content)) => match parse_reply(&content, intent) {
                Ok(reply) => reply,
                Err(err) => {
                    warn!("assistant reply was not json: {}", err);
                    degraded_reply()
                }
            },
            Ok(None) => parse_reply("{}", intent).unwrap_or_else(|_| degraded_reply()),
            Err(err) => {
                warn!("assistant reply failed: {}", err);
                degraded_reply()
            }
        }
    }

    async fn summarize_threats(&self, threats: &[Threat]) -> String {
        if threats.is_empty() {
            return NO_THREATS_SUMMARY.to_string();
        }
        if !self.is_configured() {
            return SUMMARY_UNAVAILABLE.to_string();
        }
        let prompt = match threat_summary_prompt(threats) {
            Ok(prompt) => prompt,
            Err(err) => {
                warn!("failed to encode threats for summary: {}", err);
                return SUMMARY_UNAVAILABLE.to_string();
            }
        };
        match self
            .complete(
                THREAT_SUMMARY_SYSTEM_PROMPT,
                &prompt,
                false,
                SUMMARY_TEMPERATURE,
                Some(SUMMARY_MAX_TOKENS),
            )
            .await
        {
            Ok(Some(summary)) => summary,
            Ok(None) => NO_THREATS_SUMMARY.to_string(),
            Err(err) => {
                warn!("threat summary failed: {}", err);
                SUMMARY_UNAVAILABLE.to_string()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unconfigured() -> OpenAiAssistant {
        OpenAiAssistant::new(LlmConfig {
            api_key: None,
            base_url: "http://127.0.0.1:9".to_string(),
            model: "gpt-5".to_string(),
            timeout_seconds: 3,
        })
        .expect("client")
    }

    #[tokio::test]
    async fn without_key_classification_falls_back() {
        let assistant = unconfigured();
        assert_eq!(
            assistant.classify("how do I start a simulation?").await,
            fallback_classification()
        );
    }

    #[tokio::test]
    async fn without_key_reply_is_degraded() {
        let reply = unconfigured()
            .respond(ChatIntent::ThreatAnalysis, "analyze this")
            .await;
        assert!(reply.degraded);
        assert_eq!(reply.intent, ChatIntent::PlatformHelp);
    }

    #[tokio::test]
    async fn empty_threat_list_needs_no_model() {
        assert_eq!(unconfigured().summarize_threats(&[]).await, NO_THREATS_SUMMARY);
    }

    #[test]
    fn request_omits_optional_fields() {
        let request = CompletionRequest {
            model: "gpt-5",
            messages: vec![ChatMessageBody {
                role: "user",
                content: "hi",
            }],
            response_format: None,
            temperature: 0.3,
            max_tokens: None,
        };
        let value = serde_json::to_value(&request).expect("serialize");
        assert!(value.get("response_format").is_none());
        assert!(value.get("max_tokens").is_none());
        assert_eq!(value["messages"][0]["role"], "user");
    }
}
