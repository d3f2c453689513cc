use sentinel_domain::{
    ChatIntent,
    ChatReply,
    ChatRequest,
    IntentClassification,
    NewChatMessage,
};
use serde_json::json;
use tracing::{info, warn};

use crate::commands::input::{parse_enum, required_text};
use crate::{AppError, AppState};

/// Classifies, answers and records one chat exchange.
pub async fn send_chat_message(state: &AppState, request: ChatRequest) -> Result<ChatReply, AppError> {
    let message = required_text("message", request.message)?;
    let user_id = required_text("userId", request.user_id)?;
    let requested = parse_enum::<ChatIntent>(request.requested_type)?;

    if state
        .user_repo
        .fetch_user(&user_id)
        .await
        .map_err(AppError::Internal)?
        .is_none()
    {
        return Err(AppError::NotFound(format!("user {user_id}")));
    }

    // An explicit intent from the client skips the classification round trip.
    let classification = match requested {
        Some(intent) if intent != ChatIntent::General => IntentClassification {
            intent,
            confidence: 1.0,
        },
        _ => state.assistant.classify(&message).await,
    };
    let reply = state.assistant.respond(classification.intent, &message).await;
    state.metrics.record_chat(reply.degraded);
    if reply.degraded {
        warn!(user = %user_id, "assistant reply degraded to fallback");
    }

    let stored = state
        .chat_repo
        .insert_chat_message(NewChatMessage {
            user_id,
            message,
            response: Some(reply.message.clone()),
            chat_type: reply.intent,
            metadata: Some(json!({
                "confidence": reply.confidence,
                "sources": reply.sources,
                "intentConfidence": classification.confidence,
            })),
        })
        .await
        .map_err(AppError::Internal)?;
    info!(chat = %stored.id, intent = reply.intent.as_str(), "chat exchange recorded");

    Ok(ChatReply {
        id: stored.id,
        message: reply.message,
        reply_type: reply.intent,
        confidence: reply.confidence,
        sources: reply.sources,
    })
}
