use sentinel_domain::{ChatHistoryQuery, ChatMessage};

use crate::queries::clamp_limit;
use crate::{AppError, AppState};

/// Newest exchanges first.
pub async fn chat_history(
    state: &AppState,
    user_id: &str,
    query: ChatHistoryQuery,
) -> Result<Vec<ChatMessage>, AppError> {
    let user_id = user_id.trim();
    if user_id.is_empty() {
        return Err(AppError::BadRequest("userId is required".to_string()));
    }
    let limit = clamp_limit(query.limit, 50, 200);
    state
        .chat_repo
        .fetch_chat_messages(user_id, limit)
        .await
        .map_err(AppError::Internal)
}
