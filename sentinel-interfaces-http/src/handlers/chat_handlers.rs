use axum::body::Bytes;
use axum::extract::{Path, Query, State};
use axum::Json;

use sentinel_application::commands::chat_commands;
use sentinel_application::queries::chat_queries;
use sentinel_application::AppState;
use sentinel_domain::{ChatHistoryQuery, ChatMessage, ChatReply, ChatRequest};

use crate::error::HttpError;
use crate::middleware::parse_json_body;

pub async fn send_message(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<ChatReply>, HttpError> {
    let request: ChatRequest = parse_json_body(&body)?;
    let reply = chat_commands::send_chat_message(&state, request).await?;
    Ok(Json(reply))
}

pub async fn chat_history(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
    Query(query): Query<ChatHistoryQuery>,
) -> Result<Json<Vec<ChatMessage>>, HttpError> {
    let history = chat_queries::chat_history(&state, &user_id, query).await?;
    Ok(Json(history))
}
