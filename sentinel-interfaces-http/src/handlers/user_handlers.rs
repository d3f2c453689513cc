use axum::body::Bytes;
use axum::extract::{Path, Query, State};
use axum::Json;

use sentinel_application::commands::user_commands;
use sentinel_application::queries::{simulation_queries, user_queries};
use sentinel_application::AppState;
use sentinel_domain::{User, UserDraft, UserQuery, UserSimulation};

use crate::error::HttpError;
use crate::middleware::parse_json_body;

pub async fn list_users(
    State(state): State<AppState>,
    Query(query): Query<UserQuery>,
) -> Result<Json<Vec<User>>, HttpError> {
    let users = user_queries::list_users(&state, query).await?;
    Ok(Json(users))
}

pub async fn get_user(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<User>, HttpError> {
    let user = user_queries::get_user(&state, &id).await?;
    Ok(Json(user))
}

pub async fn create_user(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<User>, HttpError> {
    let draft: UserDraft = parse_json_body(&body)?;
    let user = user_commands::create_user(&state, draft).await?;
    Ok(Json(user))
}

pub async fn update_user(
    State(state): State<AppState>,
    Path(id): Path<String>,
    body: Bytes,
) -> Result<Json<User>, HttpError> {
    let draft: UserDraft = parse_json_body(&body)?;
    let user = user_commands::update_user(&state, &id, draft).await?;
    Ok(Json(user))
}

pub async fn list_user_simulations(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Vec<UserSimulation>>, HttpError> {
    let attempts = simulation_queries::list_user_simulations(&state, &id).await?;
    Ok(Json(attempts))
}
