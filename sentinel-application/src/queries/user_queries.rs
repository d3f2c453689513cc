use sentinel_domain::{User, UserQuery};

use crate::queries::clamp_limit;
use crate::{AppError, AppState};

pub async fn list_users(state: &AppState, query: UserQuery) -> Result<Vec<User>, AppError> {
    let limit = clamp_limit(query.limit, 100, 500);
    state
        .user_repo
        .fetch_users(limit)
        .await
        .map_err(AppError::Internal)
}

pub async fn get_user(state: &AppState, id: &str) -> Result<User, AppError> {
    state
        .user_repo
        .fetch_user(id.trim())
        .await
        .map_err(AppError::Internal)?
        .ok_or_else(|| AppError::NotFound(format!("user {id}")))
}
