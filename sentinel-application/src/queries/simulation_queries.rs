use sentinel_domain::{Simulation, UserSimulation};

use crate::{AppError, AppState};

pub async fn list_simulations(state: &AppState) -> Result<Vec<Simulation>, AppError> {
    state
        .simulation_repo
        .fetch_active_simulations()
        .await
        .map_err(AppError::Internal)
}

pub async fn list_user_simulations(
    state: &AppState,
    user_id: &str,
) -> Result<Vec<UserSimulation>, AppError> {
    let user_id = user_id.trim();
    if state
        .user_repo
        .fetch_user(user_id)
        .await
        .map_err(AppError::Internal)?
        .is_none()
    {
        return Err(AppError::NotFound(format!("user {user_id}")));
    }
    state
        .simulation_repo
        .fetch_user_simulations(user_id)
        .await
        .map_err(AppError::Internal)
}
