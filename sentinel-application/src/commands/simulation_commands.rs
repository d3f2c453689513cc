use chrono::Utc;
use sentinel_domain::{
    NewUserSimulation,
    StartSimulationRequest,
    UserSimulation,
    UserSimulationChanges,
    UserSimulationPatch,
};
use tracing::info;

use crate::commands::input::{bounded_int, required_text};
use crate::{AppError, AppState};

const MAX_TIME_SPENT_MINUTES: i64 = 24 * 60;

pub async fn start_simulation(
    state: &AppState,
    simulation_id: &str,
    request: StartSimulationRequest,
) -> Result<UserSimulation, AppError> {
    let user_id = required_text("userId", request.user_id)?;
    let simulation_id = simulation_id.trim();

    let simulation = state
        .simulation_repo
        .fetch_simulation(simulation_id)
        .await
        .map_err(AppError::Internal)?
        .filter(|simulation| simulation.is_active)
        .ok_or_else(|| AppError::NotFound(format!("simulation {simulation_id}")))?;
    if state
        .user_repo
        .fetch_user(&user_id)
        .await
        .map_err(AppError::Internal)?
        .is_none()
    {
        return Err(AppError::NotFound(format!("user {user_id}")));
    }

    let attempt = state
        .simulation_repo
        .insert_user_simulation(NewUserSimulation {
            user_id,
            simulation_id: simulation.id,
        })
        .await
        .map_err(AppError::Internal)?;
    state.metrics.record_mutation();
    info!(
        attempt = %attempt.id,
        simulation = %attempt.simulation_id,
        user = %attempt.user_id,
        "simulation started"
    );
    Ok(attempt)
}

pub async fn update_user_simulation(
    state: &AppState,
    id: &str,
    patch: UserSimulationPatch,
) -> Result<UserSimulation, AppError> {
    let time_spent = patch
        .time_spent
        .map(|value| bounded_int("timeSpent", value, 0, MAX_TIME_SPENT_MINUTES))
        .transpose()?;
    if let Some(score) = patch.score {
        if score < 0 {
            return Err(AppError::BadRequest("score must not be negative".to_string()));
        }
    }
    let changes_requested = patch.score.is_some()
        || time_spent.is_some()
        || patch.results.as_ref().is_some_and(|value| !value.is_null())
        || patch.completed == Some(true);
    if !changes_requested {
        return Err(AppError::BadRequest(
            "simulation update must change at least one field".to_string(),
        ));
    }

    let id = id.trim();
    let attempt = state
        .simulation_repo
        .fetch_user_simulation(id)
        .await
        .map_err(AppError::Internal)?
        .ok_or_else(|| AppError::NotFound(format!("user simulation {id}")))?;
    let simulation = state
        .simulation_repo
        .fetch_simulation(&attempt.simulation_id)
        .await
        .map_err(AppError::Internal)?
        .ok_or_else(|| AppError::NotFound(format!("simulation {}", attempt.simulation_id)))?;

    let score = patch
        .score
        .map(|value| bounded_int("score", value, 0, i64::from(simulation.max_points)))
        .transpose()?;
    let changes = UserSimulationChanges {
        score,
        time_spent,
        results: patch.results.filter(|value| !value.is_null()),
        completed_at: (patch.completed == Some(true)).then(Utc::now),
    };

    let updated = state
        .simulation_repo
        .update_user_simulation(id, &changes)
        .await
        .map_err(AppError::Internal)?
        .ok_or_else(|| AppError::NotFound(format!("user simulation {id}")))?;
    state.metrics.record_mutation();
    info!(
        attempt = %updated.id,
        score = updated.score,
        completed = updated.completed_at.is_some(),
        "simulation attempt updated"
    );
    Ok(updated)
}
