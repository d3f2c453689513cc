use axum::body::Bytes;
use axum::extract::{Path, State};
use axum::Json;

use sentinel_application::commands::simulation_commands;
use sentinel_application::queries::simulation_queries;
use sentinel_application::AppState;
use sentinel_domain::{Simulation, StartSimulationRequest, UserSimulation, UserSimulationPatch};

use crate::error::HttpError;
use crate::middleware::parse_json_body;

pub async fn list_simulations(
    State(state): State<AppState>,
) -> Result<Json<Vec<Simulation>>, HttpError> {
    let simulations = simulation_queries::list_simulations(&state).await?;
    Ok(Json(simulations))
}

pub async fn start_simulation(
    State(state): State<AppState>,
    Path(id): Path<String>,
    body: Bytes,
) -> Result<Json<UserSimulation>, HttpError> {
    let request: StartSimulationRequest = parse_json_body(&body)?;
    let attempt = simulation_commands::start_simulation(&state, &id, request).await?;
    Ok(Json(attempt))
}

pub async fn update_user_simulation(
    State(state): State<AppState>,
    Path(id): Path<String>,
    body: Bytes,
) -> Result<Json<UserSimulation>, HttpError> {
    let patch: UserSimulationPatch = parse_json_body(&body)?;
    let attempt = simulation_commands::update_user_simulation(&state, &id, patch).await?;
    Ok(Json(attempt))
}
