// War game simulations and per-operative attempts

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::value_objects::Difficulty;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Simulation {
    pub id: String,
    pub name: String,
    pub description: String,
    #[serde(rename = "type")]
    pub simulation_type: String,
    pub difficulty: Difficulty,
    /// Minutes.
    pub duration: i32,
    pub max_points: i32,
    pub instructions: String,
    pub scenarios: Option<Value>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewSimulation {
    pub name: String,
    pub description: String,
    #[serde(rename = "type")]
    pub simulation_type: String,
    pub difficulty: Difficulty,
    pub duration: i32,
    pub max_points: i32,
    pub instructions: String,
    #[serde(default)]
    pub scenarios: Option<Value>,
    #[serde(default = "default_active")]
    pub is_active: bool,
}

fn default_active() -> bool {
    true
}

impl NewSimulation {
    pub fn into_simulation(self, id: String, created_at: DateTime<Utc>) -> Simulation {
        Simulation {
            id,
            name: self.name,
            description: self.description,
            simulation_type: self.simulation_type,
            difficulty: self.difficulty,
            duration: self.duration,
            max_points: self.max_points,
            instructions: self.instructions,
            scenarios: self.scenarios,
            is_active: self.is_active,
            created_at,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserSimulation {
    pub id: String,
    pub user_id: String,
    pub simulation_id: String,
    pub score: i32,
    pub completed_at: Option<DateTime<Utc>>,
    /// Minutes.
    pub time_spent: Option<i32>,
    pub results: Option<Value>,
    pub started_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewUserSimulation {
    pub user_id: String,
    pub simulation_id: String,
}

impl NewUserSimulation {
    pub fn into_user_simulation(self, id: String, started_at: DateTime<Utc>) -> UserSimulation {
        UserSimulation {
            id,
            user_id: self.user_id,
            simulation_id: self.simulation_id,
            score: 0,
            completed_at: None,
            time_spent: None,
            results: None,
            started_at,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StartSimulationRequest {
    pub user_id: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserSimulationPatch {
    pub score: Option<i64>,
    pub time_spent: Option<i64>,
    pub results: Option<Value>,
    pub completed: Option<bool>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct UserSimulationChanges {
    pub score: Option<i32>,
    pub time_spent: Option<i32>,
    pub results: Option<Value>,
    pub completed_at: Option<DateTime<Utc>>,
}

impl UserSimulationChanges {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    pub fn apply(&self, attempt: &mut UserSimulation) {
        if let Some(value) = self.score {
            attempt.score = value;
        }
        if let Some(value) = self.time_spent {
            attempt.time_spent = Some(value);
        }
        if let Some(value) = &self.results {
            attempt.results = Some(value.clone());
        }
        if let Some(value) = self.completed_at {
            attempt.completed_at = Some(value);
        }
    }
}
