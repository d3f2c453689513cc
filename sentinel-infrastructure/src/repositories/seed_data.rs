use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tokio::fs;
use tracing::info;

use sentinel_domain::ports::{
    MetricRepository,
    NewsRepository,
    SimulationRepository,
    StoreMaintenance,
    ThreatRepository,
    UserRepository,
};
use sentinel_domain::{NewArticle, NewMetric, NewSimulation, NewThreat, NewUser};

const BUILTIN_SEED: &str = include_str!("../../seed/default.yaml");

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct SeedDataset {
    pub users: Vec<NewUser>,
    pub threats: Vec<NewThreat>,
    pub news: Vec<NewArticle>,
    pub simulations: Vec<NewSimulation>,
    pub metrics: Vec<NewMetric>,
}

impl SeedDataset {
    pub fn builtin() -> Result<Self> {
        serde_yaml::from_str(BUILTIN_SEED).context("parse built-in seed dataset")
    }

    pub async fn load(path: &str) -> Result<Self> {
        let content = fs::read_to_string(Path::new(path))
            .await
            .with_context(|| format!("read seed file {path}"))?;
        serde_yaml::from_str(&content).with_context(|| format!("parse seed file {path}"))
    }

    /// The file at `path` when configured, the built-in dataset otherwise.
    pub async fn resolve(path: Option<&str>) -> Result<Self> {
        match path {
            Some(path) => Self::load(path).await,
            None => Self::builtin(),
        }
    }
}

/// Everything seeding touches, as one object-safe bound.
pub trait SeedableStore:
    ThreatRepository + MetricRepository + UserRepository + NewsRepository + SimulationRepository + StoreMaintenance
{
}

impl<T> SeedableStore for T where
    T: ThreatRepository
        + MetricRepository
        + UserRepository
        + NewsRepository
        + SimulationRepository
        + StoreMaintenance
{
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SeedReport {
    pub skipped: bool,
    pub users: usize,
    pub threats: usize,
    pub articles: usize,
    pub simulations: usize,
    pub metrics: usize,
}

/// Loads the dataset into the store. Without `reset`, a store that already holds
/// data is left alone.
pub async fn seed_store(
    store: &dyn SeedableStore,
    dataset: SeedDataset,
    reset: bool,
) -> Result<SeedReport> {
    if reset {
        store.clear_all().await?;
        info!("store cleared before seeding");
    } else if !store.is_empty().await? {
        info!("store already holds data; skipping seed");
        return Ok(SeedReport {
            skipped: true,
            ..SeedReport::default()
        });
    }

    let mut report = SeedReport::default();
    for user in dataset.users {
        store.insert_user(user).await.context("seed user")?;
        report.users += 1;
    }
    for threat in dataset.threats {
        store.insert_threat(threat).await.context("seed threat")?;
        report.threats += 1;
    }
    for article in dataset.news {
        store.insert_article(article).await.context("seed article")?;
        report.articles += 1;
    }
    for simulation in dataset.simulations {
        store
            .insert_simulation(simulation)
            .await
            .context("seed simulation")?;
        report.simulations += 1;
    }
    for metric in dataset.metrics {
        store.insert_metric(metric).await.context("seed metric")?;
        report.metrics += 1;
    }
    info!(
        users = report.users,
        threats = report.threats,
        articles = report.articles,
        simulations = report.simulations,
        metrics = report.metrics,
        "store seeded"
    );
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repositories::MemoryStore;
    use sentinel_domain::{MetricType, Severity, ThreatFilter, UserStatus};

    #[test]
    fn builtin_dataset_parses() {
        let dataset = SeedDataset::builtin().expect("builtin");
        assert_eq!(dataset.users.len(), 4);
        assert_eq!(dataset.threats.len(), 5);
        assert_eq!(dataset.news.len(), 3);
        assert_eq!(dataset.simulations.len(), 3);
        assert_eq!(dataset.metrics.len(), 3);
        assert_eq!(dataset.threats[0].severity, Severity::Critical);
        assert_eq!(dataset.users[3].status, UserStatus::Suspended);
        assert_eq!(dataset.simulations[2].max_points, 300);
    }

    #[tokio::test]
    async fn seeding_skips_populated_store_unless_reset() {
        let store = MemoryStore::new();
        let first = seed_store(&store, SeedDataset::builtin().expect("builtin"), false)
            .await
            .expect("seed");
        assert!(!first.skipped);
        assert_eq!(first.threats, 5);

        let second = seed_store(&store, SeedDataset::builtin().expect("builtin"), false)
            .await
            .expect("seed again");
        assert!(second.skipped);
        let threats = store
            .fetch_threats(&ThreatFilter::default())
            .await
            .expect("threats");
        assert_eq!(threats.len(), 5);

        let reset = seed_store(&store, SeedDataset::builtin().expect("builtin"), true)
            .await
            .expect("reset");
        assert!(!reset.skipped);
        let threats = store
            .fetch_threats(&ThreatFilter::default())
            .await
            .expect("threats");
        assert_eq!(threats.len(), 5);
        let health = store
            .fetch_latest_metric(MetricType::SystemHealth)
            .await
            .expect("metric")
            .expect("present");
        assert_eq!(health.value, 96);
    }
}
