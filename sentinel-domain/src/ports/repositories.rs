use async_trait::async_trait;

use crate::entities::{
    ChatMessage,
    NewArticle,
    NewChatMessage,
    NewMetric,
    NewSimulation,
    NewThreat,
    NewUser,
    NewUserSimulation,
    NewsArticle,
    Simulation,
    SystemMetric,
    Threat,
    ThreatChanges,
    ThreatFilter,
    ThreatStats,
    User,
    UserChanges,
    UserSimulation,
    UserSimulationChanges,
};
use crate::value_objects::MetricType;

#[async_trait]
pub trait ThreatRepository: Send + Sync {
    async fn insert_threat(&self, threat: NewThreat) -> anyhow::Result<Threat>;
    /// Returns `None` when no threat has this id.
    async fn update_threat(
        &self,
        id: &str,
        changes: &ThreatChanges,
    ) -> anyhow::Result<Option<Threat>>;
    async fn fetch_threat(&self, id: &str) -> anyhow::Result<Option<Threat>>;
    /// Newest `detected_at` first.
    async fn fetch_threats(&self, filter: &ThreatFilter) -> anyhow::Result<Vec<Threat>>;
    async fn fetch_threat_stats(&self) -> anyhow::Result<ThreatStats>;
    async fn ping(&self) -> anyhow::Result<()>;
}

#[async_trait]
pub trait MetricRepository: Send + Sync {
    async fn insert_metric(&self, metric: NewMetric) -> anyhow::Result<SystemMetric>;
    async fn fetch_metrics(
        &self,
        metric_type: Option<MetricType>,
        limit: usize,
    ) -> anyhow::Result<Vec<SystemMetric>>;
    async fn fetch_latest_metric(
        &self,
        metric_type: MetricType,
    ) -> anyhow::Result<Option<SystemMetric>>;
}

#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn insert_user(&self, user: NewUser) -> anyhow::Result<User>;
    async fn update_user(&self, id: &str, changes: &UserChanges) -> anyhow::Result<Option<User>>;
    async fn fetch_user(&self, id: &str) -> anyhow::Result<Option<User>>;
    async fn fetch_user_by_username(&self, username: &str) -> anyhow::Result<Option<User>>;
    async fn fetch_user_by_email(&self, email: &str) -> anyhow::Result<Option<User>>;
    async fn fetch_users(&self, limit: usize) -> anyhow::Result<Vec<User>>;
}

#[async_trait]
pub trait NewsRepository: Send + Sync {
    async fn insert_article(&self, article: NewArticle) -> anyhow::Result<NewsArticle>;
    async fn fetch_articles(&self, limit: usize) -> anyhow::Result<Vec<NewsArticle>>;
}

#[async_trait]
pub trait SimulationRepository: Send + Sync {
    async fn insert_simulation(&self, simulation: NewSimulation) -> anyhow::Result<Simulation>;
    async fn fetch_active_simulations(&self) -> anyhow::Result<Vec<Simulation>>;
    async fn fetch_simulation(&self, id: &str) -> anyhow::Result<Option<Simulation>>;
    async fn insert_user_simulation(
        &self,
        attempt: NewUserSimulation,
    ) -> anyhow::Result<UserSimulation>;
    async fn fetch_user_simulation(&self, id: &str) -> anyhow::Result<Option<UserSimulation>>;
    async fn update_user_simulation(
        &self,
        id: &str,
        changes: &UserSimulationChanges,
    ) -> anyhow::Result<Option<UserSimulation>>;
    async fn fetch_user_simulations(&self, user_id: &str) -> anyhow::Result<Vec<UserSimulation>>;
}

#[async_trait]
pub trait ChatRepository: Send + Sync {
    async fn insert_chat_message(&self, message: NewChatMessage) -> anyhow::Result<ChatMessage>;
    async fn fetch_chat_messages(
        &self,
        user_id: &str,
        limit: usize,
    ) -> anyhow::Result<Vec<ChatMessage>>;
}

/// Whole-store housekeeping used by seeding.
#[async_trait]
pub trait StoreMaintenance: Send + Sync {
    async fn is_empty(&self) -> anyhow::Result<bool>;
    async fn clear_all(&self) -> anyhow::Result<()>;
}
