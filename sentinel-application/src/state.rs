use std::sync::Arc;

use sentinel_domain::ports::{
    ChatAssistant,
    ChatRepository,
    EventPublisher,
    HealthCheckService,
    MetricRepository,
    NewsRepository,
    SimulationRepository,
    ThreatRepository,
    UserRepository,
};
use sentinel_domain::RuntimeConfig;

use crate::{Metrics, NotificationHub};

#[derive(Clone)]
pub struct AppState {
    pub config: RuntimeConfig,
    pub threat_repo: Arc<dyn ThreatRepository>,
    pub metric_repo: Arc<dyn MetricRepository>,
    pub user_repo: Arc<dyn UserRepository>,
    pub news_repo: Arc<dyn NewsRepository>,
    pub simulation_repo: Arc<dyn SimulationRepository>,
    pub chat_repo: Arc<dyn ChatRepository>,
    /// Owns the live channel set; only the stream handler registers channels.
    pub hub: Arc<NotificationHub>,
    /// Publish capability handed to the mutation commands. Normally the hub itself.
    pub publisher: Arc<dyn EventPublisher>,
    pub assistant: Arc<dyn ChatAssistant>,
    pub health_service: Arc<dyn HealthCheckService>,
    pub metrics: Arc<Metrics>,
}
