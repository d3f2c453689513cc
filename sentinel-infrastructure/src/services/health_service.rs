use std::sync::Arc;

use async_trait::async_trait;
use sentinel_domain::ports::{HealthCheckService, ThreatRepository};

pub struct DefaultHealthService {
    threat_repo: Arc<dyn ThreatRepository>,
}

impl DefaultHealthService {
    pub fn new(threat_repo: Arc<dyn ThreatRepository>) -> Self {
        Self { threat_repo }
    }
}

#[async_trait]
impl HealthCheckService for DefaultHealthService {
    async fn check_database(&self) -> anyhow::Result<bool> {
        self.threat_repo.ping().await.map(|_| true)
    }
}
