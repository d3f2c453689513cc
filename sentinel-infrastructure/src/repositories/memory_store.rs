// Process-local store; the default backend and the one the tests run against.

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;

use sentinel_domain::ports::{
    ChatRepository,
    MetricRepository,
    NewsRepository,
    SimulationRepository,
    StoreMaintenance,
    ThreatRepository,
    UserRepository,
};
use sentinel_domain::{
    new_record_id,
    ChatMessage,
    DuplicateKey,
    MetricType,
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
    ThreatStatus,
    User,
    UserChanges,
    UserSimulation,
    UserSimulationChanges,
};

/// Rows are kept in insertion order.
#[derive(Debug, Default)]
struct Tables {
    threats: Vec<Threat>,
    metrics: Vec<SystemMetric>,
    users: Vec<User>,
    articles: Vec<NewsArticle>,
    simulations: Vec<Simulation>,
    user_simulations: Vec<UserSimulation>,
    chat_messages: Vec<ChatMessage>,
}

#[derive(Debug, Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

/// Newest first; later inserts win ties.
fn newest_first<T: Clone, K: Ord>(rows: &[T], key: impl Fn(&T) -> K) -> Vec<T> {
    let mut out: Vec<T> = rows.iter().rev().cloned().collect();
    out.sort_by(|a, b| key(b).cmp(&key(a)));
    out
}

/// Runs under the same write lock as the insert or update it guards.
fn check_user_keys(
    users: &[User],
    own_id: Option<&str>,
    username: Option<&str>,
    email: Option<&str>,
) -> Result<(), DuplicateKey> {
    for user in users.iter().filter(|user| Some(user.id.as_str()) != own_id) {
        if let Some(username) = username.filter(|name| user.username == *name) {
            return Err(DuplicateKey::new("username", username));
        }
        if let Some(email) = email.filter(|email| user.email.eq_ignore_ascii_case(email)) {
            return Err(DuplicateKey::new("email", email));
        }
    }
    Ok(())
}

#[async_trait]
impl ThreatRepository for MemoryStore {
    async fn insert_threat(&self, threat: NewThreat) -> anyhow::Result<Threat> {
        let threat = threat.into_threat(new_record_id(), Utc::now());
        self.tables.write().await.threats.push(threat.clone());
        Ok(threat)
    }

    async fn update_threat(
        &self,
        id: &str,
        changes: &ThreatChanges,
    ) -> anyhow::Result<Option<Threat>> {
        let mut tables = self.tables.write().await;
        let Some(threat) = tables.threats.iter_mut().find(|threat| threat.id == id) else {
            return Ok(None);
        };
        changes.apply(threat);
        Ok(Some(threat.clone()))
    }

    async fn fetch_threat(&self, id: &str) -> anyhow::Result<Option<Threat>> {
        let tables = self.tables.read().await;
        Ok(tables.threats.iter().find(|threat| threat.id == id).cloned())
    }

    async fn fetch_threats(&self, filter: &ThreatFilter) -> anyhow::Result<Vec<Threat>> {
        let tables = self.tables.read().await;
        let matching: Vec<Threat> = tables
            .threats
            .iter()
            .filter(|threat| filter.matches(threat))
            .cloned()
            .collect();
        Ok(newest_first(&matching, |threat| threat.detected_at))
    }

    async fn fetch_threat_stats(&self) -> anyhow::Result<ThreatStats> {
        let tables = self.tables.read().await;
        let mut stats = ThreatStats::default();
        for threat in tables
            .threats
            .iter()
            .filter(|threat| threat.status == ThreatStatus::Active)
        {
            stats.record(threat.severity, 1);
        }
        Ok(stats)
    }

    async fn ping(&self) -> anyhow::Result<()> {
        Ok(())
    }
}

#[async_trait]
impl MetricRepository for MemoryStore {
    async fn insert_metric(&self, metric: NewMetric) -> anyhow::Result<SystemMetric> {
        let metric = SystemMetric {
            id: new_record_id(),
            metric_type: metric.metric_type,
            value: metric.value,
            metadata: metric.metadata,
            timestamp: Utc::now(),
        };
        self.tables.write().await.metrics.push(metric.clone());
        Ok(metric)
    }

    async fn fetch_metrics(
        &self,
        metric_type: Option<MetricType>,
        limit: usize,
    ) -> anyhow::Result<Vec<SystemMetric>> {
        let tables = self.tables.read().await;
        let matching: Vec<SystemMetric> = tables
            .metrics
            .iter()
            .filter(|metric| metric_type.map_or(true, |kind| metric.metric_type == kind))
            .cloned()
            .collect();
        let mut out = newest_first(&matching, |metric| metric.timestamp);
        out.truncate(limit);
        Ok(out)
    }

    async fn fetch_latest_metric(
        &self,
        metric_type: MetricType,
    ) -> anyhow::Result<Option<SystemMetric>> {
        Ok(self.fetch_metrics(Some(metric_type), 1).await?.into_iter().next())
    }
}

#[async_trait]
impl UserRepository for MemoryStore {
    async fn insert_user(&self, user: NewUser) -> anyhow::Result<User> {
        let mut tables = self.tables.write().await;
        check_user_keys(&tables.users, None, Some(&user.username), Some(&user.email))?;
        let user = user.into_user(new_record_id(), Utc::now());
        tables.users.push(user.clone());
        Ok(user)
    }

    async fn update_user(&self, id: &str, changes: &UserChanges) -> anyhow::Result<Option<User>> {
        let mut tables = self.tables.write().await;
        if !tables.users.iter().any(|user| user.id == id) {
            return Ok(None);
        }
        check_user_keys(
            &tables.users,
            Some(id),
            changes.username.as_deref(),
            changes.email.as_deref(),
        )?;
        let Some(user) = tables.users.iter_mut().find(|user| user.id == id) else {
            return Ok(None);
        };
        changes.apply(user, Utc::now());
        Ok(Some(user.clone()))
    }

    async fn fetch_user(&self, id: &str) -> anyhow::Result<Option<User>> {
        let tables = self.tables.read().await;
        Ok(tables.users.iter().find(|user| user.id == id).cloned())
    }

    async fn fetch_user_by_username(&self, username: &str) -> anyhow::Result<Option<User>> {
        let tables = self.tables.read().await;
        Ok(tables
            .users
            .iter()
            .find(|user| user.username == username)
            .cloned())
    }

    async fn fetch_user_by_email(&self, email: &str) -> anyhow::Result<Option<User>> {
        let tables = self.tables.read().await;
        Ok(tables
            .users
            .iter()
            .find(|user| user.email.eq_ignore_ascii_case(email))
            .cloned())
    }

    async fn fetch_users(&self, limit: usize) -> anyhow::Result<Vec<User>> {
        let tables = self.tables.read().await;
        let mut out = newest_first(&tables.users, |user| user.created_at);
        out.truncate(limit);
        Ok(out)
    }
}

#[async_trait]
impl NewsRepository for MemoryStore {
    async fn insert_article(&self, article: NewArticle) -> anyhow::Result<NewsArticle> {
        let article = article.into_article(new_record_id(), Utc::now());
        self.tables.write().await.articles.push(article.clone());
        Ok(article)
    }

    async fn fetch_articles(&self, limit: usize) -> anyhow::Result<Vec<NewsArticle>> {
        let tables = self.tables.read().await;
        let mut out = newest_first(&tables.articles, |article| article.published_at);
        out.truncate(limit);
        Ok(out)
    }
}

#[async_trait]
impl SimulationRepository for MemoryStore {
    async fn insert_simulation(&self, simulation: NewSimulation) -> anyhow::Result<Simulation> {
        let simulation = simulation.into_simulation(new_record_id(), Utc::now());
        self.tables.write().await.simulations.push(simulation.clone());
        Ok(simulation)
    }

    async fn fetch_active_simulations(&self) -> anyhow::Result<Vec<Simulation>> {
        let tables = self.tables.read().await;
        Ok(tables
            .simulations
            .iter()
            .filter(|simulation| simulation.is_active)
            .cloned()
            .collect())
    }

    async fn fetch_simulation(&self, id: &str) -> anyhow::Result<Option<Simulation>> {
        let tables = self.tables.read().await;
        Ok(tables
            .simulations
            .iter()
            .find(|simulation| simulation.id == id)
            .cloned())
    }

    async fn insert_user_simulation(
        &self,
        attempt: NewUserSimulation,
    ) -> anyhow::Result<UserSimulation> {
        let attempt = attempt.into_user_simulation(new_record_id(), Utc::now());
        self.tables
            .write()
            .await
            .user_simulations
            .push(attempt.clone());
        Ok(attempt)
    }

    async fn fetch_user_simulation(&self, id: &str) -> anyhow::Result<Option<UserSimulation>> {
        let tables = self.tables.read().await;
        Ok(tables
            .user_simulations
            .iter()
            .find(|attempt| attempt.id == id)
            .cloned())
    }

    async fn update_user_simulation(
        &self,
        id: &str,
        changes: &UserSimulationChanges,
    ) -> anyhow::Result<Option<UserSimulation>> {
        let mut tables = self.tables.write().await;
        let Some(attempt) = tables
            .user_simulations
            .iter_mut()
            .find(|attempt| attempt.id == id)
        else {
            return Ok(None);
        };
        changes.apply(attempt);
        Ok(Some(attempt.clone()))
    }

    async fn fetch_user_simulations(&self, user_id: &str) -> anyhow::Result<Vec<UserSimulation>> {
        let tables = self.tables.read().await;
        let matching: Vec<UserSimulation> = tables
            .user_simulations
            .iter()
            .filter(|attempt| attempt.user_id == user_id)
            .cloned()
            .collect();
        Ok(newest_first(&matching, |attempt| attempt.started_at))
    }
}

#[async_trait]
impl ChatRepository for MemoryStore {
    async fn insert_chat_message(&self, message: NewChatMessage) -> anyhow::Result<ChatMessage> {
        let message = message.into_message(new_record_id(), Utc::now());
        self.tables.write().await.chat_messages.push(message.clone());
        Ok(message)
    }

    async fn fetch_chat_messages(
        &self,
        user_id: &str,
        limit: usize,
    ) -> anyhow::Result<Vec<ChatMessage>> {
        let tables = self.tables.read().await;
        let matching: Vec<ChatMessage> = tables
            .chat_messages
            .iter()
            .filter(|message| message.user_id == user_id)
            .cloned()
            .collect();
        let mut out = newest_first(&matching, |message| message.created_at);
        out.truncate(limit);
        Ok(out)
    }
}

#[async_trait]
impl StoreMaintenance for MemoryStore {
    async fn is_empty(&self) -> anyhow::Result<bool> {
        let tables = self.tables.read().await;
        Ok(tables.threats.is_empty()
            && tables.metrics.is_empty()
            && tables.users.is_empty()
            && tables.articles.is_empty()
            && tables.simulations.is_empty())
    }

    async fn clear_all(&self) -> anyhow::Result<()> {
        *self.tables.write().await = Tables::default();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sentinel_domain::Severity;

    fn threat(title: &str, severity: Severity, status: ThreatStatus) -> NewThreat {
        NewThreat {
            threat_type: "malware".to_string(),
            title: title.to_string(),
            description: "sample".to_string(),
            severity,
            status,
            source_ip: None,
            target_system: None,
            location: None,
            ai_confidence: 50,
            affected_users: 0,
            mitigated_at: None,
            metadata: None,
        }
    }

    fn new_user(username: &str, email: &str) -> NewUser {
        NewUser {
            username: username.to_string(),
            email: email.to_string(),
            first_name: None,
            last_name: None,
            role: Default::default(),
            status: Default::default(),
            profile_image_url: None,
        }
    }

    #[tokio::test]
    async fn duplicate_user_keys_are_refused_inside_the_write() {
        let store = MemoryStore::new();
        let first = store
            .insert_user(new_user("neo", "neo@zion.io"))
            .await
            .expect("first");
        let other = store
            .insert_user(new_user("trinity", "trinity@zion.io"))
            .await
            .expect("other");

        let err = store
            .insert_user(new_user("neo", "another@zion.io"))
            .await
            .expect_err("username taken");
        assert_eq!(
            err.downcast_ref::<DuplicateKey>(),
            Some(&DuplicateKey::new("username", "neo"))
        );

        let err = store
            .insert_user(new_user("morpheus", "NEO@zion.io"))
            .await
            .expect_err("email taken");
        assert_eq!(
            err.downcast_ref::<DuplicateKey>().map(|dup| dup.field),
            Some("email")
        );

        let steal = UserChanges {
            email: Some("neo@zion.io".to_string()),
            ..UserChanges::default()
        };
        let err = store
            .update_user(&other.id, &steal)
            .await
            .expect_err("email owned by another user");
        assert!(err.downcast_ref::<DuplicateKey>().is_some());

        let keep = UserChanges {
            username: Some("neo".to_string()),
            ..UserChanges::default()
        };
        let same = store
            .update_user(&first.id, &keep)
            .await
            .expect("own username")
            .expect("present");
        assert_eq!(same.username, "neo");
        assert_eq!(store.fetch_users(10).await.expect("users").len(), 2);
    }

    #[tokio::test]
    async fn update_unknown_threat_returns_none() {
        let store = MemoryStore::new();
        let result = store
            .update_threat("missing", &ThreatChanges::mitigation(Utc::now()))
            .await
            .expect("update");
        assert!(result.is_none());
    }

    #[tokio::test]
    async fn threats_list_newest_first_and_stats_count_active_only() {
        let store = MemoryStore::new();
        store
            .insert_threat(threat("first", Severity::Critical, ThreatStatus::Active))
            .await
            .expect("first");
        store
            .insert_threat(threat("second", Severity::Low, ThreatStatus::Resolved))
            .await
            .expect("second");
        store
            .insert_threat(threat("third", Severity::Critical, ThreatStatus::Active))
            .await
            .expect("third");

        let all = store
            .fetch_threats(&ThreatFilter::default())
            .await
            .expect("list");
        assert_eq!(all[0].title, "third");
        assert_eq!(all[2].title, "first");

        let stats = store.fetch_threat_stats().await.expect("stats");
        assert_eq!(stats.critical, 2);
        assert_eq!(stats.low, 0);
    }

    #[tokio::test]
    async fn metric_history_is_append_only() {
        let store = MemoryStore::new();
        for value in [90, 91, 92] {
            store
                .insert_metric(NewMetric {
                    metric_type: MetricType::SystemHealth,
                    value,
                    metadata: None,
                })
                .await
                .expect("insert");
        }
        let history = store
            .fetch_metrics(Some(MetricType::SystemHealth), 10)
            .await
            .expect("history");
        assert_eq!(history.len(), 3);
        let latest = store
            .fetch_latest_metric(MetricType::SystemHealth)
            .await
            .expect("latest")
            .expect("present");
        assert_eq!(latest.value, 92);
        assert!(store
            .fetch_latest_metric(MetricType::AiConfidence)
            .await
            .expect("latest")
            .is_none());
    }

    #[tokio::test]
    async fn clear_all_empties_the_store() {
        let store = MemoryStore::new();
        store
            .insert_threat(threat("t", Severity::High, ThreatStatus::Active))
            .await
            .expect("insert");
        assert!(!store.is_empty().await.expect("is_empty"));
        store.clear_all().await.expect("clear");
        assert!(store.is_empty().await.expect("is_empty"));
    }
}
