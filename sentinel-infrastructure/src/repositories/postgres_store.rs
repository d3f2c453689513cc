// PostgreSQL backend
//
// Enum columns hold their wire strings; ids are generated here, not by the database.

use std::sync::Arc;

use anyhow::Context;
use async_trait::async_trait;
use chrono::Utc;
use tokio_postgres::error::SqlState;
use tokio_postgres::types::ToSql;
use tokio_postgres::{Client, NoTls, Row};
use tracing::{error, info};

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
    ChatIntent,
    ChatMessage,
    Difficulty,
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
    Severity,
    Simulation,
    SystemMetric,
    Threat,
    ThreatChanges,
    ThreatFilter,
    ThreatStats,
    ThreatStatus,
    User,
    UserChanges,
    UserRole,
    UserSimulation,
    UserSimulationChanges,
    UserStatus,
};

const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS users (
    id                TEXT PRIMARY KEY,
    username          TEXT NOT NULL UNIQUE,
    email             TEXT NOT NULL UNIQUE,
    first_name        TEXT,
    last_name         TEXT,
    role              TEXT NOT NULL,
    status            TEXT NOT NULL,
    profile_image_url TEXT,
    last_active       TIMESTAMPTZ NOT NULL,
    created_at        TIMESTAMPTZ NOT NULL,
    updated_at        TIMESTAMPTZ NOT NULL
);
CREATE TABLE IF NOT EXISTS threats (
    id             TEXT PRIMARY KEY,
    type           TEXT NOT NULL,
    title          TEXT NOT NULL,
    description    TEXT NOT NULL,
    severity       TEXT NOT NULL,
    status         TEXT NOT NULL,
    source_ip      TEXT,
    target_system  TEXT,
    location       TEXT,
    ai_confidence  INTEGER NOT NULL DEFAULT 0,
    affected_users INTEGER NOT NULL DEFAULT 0,
    detected_at    TIMESTAMPTZ NOT NULL,
    mitigated_at   TIMESTAMPTZ,
    metadata       JSONB
);
CREATE INDEX IF NOT EXISTS threats_detected_at_idx ON threats (detected_at DESC);
CREATE TABLE IF NOT EXISTS system_metrics (
    id          TEXT PRIMARY KEY,
    metric_type TEXT NOT NULL,
    value       INTEGER NOT NULL,
    metadata    JSONB,
    timestamp   TIMESTAMPTZ NOT NULL
);
CREATE INDEX IF NOT EXISTS system_metrics_type_ts_idx ON system_metrics (metric_type, timestamp DESC);
CREATE TABLE IF NOT EXISTS news_articles (
    id           TEXT PRIMARY KEY,
    title        TEXT NOT NULL,
    description  TEXT NOT NULL,
    content      TEXT,
    source       TEXT NOT NULL,
    category     TEXT NOT NULL,
    tags         TEXT[] NOT NULL DEFAULT '{}',
    url          TEXT,
    image_url    TEXT,
    published_at TIMESTAMPTZ NOT NULL,
    created_at   TIMESTAMPTZ NOT NULL
);
CREATE TABLE IF NOT EXISTS simulations (
    id           TEXT PRIMARY KEY,
    name         TEXT NOT NULL,
    description  TEXT NOT NULL,
    type         TEXT NOT NULL,
    difficulty   TEXT NOT NULL,
    duration     INTEGER NOT NULL,
    max_points   INTEGER NOT NULL,
    instructions TEXT NOT NULL,
    scenarios    JSONB,
    is_active    BOOLEAN NOT NULL DEFAULT TRUE,
    created_at   TIMESTAMPTZ NOT NULL
);
CREATE TABLE IF NOT EXISTS user_simulations (
    id            TEXT PRIMARY KEY,
    user_id       TEXT NOT NULL REFERENCES users (id) ON DELETE CASCADE,
    simulation_id TEXT NOT NULL REFERENCES simulations (id) ON DELETE CASCADE,
    score         INTEGER NOT NULL DEFAULT 0,
    completed_at  TIMESTAMPTZ,
    time_spent    INTEGER,
    results       JSONB,
    started_at    TIMESTAMPTZ NOT NULL
);
CREATE TABLE IF NOT EXISTS chat_messages (
    id         TEXT PRIMARY KEY,
    user_id    TEXT NOT NULL REFERENCES users (id) ON DELETE CASCADE,
    message    TEXT NOT NULL,
    response   TEXT,
    type       TEXT NOT NULL,
    metadata   JSONB,
    created_at TIMESTAMPTZ NOT NULL
);
CREATE INDEX IF NOT EXISTS chat_messages_user_idx ON chat_messages (user_id, created_at DESC);
"#;

const THREAT_COLUMNS: &str = "id, type, title, description, severity, status, source_ip, \
target_system, location, ai_confidence, affected_users, detected_at, mitigated_at, metadata";
const USER_COLUMNS: &str = "id, username, email, first_name, last_name, role, status, \
profile_image_url, last_active, created_at, updated_at";
const SIMULATION_COLUMNS: &str = "id, name, description, type, difficulty, duration, max_points, \
instructions, scenarios, is_active, created_at";
const USER_SIMULATION_COLUMNS: &str =
    "id, user_id, simulation_id, score, completed_at, time_spent, results, started_at";

#[derive(Clone)]
pub struct PostgresStore {
    client: Arc<Client>,
}

impl PostgresStore {
    pub async fn connect(database_url: &str) -> anyhow::Result<Self> {
        let (client, connection) = tokio_postgres::connect(database_url, NoTls)
            .await
            .context("connect to postgres")?;

        tokio::spawn(async move {
            if let Err(err) = connection.await {
                error!("postgres connection error: {}", err);
            }
        });

        let store = Self {
            client: Arc::new(client),
        };
        store.ensure_schema().await?;
        Ok(store)
    }

    pub async fn ensure_schema(&self) -> anyhow::Result<()> {
        self.client
            .batch_execute(SCHEMA)
            .await
            .context("create schema")?;
        info!("postgres schema ready");
        Ok(())
    }

    async fn query(
        &self,
        sql: &str,
        params: &[&(dyn ToSql + Sync)],
    ) -> anyhow::Result<Vec<Row>> {
        Ok(self.client.query(sql, params).await?)
    }

    async fn query_opt(
        &self,
        sql: &str,
        params: &[&(dyn ToSql + Sync)],
    ) -> anyhow::Result<Option<Row>> {
        Ok(self.client.query_opt(sql, params).await?)
    }

    async fn query_one(&self, sql: &str, params: &[&(dyn ToSql + Sync)]) -> anyhow::Result<Row> {
        Ok(self.client.query_one(sql, params).await?)
    }
}

/// Turns a unique-key violation on `users` into a [`DuplicateKey`].
fn user_write_error(
    err: tokio_postgres::Error,
    username: Option<&str>,
    email: Option<&str>,
) -> anyhow::Error {
    let on_email = err
        .as_db_error()
        .filter(|db| db.code() == &SqlState::UNIQUE_VIOLATION)
        .map(|db| db.constraint().is_some_and(|name| name.contains("email")));
    match (on_email, username, email) {
        (Some(true), _, Some(email)) => DuplicateKey::new("email", email).into(),
        (Some(false), Some(username), _) => DuplicateKey::new("username", username).into(),
        _ => err.into(),
    }
}

fn limit_param(limit: usize) -> i64 {
    i64::try_from(limit).unwrap_or(i64::MAX)
}

fn threat_from_row(row: &Row) -> anyhow::Result<Threat> {
    Ok(Threat {
        id: row.try_get("id")?,
        threat_type: row.try_get("type")?,
        title: row.try_get("title")?,
        description: row.try_get("description")?,
        severity: row.try_get::<_, String>("severity")?.parse::<Severity>()?,
        status: row.try_get::<_, String>("status")?.parse::<ThreatStatus>()?,
        source_ip: row.try_get("source_ip")?,
        target_system: row.try_get("target_system")?,
        location: row.try_get("location")?,
        ai_confidence: row.try_get("ai_confidence")?,
        affected_users: row.try_get("affected_users")?,
        detected_at: row.try_get("detected_at")?,
        mitigated_at: row.try_get("mitigated_at")?,
        metadata: row.try_get("metadata")?,
    })
}

fn metric_from_row(row: &Row) -> anyhow::Result<SystemMetric> {
    Ok(SystemMetric {
        id: row.try_get("id")?,
        metric_type: row.try_get::<_, String>("metric_type")?.parse::<MetricType>()?,
        value: row.try_get("value")?,
        metadata: row.try_get("metadata")?,
        timestamp: row.try_get("timestamp")?,
    })
}

fn user_from_row(row: &Row) -> anyhow::Result<User> {
    Ok(User {
        id: row.try_get("id")?,
        username: row.try_get("username")?,
        email: row.try_get("email")?,
        first_name: row.try_get("first_name")?,
        last_name: row.try_get("last_name")?,
        role: row.try_get::<_, String>("role")?.parse::<UserRole>()?,
        status: row.try_get::<_, String>("status")?.parse::<UserStatus>()?,
        profile_image_url: row.try_get("profile_image_url")?,
        last_active: row.try_get("last_active")?,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}

fn article_from_row(row: &Row) -> anyhow::Result<NewsArticle> {
    Ok(NewsArticle {
        id: row.try_get("id")?,
        title: row.try_get("title")?,
        description: row.try_get("description")?,
        content: row.try_get("content")?,
        source: row.try_get("source")?,
        category: row.try_get("category")?,
        tags: row.try_get("tags")?,
        url: row.try_get("url")?,
        image_url: row.try_get("image_url")?,
        published_at: row.try_get("published_at")?,
        created_at: row.try_get("created_at")?,
    })
}

fn simulation_from_row(row: &Row) -> anyhow::Result<Simulation> {
    Ok(Simulation {
        id: row.try_get("id")?,
        name: row.try_get("name")?,
        description: row.try_get("description")?,
        simulation_type: row.try_get("type")?,
        difficulty: row.try_get::<_, String>("difficulty")?.parse::<Difficulty>()?,
        duration: row.try_get("duration")?,
        max_points: row.try_get("max_points")?,
        instructions: row.try_get("instructions")?,
        scenarios: row.try_get("scenarios")?,
        is_active: row.try_get("is_active")?,
        created_at: row.try_get("created_at")?,
    })
}

fn user_simulation_from_row(row: &Row) -> anyhow::Result<UserSimulation> {
    Ok(UserSimulation {
        id: row.try_get("id")?,
        user_id: row.try_get("user_id")?,
        simulation_id: row.try_get("simulation_id")?,
        score: row.try_get("score")?,
        completed_at: row.try_get("completed_at")?,
        time_spent: row.try_get("time_spent")?,
        results: row.try_get("results")?,
        started_at: row.try_get("started_at")?,
    })
}

fn chat_from_row(row: &Row) -> anyhow::Result<ChatMessage> {
    Ok(ChatMessage {
        id: row.try_get("id")?,
        user_id: row.try_get("user_id")?,
        message: row.try_get("message")?,
        response: row.try_get("response")?,
        chat_type: row.try_get::<_, String>("type")?.parse::<ChatIntent>()?,
        metadata: row.try_get("metadata")?,
        created_at: row.try_get("created_at")?,
    })
}

fn collect<T>(rows: &[Row], map: fn(&Row) -> anyhow::Result<T>) -> anyhow::Result<Vec<T>> {
    rows.iter().map(map).collect()
}

#[async_trait]
impl ThreatRepository for PostgresStore {
    async fn insert_threat(&self, threat: NewThreat) -> anyhow::Result<Threat> {
        let threat = threat.into_threat(new_record_id(), Utc::now());
        self.client
            .execute(
                "INSERT INTO threats (id, type, title, description, severity, status, source_ip, \
                 target_system, location, ai_confidence, affected_users, detected_at, mitigated_at, metadata) \
                 VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14)",
                &[
                    &threat.id,
                    &threat.threat_type,
                    &threat.title,
                    &threat.description,
                    &threat.severity.as_str(),
                    &threat.status.as_str(),
                    &threat.source_ip,
                    &threat.target_system,
                    &threat.location,
                    &threat.ai_confidence,
                    &threat.affected_users,
                    &threat.detected_at,
                    &threat.mitigated_at,
                    &threat.metadata,
                ],
            )
            .await?;
        Ok(threat)
    }

    async fn update_threat(
        &self,
        id: &str,
        changes: &ThreatChanges,
    ) -> anyhow::Result<Option<Threat>> {
        let severity = changes.severity.map(|value| value.as_str());
        let status = changes.status.map(|value| value.as_str());
        let sql = format!(
            "UPDATE threats SET \
             type = COALESCE($2, type), \
             title = COALESCE($3, title), \
             description = COALESCE($4, description), \
             severity = COALESCE($5, severity), \
             status = COALESCE($6, status), \
             source_ip = COALESCE($7, source_ip), \
             target_system = COALESCE($8, target_system), \
             location = COALESCE($9, location), \
             ai_confidence = COALESCE($10, ai_confidence), \
             affected_users = COALESCE($11, affected_users), \
             mitigated_at = COALESCE($12, mitigated_at), \
             metadata = COALESCE($13, metadata) \
             WHERE id = $1 RETURNING {THREAT_COLUMNS}"
        );
        let row = self
            .query_opt(
                &sql,
                &[
                    &id,
                    &changes.threat_type,
                    &changes.title,
                    &changes.description,
                    &severity,
                    &status,
                    &changes.source_ip,
                    &changes.target_system,
                    &changes.location,
                    &changes.ai_confidence,
                    &changes.affected_users,
                    &changes.mitigated_at,
                    &changes.metadata,
                ],
            )
            .await?;
        row.as_ref().map(threat_from_row).transpose()
    }

    async fn fetch_threat(&self, id: &str) -> anyhow::Result<Option<Threat>> {
        let sql = format!("SELECT {THREAT_COLUMNS} FROM threats WHERE id = $1");
        let row = self.query_opt(&sql, &[&id]).await?;
        row.as_ref().map(threat_from_row).transpose()
    }

    async fn fetch_threats(&self, filter: &ThreatFilter) -> anyhow::Result<Vec<Threat>> {
        let mut clauses: Vec<String> = Vec::new();
        let mut params: Vec<String> = Vec::new();
        if let Some(status) = filter.status {
            params.push(status.as_str().to_string());
            clauses.push(format!("status = ${}", params.len()));
        }
        if let Some(severity) = filter.severity {
            params.push(severity.as_str().to_string());
            clauses.push(format!("severity = ${}", params.len()));
        }
        if let Some(threat_type) = &filter.threat_type {
            params.push(threat_type.to_lowercase());
            clauses.push(format!("LOWER(type) = ${}", params.len()));
        }
        if let Some(needle) = &filter.search {
            params.push(needle.to_lowercase());
            let n = params.len();
            clauses.push(format!(
                "(POSITION(${n} IN LOWER(title)) > 0 OR POSITION(${n} IN LOWER(description)) > 0)"
            ));
        }
        let where_clause = if clauses.is_empty() {
            String::new()
        } else {
            format!(" WHERE {}", clauses.join(" AND "))
        };
        let sql = format!(
            "SELECT {THREAT_COLUMNS} FROM threats{where_clause} ORDER BY detected_at DESC"
        );
        let refs: Vec<&(dyn ToSql + Sync)> = params
            .iter()
            .map(|param| param as &(dyn ToSql + Sync))
            .collect();
        let rows = self.query(&sql, &refs).await?;
        collect(&rows, threat_from_row)
    }

    async fn fetch_threat_stats(&self) -> anyhow::Result<ThreatStats> {
        let rows = self
            .query(
                "SELECT severity, COUNT(*) AS total FROM threats WHERE status = $1 GROUP BY severity",
                &[&ThreatStatus::Active.as_str()],
            )
            .await?;
        let mut stats = ThreatStats::default();
        for row in &rows {
            let severity = row.try_get::<_, String>("severity")?.parse::<Severity>()?;
            let total: i64 = row.try_get("total")?;
            stats.record(severity, u64::try_from(total).unwrap_or(0));
        }
        Ok(stats)
    }

    async fn ping(&self) -> anyhow::Result<()> {
        self.client.simple_query("SELECT 1").await?;
        Ok(())
    }
}

#[async_trait]
impl MetricRepository for PostgresStore {
    async fn insert_metric(&self, metric: NewMetric) -> anyhow::Result<SystemMetric> {
        let metric = SystemMetric {
            id: new_record_id(),
            metric_type: metric.metric_type,
            value: metric.value,
            metadata: metric.metadata,
            timestamp: Utc::now(),
        };
        self.client
            .execute(
                "INSERT INTO system_metrics (id, metric_type, value, metadata, timestamp) \
                 VALUES ($1, $2, $3, $4, $5)",
                &[
                    &metric.id,
                    &metric.metric_type.as_str(),
                    &metric.value,
                    &metric.metadata,
                    &metric.timestamp,
                ],
            )
            .await?;
        Ok(metric)
    }

    async fn fetch_metrics(
        &self,
        metric_type: Option<MetricType>,
        limit: usize,
    ) -> anyhow::Result<Vec<SystemMetric>> {
        let limit = limit_param(limit);
        let rows = match metric_type {
            Some(kind) => {
                self.query(
                    "SELECT id, metric_type, value, metadata, timestamp FROM system_metrics \
                     WHERE metric_type = $1 ORDER BY timestamp DESC LIMIT $2",
                    &[&kind.as_str(), &limit],
                )
                .await?
            }
            None => {
                self.query(
                    "SELECT id, metric_type, value, metadata, timestamp FROM system_metrics \
                     ORDER BY timestamp DESC LIMIT $1",
                    &[&limit],
                )
                .await?
            }
        };
        collect(&rows, metric_from_row)
    }

    async fn fetch_latest_metric(
        &self,
        metric_type: MetricType,
    ) -> anyhow::Result<Option<SystemMetric>> {
        Ok(self.fetch_metrics(Some(metric_type), 1).await?.into_iter().next())
    }
}

#[async_trait]
impl UserRepository for PostgresStore {
    async fn insert_user(&self, user: NewUser) -> anyhow::Result<User> {
        let user = user.into_user(new_record_id(), Utc::now());
        self.client
            .execute(
                "INSERT INTO users (id, username, email, first_name, last_name, role, status, \
                 profile_image_url, last_active, created_at, updated_at) \
                 VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)",
                &[
                    &user.id,
                    &user.username,
                    &user.email,
                    &user.first_name,
                    &user.last_name,
                    &user.role.as_str(),
                    &user.status.as_str(),
                    &user.profile_image_url,
                    &user.last_active,
                    &user.created_at,
                    &user.updated_at,
                ],
            )
            .await
            .map_err(|err| user_write_error(err, Some(&user.username), Some(&user.email)))?;
        Ok(user)
    }

    async fn update_user(&self, id: &str, changes: &UserChanges) -> anyhow::Result<Option<User>> {
        let role = changes.role.map(|value| value.as_str());
        let status = changes.status.map(|value| value.as_str());
        let sql = format!(
            "UPDATE users SET \
             username = COALESCE($2, username), \
             email = COALESCE($3, email), \
             first_name = COALESCE($4, first_name), \
             last_name = COALESCE($5, last_name), \
             role = COALESCE($6, role), \
             status = COALESCE($7, status), \
             profile_image_url = COALESCE($8, profile_image_url), \
             updated_at = $9 \
             WHERE id = $1 RETURNING {USER_COLUMNS}"
        );
        let row = self
            .client
            .query_opt(
                &sql,
                &[
                    &id,
                    &changes.username,
                    &changes.email,
                    &changes.first_name,
                    &changes.last_name,
                    &role,
                    &status,
                    &changes.profile_image_url,
                    &Utc::now(),
                ],
            )
            .await
            .map_err(|err| {
                user_write_error(err, changes.username.as_deref(), changes.email.as_deref())
            })?;
        row.as_ref().map(user_from_row).transpose()
    }

    async fn fetch_user(&self, id: &str) -> anyhow::Result<Option<User>> {
        let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE id = $1");
        let row = self.query_opt(&sql, &[&id]).await?;
        row.as_ref().map(user_from_row).transpose()
    }

    async fn fetch_user_by_username(&self, username: &str) -> anyhow::Result<Option<User>> {
        let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE username = $1");
        let row = self.query_opt(&sql, &[&username]).await?;
        row.as_ref().map(user_from_row).transpose()
    }

    async fn fetch_user_by_email(&self, email: &str) -> anyhow::Result<Option<User>> {
        let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE LOWER(email) = LOWER($1)");
        let row = self.query_opt(&sql, &[&email]).await?;
        row.as_ref().map(user_from_row).transpose()
    }

    async fn fetch_users(&self, limit: usize) -> anyhow::Result<Vec<User>> {
        let sql = format!("SELECT {USER_COLUMNS} FROM users ORDER BY created_at DESC LIMIT $1");
        let rows = self.query(&sql, &[&limit_param(limit)]).await?;
        collect(&rows, user_from_row)
    }
}

#[async_trait]
impl NewsRepository for PostgresStore {
    async fn insert_article(&self, article: NewArticle) -> anyhow::Result<NewsArticle> {
        let article = article.into_article(new_record_id(), Utc::now());
        self.client
            .execute(
                "INSERT INTO news_articles (id, title, description, content, source, category, \
                 tags, url, image_url, published_at, created_at) \
                 VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)",
                &[
                    &article.id,
                    &article.title,
                    &article.description,
                    &article.content,
                    &article.source,
                    &article.category,
                    &article.tags,
                    &article.url,
                    &article.image_url,
                    &article.published_at,
                    &article.created_at,
                ],
            )
            .await?;
        Ok(article)
    }

    async fn fetch_articles(&self, limit: usize) -> anyhow::Result<Vec<NewsArticle>> {
        let rows = self
            .query(
                "SELECT id, title, description, content, source, category, tags, url, image_url, \
                 published_at, created_at FROM news_articles ORDER BY published_at DESC LIMIT $1",
                &[&limit_param(limit)],
            )
            .await?;
        collect(&rows, article_from_row)
    }
}

#[async_trait]
impl SimulationRepository for PostgresStore {
    async fn insert_simulation(&self, simulation: NewSimulation) -> anyhow::Result<Simulation> {
        let simulation = simulation.into_simulation(new_record_id(), Utc::now());
        self.client
            .execute(
                "INSERT INTO simulations (id, name, description, type, difficulty, duration, \
                 max_points, instructions, scenarios, is_active, created_at) \
                 VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)",
                &[
                    &simulation.id,
                    &simulation.name,
                    &simulation.description,
                    &simulation.simulation_type,
                    &simulation.difficulty.as_str(),
                    &simulation.duration,
                    &simulation.max_points,
                    &simulation.instructions,
                    &simulation.scenarios,
                    &simulation.is_active,
                    &simulation.created_at,
                ],
            )
            .await?;
        Ok(simulation)
    }

    async fn fetch_active_simulations(&self) -> anyhow::Result<Vec<Simulation>> {
        let sql = format!(
            "SELECT {SIMULATION_COLUMNS} FROM simulations WHERE is_active ORDER BY created_at ASC"
        );
        let rows = self.query(&sql, &[]).await?;
        collect(&rows, simulation_from_row)
    }

    async fn fetch_simulation(&self, id: &str) -> anyhow::Result<Option<Simulation>> {
        let sql = format!("SELECT {SIMULATION_COLUMNS} FROM simulations WHERE id = $1");
        let row = self.query_opt(&sql, &[&id]).await?;
        row.as_ref().map(simulation_from_row).transpose()
    }

    async fn insert_user_simulation(
        &self,
        attempt: NewUserSimulation,
    ) -> anyhow::Result<UserSimulation> {
        let attempt = attempt.into_user_simulation(new_record_id(), Utc::now());
        self.client
            .execute(
                "INSERT INTO user_simulations (id, user_id, simulation_id, score, completed_at, \
                 time_spent, results, started_at) VALUES ($1, $2, $3, $4, $5, $6, $7, $8)",
                &[
                    &attempt.id,
                    &attempt.user_id,
                    &attempt.simulation_id,
                    &attempt.score,
                    &attempt.completed_at,
                    &attempt.time_spent,
                    &attempt.results,
                    &attempt.started_at,
                ],
            )
            .await?;
        Ok(attempt)
    }

    async fn fetch_user_simulation(&self, id: &str) -> anyhow::Result<Option<UserSimulation>> {
        let sql = format!("SELECT {USER_SIMULATION_COLUMNS} FROM user_simulations WHERE id = $1");
        let row = self.query_opt(&sql, &[&id]).await?;
        row.as_ref().map(user_simulation_from_row).transpose()
    }

    async fn update_user_simulation(
        &self,
        id: &str,
        changes: &UserSimulationChanges,
    ) -> anyhow::Result<Option<UserSimulation>> {
        let sql = format!(
            "UPDATE user_simulations SET \
             score = COALESCE($2, score), \
             time_spent = COALESCE($3, time_spent), \
             results = COALESCE($4, results), \
             completed_at = COALESCE($5, completed_at) \
             WHERE id = $1 RETURNING {USER_SIMULATION_COLUMNS}"
        );
        let row = self
            .query_opt(
                &sql,
                &[
                    &id,
                    &changes.score,
                    &changes.time_spent,
                    &changes.results,
                    &changes.completed_at,
                ],
            )
            .await?;
        row.as_ref().map(user_simulation_from_row).transpose()
    }

    async fn fetch_user_simulations(&self, user_id: &str) -> anyhow::Result<Vec<UserSimulation>> {
        let sql = format!(
            "SELECT {USER_SIMULATION_COLUMNS} FROM user_simulations WHERE user_id = $1 \
             ORDER BY started_at DESC"
        );
        let rows = self.query(&sql, &[&user_id]).await?;
        collect(&rows, user_simulation_from_row)
    }
}

#[async_trait]
impl ChatRepository for PostgresStore {
    async fn insert_chat_message(&self, message: NewChatMessage) -> anyhow::Result<ChatMessage> {
        let message = message.into_message(new_record_id(), Utc::now());
        self.client
            .execute(
                "INSERT INTO chat_messages (id, user_id, message, response, type, metadata, created_at) \
                 VALUES ($1, $2, $3, $4, $5, $6, $7)",
                &[
                    &message.id,
                    &message.user_id,
                    &message.message,
                    &message.response,
                    &message.chat_type.as_str(),
                    &message.metadata,
                    &message.created_at,
                ],
            )
            .await?;
        Ok(message)
    }

    async fn fetch_chat_messages(
        &self,
        user_id: &str,
        limit: usize,
    ) -> anyhow::Result<Vec<ChatMessage>> {
        let rows = self
            .query(
                "SELECT id, user_id, message, response, type, metadata, created_at FROM chat_messages \
                 WHERE user_id = $1 ORDER BY created_at DESC LIMIT $2",
                &[&user_id, &limit_param(limit)],
            )
            .await?;
        collect(&rows, chat_from_row)
    }
}

#[async_trait]
impl StoreMaintenance for PostgresStore {
    async fn is_empty(&self) -> anyhow::Result<bool> {
        let row = self
            .query_one(
                "SELECT NOT (EXISTS (SELECT 1 FROM users) OR EXISTS (SELECT 1 FROM threats) \
                 OR EXISTS (SELECT 1 FROM system_metrics) OR EXISTS (SELECT 1 FROM news_articles) \
                 OR EXISTS (SELECT 1 FROM simulations)) AS empty",
                &[],
            )
            .await?;
        Ok(row.try_get("empty")?)
    }

    async fn clear_all(&self) -> anyhow::Result<()> {
        self.client
            .batch_execute(
                "TRUNCATE chat_messages, user_simulations, simulations, news_articles, \
                 system_metrics, threats, users",
            )
            .await
            .context("truncate tables")?;
        info!("postgres tables cleared");
        Ok(())
    }
}
