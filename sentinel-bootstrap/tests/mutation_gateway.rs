use std::sync::{Arc, Mutex};

use anyhow::anyhow;
use async_trait::async_trait;
use sentinel_application::commands::{alert_commands, metric_commands, threat_commands, user_commands};
use sentinel_application::queries::ops_queries;
use sentinel_application::{AppError, AppState};
use sentinel_bootstrap::AppContext;
use sentinel_domain::ports::{EventPublisher, MetricRepository, ThreatRepository};
use sentinel_domain::{
    EventEnvelope,
    EventKind,
    MetricSampleDraft,
    MetricType,
    NewMetric,
    NewThreat,
    SystemAlertDraft,
    SystemMetric,
    Threat,
    ThreatChanges,
    ThreatDraft,
    ThreatFilter,
    ThreatPatch,
    ThreatStats,
    UserDraft,
};
use sentinel_infrastructure::{AppConfig, MemoryStore};

#[derive(Default)]
struct RecordingPublisher {
    envelopes: Mutex<Vec<EventEnvelope>>,
}

impl RecordingPublisher {
    fn taken(&self) -> Vec<EventEnvelope> {
        std::mem::take(&mut *self.envelopes.lock().expect("lock"))
    }
}

#[async_trait]
impl EventPublisher for RecordingPublisher {
    async fn publish(&self, envelope: EventEnvelope) -> usize {
        self.envelopes.lock().expect("lock").push(envelope);
        1
    }
}

/// A backend whose every call fails, as when the database drops mid-request.
struct OfflineStore;

#[async_trait]
impl ThreatRepository for OfflineStore {
    async fn insert_threat(&self, _threat: NewThreat) -> anyhow::Result<Threat> {
        Err(anyhow!("store offline"))
    }

    async fn update_threat(
        &self,
        _id: &str,
        _changes: &ThreatChanges,
    ) -> anyhow::Result<Option<Threat>> {
        Err(anyhow!("store offline"))
    }

    async fn fetch_threat(&self, _id: &str) -> anyhow::Result<Option<Threat>> {
        Err(anyhow!("store offline"))
    }

    async fn fetch_threats(&self, _filter: &ThreatFilter) -> anyhow::Result<Vec<Threat>> {
        Err(anyhow!("store offline"))
    }

    async fn fetch_threat_stats(&self) -> anyhow::Result<ThreatStats> {
        Err(anyhow!("store offline"))
    }

    async fn ping(&self) -> anyhow::Result<()> {
        Err(anyhow!("store offline"))
    }
}

#[async_trait]
impl MetricRepository for OfflineStore {
    async fn insert_metric(&self, _metric: NewMetric) -> anyhow::Result<SystemMetric> {
        Err(anyhow!("store offline"))
    }

    async fn fetch_metrics(
        &self,
        _metric_type: Option<MetricType>,
        _limit: usize,
    ) -> anyhow::Result<Vec<SystemMetric>> {
        Err(anyhow!("store offline"))
    }

    async fn fetch_latest_metric(
        &self,
        _metric_type: MetricType,
    ) -> anyhow::Result<Option<SystemMetric>> {
        Err(anyhow!("store offline"))
    }
}

async fn recording_state() -> (AppState, Arc<RecordingPublisher>) {
    let config = AppConfig {
        seed_on_start: false,
        ..AppConfig::default()
    };
    let context = AppContext::with_store(&config, Arc::new(MemoryStore::new()))
        .await
        .expect("context");
    let publisher = Arc::new(RecordingPublisher::default());
    let mut state = context.state;
    state.publisher = publisher.clone();
    (state, publisher)
}

fn ddos_draft() -> ThreatDraft {
    ThreatDraft {
        threat_type: Some("ddos".to_string()),
        title: Some("T".to_string()),
        description: Some("D".to_string()),
        severity: Some("high".to_string()),
        status: Some("active".to_string()),
        ..ThreatDraft::default()
    }
}

#[tokio::test]
async fn created_threat_is_emitted_once_with_stored_fields() {
    let (state, publisher) = recording_state().await;

    let threat = threat_commands::create_threat(&state, ddos_draft())
        .await
        .expect("create");
    assert!(!threat.id.is_empty());

    let envelopes = publisher.taken();
    assert_eq!(envelopes.len(), 1);
    assert_eq!(envelopes[0].kind(), EventKind::NewThreat);
    let data = envelopes[0].payload();
    assert_eq!(data["id"], threat.id.as_str());
    assert_eq!(data["severity"], "high");
    assert_eq!(data["status"], "active");
    assert!(data["detectedAt"].as_str().is_some());

    let exposition = ops_queries::prometheus_metrics(&state).await;
    assert!(exposition.contains("sentinel_mutations_total 1\n"));
}

#[tokio::test]
async fn invalid_create_emits_nothing() {
    let (state, publisher) = recording_state().await;

    let err = threat_commands::create_threat(&state, ThreatDraft::default())
        .await
        .expect_err("missing fields");
    assert!(matches!(err, AppError::BadRequest(_)));
    assert!(publisher.taken().is_empty());
}

#[tokio::test]
async fn update_of_unknown_threat_emits_nothing() {
    let (state, publisher) = recording_state().await;

    let patch = ThreatPatch {
        status: Some("resolved".to_string()),
        ..ThreatPatch::default()
    };
    let err = threat_commands::update_threat(&state, "does-not-exist", patch)
        .await
        .expect_err("unknown id");
    assert!(matches!(err, AppError::NotFound(_)));
    assert!(publisher.taken().is_empty());
}

#[tokio::test]
async fn update_and_mitigate_emit_final_record() {
    let (state, publisher) = recording_state().await;
    let threat = threat_commands::create_threat(&state, ddos_draft())
        .await
        .expect("create");
    publisher.taken();

    let patch = ThreatPatch {
        severity: Some("critical".to_string()),
        ..ThreatPatch::default()
    };
    let updated = threat_commands::update_threat(&state, &threat.id, patch)
        .await
        .expect("update");
    let mitigated = threat_commands::mitigate_threat(&state, &threat.id)
        .await
        .expect("mitigate");

    let envelopes = publisher.taken();
    assert_eq!(envelopes.len(), 2);
    assert!(envelopes
        .iter()
        .all(|envelope| envelope.kind() == EventKind::ThreatUpdated));
    assert_eq!(envelopes[0].payload()["severity"], "critical");
    assert_eq!(updated.title, "T");
    assert_eq!(envelopes[1].payload()["status"], "mitigated");
    assert!(mitigated.mitigated_at.is_some());
    assert!(envelopes[1].payload()["mitigatedAt"].as_str().is_some());
}

#[tokio::test]
async fn metric_update_emits_type_and_value() {
    let (state, publisher) = recording_state().await;

    let metric = metric_commands::update_metric(
        &state,
        MetricSampleDraft {
            metric_type: Some("system_health".to_string()),
            value: Some(91),
            ..MetricSampleDraft::default()
        },
    )
    .await
    .expect("metric");
    assert_eq!(metric.value, 91);

    let envelopes = publisher.taken();
    assert_eq!(envelopes.len(), 1);
    assert_eq!(envelopes[0].kind(), EventKind::MetricUpdated);
    assert_eq!(envelopes[0].payload()["type"], "system_health");
    assert_eq!(envelopes[0].payload()["value"], 91);
}

#[tokio::test]
async fn invalid_metric_emits_nothing() {
    let (state, publisher) = recording_state().await;

    let result = metric_commands::update_metric(
        &state,
        MetricSampleDraft {
            metric_type: Some("cpu_temperature".to_string()),
            value: Some(40),
            ..MetricSampleDraft::default()
        },
    )
    .await;
    assert!(matches!(result, Err(AppError::BadRequest(_))));
    assert!(publisher.taken().is_empty());
}

#[tokio::test]
async fn user_writes_are_not_broadcast() {
    let (state, publisher) = recording_state().await;

    user_commands::create_user(
        &state,
        UserDraft {
            username: Some("ops.lead".to_string()),
            email: Some("ops.lead@example.com".to_string()),
            ..UserDraft::default()
        },
    )
    .await
    .expect("user");
    assert!(publisher.taken().is_empty());
}

#[tokio::test]
async fn system_alert_is_published_without_persistence() {
    let (state, publisher) = recording_state().await;

    let receipt = alert_commands::raise_system_alert(
        &state,
        SystemAlertDraft {
            message: Some("Maintenance window starts in 10 minutes".to_string()),
            level: Some("warning".to_string()),
        },
    )
    .await
    .expect("alert");
    assert_eq!(receipt.delivered, 1);

    let envelopes = publisher.taken();
    assert_eq!(envelopes.len(), 1);
    assert_eq!(envelopes[0].kind(), EventKind::SystemAlert);
    assert_eq!(envelopes[0].payload()["level"], "warning");

    let exposition = ops_queries::prometheus_metrics(&state).await;
    assert!(exposition.contains("sentinel_mutations_total 0\n"));
}

#[tokio::test]
async fn failed_writes_surface_as_internal_and_emit_nothing() {
    let (mut state, publisher) = recording_state().await;
    let offline = Arc::new(OfflineStore);
    state.threat_repo = offline.clone();
    state.metric_repo = offline;

    let created = threat_commands::create_threat(&state, ddos_draft()).await;
    assert!(matches!(created, Err(AppError::Internal(_))));

    let patch = ThreatPatch {
        status: Some("resolved".to_string()),
        ..ThreatPatch::default()
    };
    let updated = threat_commands::update_threat(&state, "t-1", patch).await;
    assert!(matches!(updated, Err(AppError::Internal(_))));

    let mitigated = threat_commands::mitigate_threat(&state, "t-1").await;
    assert!(matches!(mitigated, Err(AppError::Internal(_))));

    let metric = metric_commands::update_metric(
        &state,
        MetricSampleDraft {
            metric_type: Some("threat_count".to_string()),
            value: Some(3),
            ..MetricSampleDraft::default()
        },
    )
    .await;
    assert!(matches!(metric, Err(AppError::Internal(_))));

    assert!(publisher.taken().is_empty());
    let exposition = ops_queries::prometheus_metrics(&state).await;
    assert!(exposition.contains("sentinel_mutations_total 0\n"));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_signups_for_one_username_admit_exactly_one() {
    let (state, _publisher) = recording_state().await;

    let attempts = (0..8).map(|n| {
        let state = state.clone();
        tokio::spawn(async move {
            user_commands::create_user(
                &state,
                UserDraft {
                    username: Some("night.shift".to_string()),
                    email: Some(format!("night{n}@example.com")),
                    ..UserDraft::default()
                },
            )
            .await
        })
    });
    let mut admitted = 0;
    for attempt in attempts.collect::<Vec<_>>() {
        match attempt.await.expect("join") {
            Ok(_) => admitted += 1,
            Err(AppError::Conflict(message)) => assert!(message.contains("night.shift")),
            Err(other) => panic!("unexpected error: {other}"),
        }
    }
    assert_eq!(admitted, 1);
}
