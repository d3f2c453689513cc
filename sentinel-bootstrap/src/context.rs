use std::sync::Arc;

use anyhow::{anyhow, Result};
use tracing::info;

use sentinel_application::{AppState, Metrics, NotificationHub};
use sentinel_domain::ports::ChatRepository;
use sentinel_domain::StorageBackend;
use sentinel_infrastructure::{
    seed_store,
    AppConfig,
    DefaultHealthService,
    MemoryStore,
    OpenAiAssistant,
    PostgresStore,
    SeedDataset,
    SeedableStore,
};

pub struct AppContext {
    pub state: AppState,
}

impl AppContext {
    pub async fn new(config: &AppConfig) -> Result<Self> {
        match config.to_db_config().backend {
            StorageBackend::Memory => {
                info!("using in-memory store");
                Self::with_store(config, Arc::new(MemoryStore::new())).await
            }
            StorageBackend::Postgres => {
                let store = connect_postgres(config).await?;
                info!("using postgres store");
                Self::with_store(config, Arc::new(store)).await
            }
        }
    }

    /// Wires every port to `store`, seeding it first when `seed_on_start` is set.
    pub async fn with_store<S>(config: &AppConfig, store: Arc<S>) -> Result<Self>
    where
        S: SeedableStore + ChatRepository + 'static,
    {
        if config.seed_on_start {
            let dataset = SeedDataset::resolve(config.seed_path.as_deref()).await?;
            seed_store(store.as_ref(), dataset, false).await?;
        }

        let runtime_config = config.to_runtime_config();
        let metrics = Arc::new(Metrics::default());
        let hub = Arc::new(NotificationHub::new(
            runtime_config.max_channels,
            runtime_config.channel_buffer,
            metrics.clone(),
        ));
        let assistant = OpenAiAssistant::new(config.to_llm_config())?;
        if !assistant.is_configured() {
            info!("openai api key not set; chat replies use the fallback message");
        }

        let state = AppState {
            config: runtime_config,
            threat_repo: store.clone(),
            metric_repo: store.clone(),
            user_repo: store.clone(),
            news_repo: store.clone(),
            simulation_repo: store.clone(),
            chat_repo: store.clone(),
            health_service: Arc::new(DefaultHealthService::new(store)),
            publisher: hub.clone(),
            hub,
            assistant: Arc::new(assistant),
            metrics,
        };

        Ok(Self { state })
    }
}

pub(crate) async fn connect_postgres(config: &AppConfig) -> Result<PostgresStore> {
    let db_config = config.to_db_config();
    let url = db_config
        .database_url
        .as_deref()
        .ok_or_else(|| anyhow!("postgres backend requires database_url"))?;
    PostgresStore::connect(url).await
}
