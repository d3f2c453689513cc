use std::env;
use std::path::Path;

use anyhow::{anyhow, Result};
use serde::Deserialize;
use tokio::fs;
use tracing::warn;

use sentinel_domain::{DbConfig, LlmConfig, RuntimeConfig, StorageBackend};

use crate::config::validation::{validate_bind_addr, validate_ws_path};

pub const CONFIG_PATH_ENV: &str = "SENTINEL_CONFIG";

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct AppConfig {
    pub bind_addr: String,
    pub storage_backend: StorageBackend,
    pub database_url: Option<String>,
    pub seed_on_start: bool,
    pub seed_path: Option<String>,
    pub ws_path: String,
    pub max_channels: usize,
    pub channel_buffer: usize,
    pub ws_ping_interval_seconds: u64,
    pub openai_api_key: Option<String>,
    pub openai_base_url: String,
    pub openai_model: String,
    pub llm_timeout_seconds: u64,
    pub max_body_bytes: u64,
    pub request_timeout_seconds: u64,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            bind_addr: "127.0.0.1:5000".to_string(),
            storage_backend: StorageBackend::Memory,
            database_url: None,
            seed_on_start: true,
            seed_path: None,
            ws_path: "/ws".to_string(),
            max_channels: 1024,
            channel_buffer: 64,
            ws_ping_interval_seconds: 30,
            openai_api_key: None,
            openai_base_url: "https://api.openai.com/v1".to_string(),
            openai_model: "gpt-5".to_string(),
            llm_timeout_seconds: 30,
            max_body_bytes: 1024 * 1024,
            request_timeout_seconds: 15,
        }
    }
}

impl AppConfig {
    pub async fn load() -> Result<Self> {
        let path = env::var(CONFIG_PATH_ENV).unwrap_or_else(|_| "./config.toml".to_string());
        Self::load_from(&path).await
    }

    pub async fn load_from(path: &str) -> Result<Self> {
        let file_path = Path::new(path);
        let base_dir = file_path.parent();
        let mut config = if file_path.exists() {
            let content = fs::read_to_string(file_path).await?;
            toml::from_str::<AppConfig>(&content)
                .map_err(|err| anyhow!("invalid config {}: {}", path, err))?
        } else {
            warn!("{} not found, using defaults", path);
            AppConfig::default()
        };
        config.apply_env_overrides();
        config.normalize();
        config.resolve_paths(base_dir);
        config.validate()?;
        Ok(config)
    }

    pub fn normalize(&mut self) {
        self.database_url = normalize_optional(self.database_url.take());
        self.seed_path = normalize_optional(self.seed_path.take());
        self.openai_api_key = normalize_optional(self.openai_api_key.take());
        self.ws_path = self.ws_path.trim().to_string();
        if self.ws_path.len() > 1 && self.ws_path.ends_with('/') {
            self.ws_path = self.ws_path.trim_end_matches('/').to_string();
        }
        self.openai_base_url = self.openai_base_url.trim().trim_end_matches('/').to_string();
        self.openai_model = self.openai_model.trim().to_string();
    }

    fn resolve_paths(&mut self, base_dir: Option<&Path>) {
        let Some(base) = base_dir else {
            return;
        };
        if let Some(seed_path) = &self.seed_path {
            self.seed_path = Some(resolve_path(base, seed_path));
        }
    }

    pub fn validate(&self) -> Result<()> {
        validate_bind_addr(&self.bind_addr)?;
        validate_ws_path(&self.ws_path)?;
        if self.storage_backend == StorageBackend::Postgres && self.database_url.is_none() {
            return Err(anyhow!("storage_backend = \"postgres\" requires database_url"));
        }
        if self.max_channels == 0 {
            return Err(anyhow!("max_channels must be greater than 0"));
        }
        if self.channel_buffer == 0 {
            return Err(anyhow!("channel_buffer must be greater than 0"));
        }
        if self.max_body_bytes == 0 {
            return Err(anyhow!("max_body_bytes must be greater than 0"));
        }
        if self.openai_model.is_empty() {
            return Err(anyhow!("openai_model must not be empty"));
        }
        Ok(())
    }

    pub fn to_runtime_config(&self) -> RuntimeConfig {
        RuntimeConfig {
            bind_addr: self.bind_addr.clone(),
            ws_path: self.ws_path.clone(),
            max_channels: self.max_channels,
            channel_buffer: self.channel_buffer,
            ws_ping_interval_seconds: self.ws_ping_interval_seconds,
            max_body_bytes: self.max_body_bytes,
            request_timeout_seconds: self.request_timeout_seconds,
        }
    }

    pub fn to_db_config(&self) -> DbConfig {
        DbConfig {
            backend: self.storage_backend,
            database_url: self.database_url.clone(),
        }
    }

    pub fn to_llm_config(&self) -> LlmConfig {
        LlmConfig {
            api_key: self.openai_api_key.clone(),
            base_url: self.openai_base_url.clone(),
            model: self.openai_model.clone(),
            timeout_seconds: self.llm_timeout_seconds,
        }
    }

    fn apply_env_overrides(&mut self) {
        if let Ok(value) = env::var("SENTINEL_BIND_ADDR") {
            self.bind_addr = value;
        }
        if let Ok(value) = env::var("SENTINEL_STORAGE_BACKEND") {
            match parse_backend(&value) {
                Some(backend) => self.storage_backend = backend,
                None => warn!("ignoring unknown SENTINEL_STORAGE_BACKEND '{}'", value),
            }
        }
        if let Ok(value) = env::var("SENTINEL_DATABASE_URL") {
            self.database_url = Some(value);
        }
        if let Ok(value) = env::var("SENTINEL_SEED_ON_START") {
            self.seed_on_start = value.parse().unwrap_or(self.seed_on_start);
        }
        if let Ok(value) = env::var("SENTINEL_SEED_PATH") {
            self.seed_path = Some(value);
        }
        if let Ok(value) = env::var("SENTINEL_WS_PATH") {
            self.ws_path = value;
        }
        if let Ok(value) = env::var("SENTINEL_MAX_CHANNELS") {
            self.max_channels = value.parse().unwrap_or(self.max_channels);
        }
        if let Ok(value) = env::var("SENTINEL_CHANNEL_BUFFER") {
            self.channel_buffer = value.parse().unwrap_or(self.channel_buffer);
        }
        if let Ok(value) = env::var("SENTINEL_WS_PING_INTERVAL_SECONDS") {
            self.ws_ping_interval_seconds =
                value.parse().unwrap_or(self.ws_ping_interval_seconds);
        }
        if let Ok(value) = env::var("OPENAI_API_KEY") {
            self.openai_api_key = Some(value);
        }
        if let Ok(value) = env::var("SENTINEL_OPENAI_API_KEY") {
            self.openai_api_key = Some(value);
        }
        if let Ok(value) = env::var("SENTINEL_OPENAI_BASE_URL") {
            self.openai_base_url = value;
        }
        if let Ok(value) = env::var("SENTINEL_OPENAI_MODEL") {
            self.openai_model = value;
        }
        if let Ok(value) = env::var("SENTINEL_LLM_TIMEOUT_SECONDS") {
            self.llm_timeout_seconds = value.parse().unwrap_or(self.llm_timeout_seconds);
        }
        if let Ok(value) = env::var("SENTINEL_MAX_BODY_BYTES") {
            self.max_body_bytes = value.parse().unwrap_or(self.max_body_bytes);
        }
        if let Ok(value) = env::var("SENTINEL_REQUEST_TIMEOUT_SECONDS") {
            self.request_timeout_seconds = value.parse().unwrap_or(self.request_timeout_seconds);
        }
    }
}

fn parse_backend(value: &str) -> Option<StorageBackend> {
    match value.trim().to_lowercase().as_str() {
        "memory" => Some(StorageBackend::Memory),
        "postgres" | "postgresql" => Some(StorageBackend::Postgres),
        _ => None,
    }
}

fn normalize_optional(value: Option<String>) -> Option<String> {
    value.and_then(|raw| {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(trimmed.to_string())
        }
    })
}

fn resolve_path(base: &Path, value: &str) -> String {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return trimmed.to_string();
    }
    let path = Path::new(trimmed);
    if path.is_absolute() {
        trimmed.to_string()
    } else {
        base.join(path).to_string_lossy().to_string()
    }
}
