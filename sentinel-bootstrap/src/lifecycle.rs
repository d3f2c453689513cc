use std::time::Duration;

use anyhow::Result;
use axum::Router;
use tokio::net::TcpListener;
use tower_http::cors::CorsLayer;
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

use sentinel_application::AppState;
use sentinel_domain::StorageBackend;
use sentinel_infrastructure::{seed_store, AppConfig, MemoryStore, SeedDataset, SeedReport};
use sentinel_interfaces_http::build_router;

use crate::context::{connect_postgres, AppContext};

pub fn build_router_with_layers(state: AppState) -> Router {
    build_router(state.clone())
        .layer(CorsLayer::permissive())
        .layer(RequestBodyLimitLayer::new(
            usize::try_from(state.config.max_body_bytes).unwrap_or(usize::MAX),
        ))
        .layer(TimeoutLayer::new(Duration::from_secs(
            state.config.request_timeout_seconds.max(1),
        )))
        .layer(TraceLayer::new_for_http())
}

pub async fn run_standalone(config: AppConfig) -> Result<()> {
    let context = AppContext::new(&config).await?;
    let state = context.state;

    let app = build_router_with_layers(state.clone());
    let addr: std::net::SocketAddr = state.config.bind_addr.parse()?;
    let listener = TcpListener::bind(addr).await?;
    info!(
        "listening on {} (live feed at {})",
        addr, state.config.ws_path
    );

    let hub = state.hub.clone();
    axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            shutdown_signal().await;
            // Closing the queues lets every live-feed task send its close frame.
            hub.close_all().await;
        })
        .await?;
    info!("server stopped");
    Ok(())
}

pub async fn run_seed(config: AppConfig, reset: bool) -> Result<SeedReport> {
    let dataset = SeedDataset::resolve(config.seed_path.as_deref()).await?;
    match config.storage_backend {
        StorageBackend::Memory => {
            warn!("storage_backend is memory; the seeded data is discarded on exit");
            seed_store(&MemoryStore::new(), dataset, reset).await
        }
        StorageBackend::Postgres => {
            let store = connect_postgres(&config).await?;
            seed_store(&store, dataset, reset).await
        }
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        let _ = tokio::signal::ctrl_c().await;
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{signal, SignalKind};
        match signal(SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(err) => {
                warn!("sigterm handler unavailable: {}", err);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
    info!("shutdown signal received");
}
