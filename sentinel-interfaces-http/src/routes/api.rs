use axum::Router;

use sentinel_application::AppState;

use crate::handlers::{
    chat_handlers,
    metric_handlers,
    news_handlers,
    ops_handlers,
    simulation_handlers,
    stream_handlers,
    threat_handlers,
    user_handlers,
};

pub fn build_router(state: AppState) -> Router {
    let ws_path = state.config.ws_path.clone();
    Router::new()
        .route(
            "/api/metrics",
            axum::routing::get(metric_handlers::dashboard_metrics),
        )
        .route(
            "/api/metrics/history",
            axum::routing::get(metric_handlers::metric_history),
        )
        .route(
            "/api/metrics/update",
            axum::routing::post(metric_handlers::update_metric),
        )
        .route(
            "/api/threats",
            axum::routing::get(threat_handlers::list_threats).post(threat_handlers::create_threat),
        )
        .route(
            "/api/threats/stats",
            axum::routing::get(threat_handlers::threat_stats),
        )
        .route(
            "/api/threats/summary",
            axum::routing::get(threat_handlers::threat_summary),
        )
        .route(
            "/api/threats/:id",
            axum::routing::get(threat_handlers::get_threat).patch(threat_handlers::update_threat),
        )
        .route(
            "/api/threats/:id/mitigate",
            axum::routing::post(threat_handlers::mitigate_threat),
        )
        .route(
            "/api/news",
            axum::routing::get(news_handlers::list_news).post(news_handlers::create_article),
        )
        .route(
            "/api/news/fetch",
            axum::routing::post(news_handlers::fetch_news),
        )
        .route(
            "/api/simulations",
            axum::routing::get(simulation_handlers::list_simulations),
        )
        .route(
            "/api/simulations/:id/start",
            axum::routing::post(simulation_handlers::start_simulation),
        )
        .route(
            "/api/user-simulations/:id",
            axum::routing::patch(simulation_handlers::update_user_simulation),
        )
        .route(
            "/api/users",
            axum::routing::get(user_handlers::list_users).post(user_handlers::create_user),
        )
        .route(
            "/api/users/:id",
            axum::routing::get(user_handlers::get_user).patch(user_handlers::update_user),
        )
        .route(
            "/api/users/:id/simulations",
            axum::routing::get(user_handlers::list_user_simulations),
        )
        .route("/api/chat", axum::routing::post(chat_handlers::send_message))
        .route(
            "/api/chat/:user_id",
            axum::routing::get(chat_handlers::chat_history),
        )
        .route(
            "/api/ops/system-alert",
            axum::routing::post(ops_handlers::raise_system_alert),
        )
        .route(
            "/api/ops/health/live",
            axum::routing::get(ops_handlers::health_live),
        )
        .route(
            "/api/ops/health/ready",
            axum::routing::get(ops_handlers::health_ready),
        )
        .route(
            "/api/ops/metrics/prometheus",
            axum::routing::get(ops_handlers::metrics_prometheus),
        )
        .route(
            "/api/ops/live-feed",
            axum::routing::get(ops_handlers::live_feed_snapshot),
        )
        .route(&ws_path, axum::routing::get(stream_handlers::live_feed))
        .with_state(state)
}
