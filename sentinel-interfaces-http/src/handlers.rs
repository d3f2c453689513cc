pub mod chat_handlers;
pub mod metric_handlers;
pub mod news_handlers;
pub mod ops_handlers;
pub mod simulation_handlers;
pub mod stream_handlers;
pub mod threat_handlers;
pub mod user_handlers;
