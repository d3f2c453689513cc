pub mod chat_queries;
pub mod metric_queries;
pub mod news_queries;
pub mod ops_queries;
pub mod simulation_queries;
pub mod threat_queries;
pub mod user_queries;

/// Applies the default and clamps into `1..=max`.
pub(crate) fn clamp_limit(limit: Option<usize>, default: usize, max: usize) -> usize {
    limit.unwrap_or(default).clamp(1, max)
}
