pub mod alert_commands;
pub mod chat_commands;
pub mod input;
pub mod metric_commands;
pub mod news_commands;
pub mod simulation_commands;
pub mod threat_commands;
pub mod user_commands;

use sentinel_domain::{EventEnvelope, EventKind};
use serde::Serialize;
use tracing::error;

use crate::AppState;

/// Hands exactly one envelope to the publisher. Mutations call this only after
/// the write succeeded; it never fails the caller.
pub(crate) async fn emit<T: Serialize>(state: &AppState, kind: EventKind, record: &T) -> usize {
    match EventEnvelope::from_record(kind, record) {
        Ok(envelope) => state.publisher.publish(envelope).await,
        Err(err) => {
            error!(kind = kind.as_str(), "failed to encode live feed envelope: {}", err);
            0
        }
    }
}
