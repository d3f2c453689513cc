use sentinel_domain::{AlertLevel, EventKind, SystemAlert, SystemAlertDraft};
use serde::Serialize;
use tracing::info;

use crate::commands::emit;
use crate::commands::input::{parse_enum, required_text};
use crate::{AppError, AppState};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SystemAlertReceipt {
    pub delivered: usize,
}

/// Operator broadcast; nothing is persisted.
pub async fn raise_system_alert(
    state: &AppState,
    draft: SystemAlertDraft,
) -> Result<SystemAlertReceipt, AppError> {
    let alert = SystemAlert {
        message: required_text("message", draft.message)?,
        level: parse_enum::<AlertLevel>(draft.level)?.unwrap_or_default(),
    };
    let delivered = emit(state, EventKind::SystemAlert, &alert).await;
    info!(level = alert.level.as_str(), delivered, "system alert broadcast");
    Ok(SystemAlertReceipt { delivered })
}
