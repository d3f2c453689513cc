// Identifier value objects

use std::fmt;

use serde::{Deserialize, Serialize};

/// Process-local handle of one live-feed connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ChannelId(pub u64);

impl fmt::Display for ChannelId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ch-{}", self.0)
    }
}

pub fn new_record_id() -> String {
    uuid::Uuid::new_v4().to_string()
}
