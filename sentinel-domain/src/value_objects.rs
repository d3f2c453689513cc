// Domain value objects
pub mod alert_level;
pub mod chat_intent;
pub mod difficulty;
pub mod identifiers;
pub mod metric_type;
pub mod roster;
pub mod severity;
pub mod threat_status;

pub use alert_level::*;
pub use chat_intent::*;
pub use difficulty::*;
pub use identifiers::*;
pub use metric_type::*;
pub use roster::*;
pub use severity::*;
pub use threat_status::*;
