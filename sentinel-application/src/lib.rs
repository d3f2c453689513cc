// Sentinel Application Layer

pub mod commands;
pub mod error;
pub mod metrics;
pub mod ops;
pub mod queries;
pub mod state;

pub use error::AppError;
pub use metrics::Metrics;
pub use ops::{NotificationHub, SubscriberChannel};
pub use state::AppState;
