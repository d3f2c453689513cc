// Domain entities

pub mod chat;
pub mod envelope;
pub mod metric;
pub mod model;
pub mod news;
pub mod simulation;
pub mod threat;
pub mod user;

pub use chat::*;
pub use envelope::*;
pub use metric::*;
pub use model::*;
pub use news::*;
pub use simulation::*;
pub use threat::*;
pub use user::*;
