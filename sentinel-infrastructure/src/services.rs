pub mod health_service;
pub mod openai_assistant;

pub use health_service::*;
pub use openai_assistant::*;
