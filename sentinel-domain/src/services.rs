// Domain services

pub mod chat_pipeline;

pub use chat_pipeline::*;
