pub mod memory_store;
pub mod postgres_store;
pub mod seed_data;

pub use memory_store::*;
pub use postgres_store::*;
pub use seed_data::*;
