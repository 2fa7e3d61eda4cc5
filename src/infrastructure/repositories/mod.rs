pub mod fixtures;
pub mod memory_record_store;
pub mod sqlx_record_store;
