pub mod kv_store;
pub mod task_repository;
pub mod user_repository;
