pub mod credential;
pub mod file_store;
pub mod memory_store;
pub mod store;
pub mod token_manager;
