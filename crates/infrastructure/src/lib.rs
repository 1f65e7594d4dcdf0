//! Infrastructure adapters for application ports.

#![forbid(unsafe_code)]

mod in_memory_key_value_store;
mod json_file_key_value_store;
mod redis_key_value_store;

pub use in_memory_key_value_store::InMemoryKeyValueStore;
pub use json_file_key_value_store::JsonFileKeyValueStore;
pub use redis_key_value_store::RedisKeyValueStore;
