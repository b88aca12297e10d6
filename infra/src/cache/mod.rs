//! Cache module for the shared coordination store
//!
//! Redis client plus the stores built on it, and an in-process code store
//! with the same contract.

pub mod code_cache;
pub mod memory_code_cache;
pub mod redis_client;
pub mod session_cache;

pub use code_cache::RedisCodeStore;
pub use memory_code_cache::MemoryCodeStore;
pub use redis_client::RedisClient;
pub use session_cache::RedisSessionRepository;

pub use cg_shared::config::CacheConfig;
