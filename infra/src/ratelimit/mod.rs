//! Sliding-window rate limiters
//!
//! Both limiters answer "has `key` already seen `threshold` calls in the
//! trailing window?" and record the call only when it is accepted.

pub mod memory_sliding_window;
pub mod redis_sliding_window;

pub use memory_sliding_window::MemorySlidingWindowLimiter;
pub use redis_sliding_window::RedisSlidingWindowLimiter;
