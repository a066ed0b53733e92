//! Cache module for the Redis-backed token whitelist
//!
//! `RedisClient` wraps a multiplexed connection with connect retries and a
//! per-command response timeout; `RedisWhitelistStore` maps the whitelist
//! contract onto it.

pub mod redis_client;
pub mod whitelist_store;


pub use redis_client::RedisClient;
pub use whitelist_store::RedisWhitelistStore;

// Re-export commonly used types
pub use ja_shared::config::cache::CacheConfig;
