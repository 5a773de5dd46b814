//! # projecthub-cache
//!
//! Cache provider implementations for ProjectHub:
//!
//! - **memory**: in-process cache using [moka](https://crates.io/crates/moka),
//!   bounded by entry count with least-recently-used eviction and a TTL per entry
//! - **redis**: Redis-backed cache using the [redis](https://crates.io/crates/redis) crate
//!
//! The provider is selected at runtime from configuration.

pub mod keys;
#[cfg(feature = "memory")]
pub mod memory;
pub mod provider;
#[cfg(feature = "redis-backend")]
pub mod redis;

pub use provider::CacheManager;
