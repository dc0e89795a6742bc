//! Result Cache Module
//!
//! Memoizes search responses by query string in front of the ranking engine.
//!
//! ## Core Concepts
//! - **Backend**: Anything implementing `ResultCache` (an in-process map, a Redis server or an
//!   HTTP key-value service). Backends deal in opaque strings and know nothing about search.
//! - **Gateway**: `CacheGateway` derives keys, encodes values, applies the TTL and bounds every
//!   backend call with a timeout.
//! - **Best effort**: A failing or slow cache never fails a request. Read failures become
//!   misses, write failures are logged and dropped.

pub mod gateway;
pub mod memory;
pub mod protocol;
pub mod redis_cache;
pub mod remote;

#[cfg(test)]
mod tests;

use anyhow::Result;
use async_trait::async_trait;
use std::time::Duration;

/// Key-value storage used to memoize search results.
#[async_trait]
pub trait ResultCache: Send + Sync {
    /// Returns the stored value, or `None` when the key is absent or expired.
    async fn get(&self, key: &str) -> Result<Option<String>>;

    /// Stores `value` under `key` for `ttl`.
    async fn set(&self, key: &str, value: String, ttl: Duration) -> Result<()>;

    /// Short identifier used in logs.
    fn name(&self) -> &'static str;
}

/// Whole seconds for a store-side expiry, rounded up and never 0.
///
/// Stores read an expiry of 0 as "keep forever" or reject it outright.
pub fn ttl_whole_secs(ttl: Duration) -> u64 {
    let secs = ttl.as_secs() + u64::from(ttl.subsec_nanos() > 0);
    secs.max(1)
}
