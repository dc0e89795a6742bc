use super::ResultCache;
use crate::search::types::{SearchHit, SearchResponse};

use anyhow::{Context, Result};
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;

/// Namespace prepended to every query to form its cache key.
pub const DEFAULT_KEY_PREFIX: &str = "search:";
/// How long a cached result stays valid.
pub const DEFAULT_TTL: Duration = Duration::from_secs(60 * 60);
/// Upper bound on any single cache operation.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_millis(250);

#[derive(Debug, Clone)]
pub struct CacheSettings {
    pub key_prefix: String,
    pub ttl: Duration,
    pub timeout: Duration,
}

impl Default for CacheSettings {
    fn default() -> Self {
        Self {
            key_prefix: DEFAULT_KEY_PREFIX.to_string(),
            ttl: DEFAULT_TTL,
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

#[derive(Serialize)]
struct CachedResults<'a> {
    results: &'a [SearchHit],
}

/// Serializes results into the cached value format.
///
/// The cached value is the JSON body of a search response (`{"results": [...]}`), so a hit
/// can be served with exactly the shape a fresh computation would produce.
pub fn encode_results(results: &[SearchHit]) -> Result<String> {
    serde_json::to_string(&CachedResults { results }).context("failed to encode cached results")
}

/// Parses a cached value produced by `encode_results`.
pub fn decode_results(raw: &str) -> Result<Vec<SearchHit>> {
    let response: SearchResponse =
        serde_json::from_str(raw).context("failed to decode cached results")?;
    Ok(response.results)
}

/// Search-aware front of a `ResultCache` backend.
///
/// Never returns an error: lookups that fail for any reason are misses, and failed writes
/// are only logged.
#[derive(Clone)]
pub struct CacheGateway {
    backend: Arc<dyn ResultCache>,
    settings: CacheSettings,
}

impl CacheGateway {
    pub fn new(backend: Arc<dyn ResultCache>, settings: CacheSettings) -> Self {
        Self { backend, settings }
    }

    pub fn backend_name(&self) -> &'static str {
        self.backend.name()
    }

    pub fn settings(&self) -> &CacheSettings {
        &self.settings
    }

    /// Cache key for a raw query. No normalization is applied.
    pub fn key_for(&self, query: &str) -> String {
        format!("{}{}", self.settings.key_prefix, query)
    }

    pub async fn lookup(&self, query: &str) -> Option<Vec<SearchHit>> {
        let key = self.key_for(query);

        let raw = match tokio::time::timeout(self.settings.timeout, self.backend.get(&key)).await {
            Ok(Ok(Some(raw))) => raw,
            Ok(Ok(None)) => {
                tracing::debug!("Cache miss for '{}'", key);
                return None;
            }
            Ok(Err(e)) => {
                tracing::warn!("Cache read failed for '{}': {:#}", key, e);
                return None;
            }
            Err(_) => {
                tracing::warn!(
                    "Cache read for '{}' timed out after {:?}",
                    key,
                    self.settings.timeout
                );
                return None;
            }
        };

        match decode_results(&raw) {
            Ok(results) => {
                tracing::debug!("Cache hit for '{}' ({} results)", key, results.len());
                Some(results)
            }
            Err(e) => {
                tracing::warn!("Discarding unreadable cache entry '{}': {:#}", key, e);
                None
            }
        }
    }

    /// Stores `results` for `query`. Returns whether the write went through.
    pub async fn populate(&self, query: &str, results: &[SearchHit]) -> bool {
        let key = self.key_for(query);

        let value = match encode_results(results) {
            Ok(value) => value,
            Err(e) => {
                tracing::warn!("Skipping cache write for '{}': {:#}", key, e);
                return false;
            }
        };

        let write = self.backend.set(&key, value, self.settings.ttl);
        match tokio::time::timeout(self.settings.timeout, write).await {
            Ok(Ok(())) => {
                tracing::debug!("Cached {} results under '{}'", results.len(), key);
                true
            }
            Ok(Err(e)) => {
                tracing::warn!("Cache write failed for '{}': {:#}", key, e);
                false
            }
            Err(_) => {
                tracing::warn!(
                    "Cache write for '{}' timed out after {:?}",
                    key,
                    self.settings.timeout
                );
                false
            }
        }
    }
}
