//! Startup wiring: turns a `Config` into a ready `SearchService`.

use crate::cache::ResultCache;
use crate::cache::gateway::CacheGateway;
use crate::cache::memory::MemoryCache;
use crate::cache::redis_cache::{DEFAULT_CONNECT_TIMEOUT, RedisCache};
use crate::cache::remote::{RemoteCache, request_timeout_within};
use crate::config::{Config, ScorerKind};
use crate::corpus::store::DocumentStore;
use crate::search::engine::{FieldSet, RankingEngine};
use crate::search::scorer::{FuzzyScorer, SkimScorer, SubsequenceScorer};
use crate::search::service::{CacheWriteMode, SearchService};

use anyhow::{Context, Result};
use reqwest::Url;
use std::sync::Arc;
use std::time::Duration;

pub fn build_scorer(kind: ScorerKind) -> Arc<dyn FuzzyScorer> {
    match kind {
        ScorerKind::Subsequence => Arc::new(SubsequenceScorer::new()),
        ScorerKind::Skim => Arc::new(SkimScorer::new()),
    }
}

pub fn build_engine(config: &Config) -> RankingEngine {
    let fields = FieldSet {
        include_content: config.search_content,
    };
    RankingEngine::new(build_scorer(config.scorer), fields)
}

/// Client used for a `KV_URL`, chosen by its scheme.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RemoteKind {
    /// `redis://` or `rediss://`
    Redis,
    /// `http://` or `https://`, the key-value protocol in `cache::protocol`
    Http,
}

pub fn remote_kind(url: &str) -> Result<RemoteKind> {
    let parsed = Url::parse(url).with_context(|| format!("invalid cache URL '{}'", url))?;
    match parsed.scheme() {
        "redis" | "rediss" => Ok(RemoteKind::Redis),
        "http" | "https" => Ok(RemoteKind::Http),
        other => anyhow::bail!("unsupported cache URL scheme '{}'", other),
    }
}

/// Builds the configured cache, if any.
///
/// An invalid or unreachable remote cache degrades to no cache with a warning, unless
/// `require_cache` is set, in which case it is an error.
pub async fn build_cache(config: &Config) -> Result<Option<CacheGateway>> {
    let backend: Arc<dyn ResultCache> = if let Some(url) = &config.kv_url {
        match connect_remote(url, config.cache_timeout()).await {
            Ok(remote) => remote,
            Err(e) if config.require_cache => {
                return Err(e.context("remote cache is required but unavailable"));
            }
            Err(e) => {
                tracing::warn!("Remote cache unavailable, continuing without cache: {:#}", e);
                return Ok(None);
            }
        }
    } else if config.memory_cache {
        Arc::new(MemoryCache::new())
    } else {
        return Ok(None);
    };

    tracing::info!(
        "Result cache enabled: {} (ttl {:?}, timeout {:?})",
        backend.name(),
        config.cache_ttl(),
        config.cache_timeout()
    );
    Ok(Some(CacheGateway::new(backend, config.cache_settings())))
}

async fn connect_remote(url: &str, cache_timeout: Duration) -> Result<Arc<dyn ResultCache>> {
    match remote_kind(url)? {
        RemoteKind::Redis => {
            let redis = RedisCache::connect(url, DEFAULT_CONNECT_TIMEOUT).await?;
            Ok(Arc::new(redis))
        }
        RemoteKind::Http => {
            let remote = RemoteCache::new(url, request_timeout_within(cache_timeout))?;
            remote
                .ping()
                .await
                .with_context(|| format!("cache at {} did not answer", remote.base_url()))?;
            Ok(Arc::new(remote))
        }
    }
}

/// Loads the corpus and assembles the service. A corpus that cannot be loaded is fatal.
pub async fn build_service(config: &Config) -> Result<SearchService> {
    let store = DocumentStore::load(&config.posts_dir, &config.url_prefix)
        .context("failed to load corpus")?;
    let engine = build_engine(config);
    tracing::info!(
        "Search engine ready: scorer={}, content={}",
        engine.scorer_name(),
        engine.fields().include_content
    );

    let service = SearchService::new(Arc::new(store), engine);
    Ok(match build_cache(config).await? {
        Some(cache) => service.with_cache(cache, CacheWriteMode::Background),
        None => service,
    })
}
