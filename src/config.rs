//! Process configuration.
//!
//! Every setting is a command-line flag with an environment-variable fallback, so the service
//! can be configured either way (`--kv-url ...` or `KV_URL=...`).

use clap::{Parser, ValueEnum};
use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use crate::cache::gateway::{CacheSettings, DEFAULT_KEY_PREFIX};

/// Fuzzy scoring strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ScorerKind {
    /// Built-in subsequence scorer with adjacency and word-boundary bonuses.
    Subsequence,
    /// skim V2 algorithm.
    Skim,
}

#[derive(Debug, Clone, Parser)]
#[command(name = "post-search", about = "Fuzzy search service for blog posts")]
pub struct Config {
    /// Address the HTTP server binds to
    #[arg(long, env = "SEARCH_BIND", default_value = "127.0.0.1:3000")]
    pub bind: SocketAddr,

    /// Directory containing the post files (*.mdx, *.md)
    #[arg(long, env = "POSTS_DIR", default_value = "content/posts")]
    pub posts_dir: PathBuf,

    /// Path prefix for post URLs
    #[arg(long, env = "POSTS_URL_PREFIX", default_value = "/blog")]
    pub url_prefix: String,

    /// Also match against post bodies
    #[arg(long, env = "SEARCH_CONTENT")]
    pub search_content: bool,

    /// Fuzzy scoring strategy
    #[arg(long, env = "SEARCH_SCORER", value_enum, default_value_t = ScorerKind::Subsequence)]
    pub scorer: ScorerKind,

    /// URL of the remote cache: `redis://`/`rediss://` for Redis, `http(s)://` for the HTTP store
    #[arg(long, env = "KV_URL")]
    pub kv_url: Option<String>,

    /// Use an in-process cache when no remote cache is configured
    #[arg(long, env = "SEARCH_MEMORY_CACHE")]
    pub memory_cache: bool,

    /// Abort startup when the remote cache is unreachable
    #[arg(long, env = "SEARCH_REQUIRE_CACHE")]
    pub require_cache: bool,

    /// Namespace prepended to cache keys
    #[arg(long, env = "SEARCH_CACHE_PREFIX", default_value = DEFAULT_KEY_PREFIX)]
    pub cache_prefix: String,

    /// Lifetime of cached results in seconds
    #[arg(long, env = "SEARCH_CACHE_TTL_SECS", default_value_t = 3600)]
    pub cache_ttl_secs: u64,

    /// Upper bound on a single cache operation in milliseconds
    #[arg(long, env = "SEARCH_CACHE_TIMEOUT_MS", default_value_t = 250)]
    pub cache_timeout_ms: u64,
}

impl Config {
    pub fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache_ttl_secs)
    }

    pub fn cache_timeout(&self) -> Duration {
        Duration::from_millis(self.cache_timeout_ms)
    }

    pub fn cache_settings(&self) -> CacheSettings {
        CacheSettings {
            key_prefix: self.cache_prefix.clone(),
            ttl: self.cache_ttl(),
            timeout: self.cache_timeout(),
        }
    }

    /// Whether any cache backend is configured.
    pub fn cache_enabled(&self) -> bool {
        self.kv_url.is_some() || self.memory_cache
    }
}
