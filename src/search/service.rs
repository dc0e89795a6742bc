use super::engine::RankingEngine;
use super::types::{CacheStatus, SearchHit, SearchOutcome};
use crate::cache::gateway::CacheGateway;
use crate::corpus::store::DocumentStore;
use std::fmt;
use std::sync::Arc;

/// Longest accepted query, in characters.
pub const MAX_QUERY_CHARS: usize = 256;

/// How a freshly computed result is written back to the cache.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum CacheWriteMode {
    /// Spawn the write and respond immediately.
    #[default]
    Background,
    /// Await the write (bounded by the gateway timeout) before responding.
    Inline,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueryError {
    TooLong { max: usize, actual: usize },
}

impl fmt::Display for QueryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QueryError::TooLong { max, actual } => {
                write!(f, "query is {} characters long, the limit is {}", actual, max)
            }
        }
    }
}

impl std::error::Error for QueryError {}

/// Entry point for search requests.
///
/// Holds the corpus, the ranking engine and an optional cache; built once at startup and
/// shared by every request.
pub struct SearchService {
    store: Arc<DocumentStore>,
    engine: RankingEngine,
    cache: Option<CacheGateway>,
    write_mode: CacheWriteMode,
}

impl SearchService {
    pub fn new(store: Arc<DocumentStore>, engine: RankingEngine) -> Self {
        Self {
            store,
            engine,
            cache: None,
            write_mode: CacheWriteMode::default(),
        }
    }

    pub fn with_cache(mut self, cache: CacheGateway, write_mode: CacheWriteMode) -> Self {
        self.cache = Some(cache);
        self.write_mode = write_mode;
        self
    }

    pub fn store(&self) -> &DocumentStore {
        &self.store
    }

    pub fn cache(&self) -> Option<&CacheGateway> {
        self.cache.as_ref()
    }

    /// Ranks the whole corpus and projects the matches, ignoring the cache.
    pub fn compute(&self, query: &str) -> Vec<SearchHit> {
        self.engine
            .rank(query, self.store.documents())
            .iter()
            .map(SearchHit::from)
            .collect()
    }

    /// Cache-first search: serve a cached result when there is one, otherwise rank and
    /// write the result back.
    #[tracing::instrument(level = "debug", skip(self), fields(scorer = self.engine.scorer_name()))]
    pub async fn handle(&self, query: &str) -> Result<SearchOutcome, QueryError> {
        validate_query(query)?;

        if query.is_empty() {
            return Ok(SearchOutcome {
                results: Vec::new(),
                cache: CacheStatus::Bypass,
            });
        }

        let Some(cache) = &self.cache else {
            return Ok(SearchOutcome {
                results: self.compute(query),
                cache: CacheStatus::Bypass,
            });
        };

        if let Some(results) = cache.lookup(query).await {
            return Ok(SearchOutcome {
                results,
                cache: CacheStatus::Hit,
            });
        }

        let results = self.compute(query);
        tracing::debug!("Ranked {} matches for '{}'", results.len(), query);

        match self.write_mode {
            CacheWriteMode::Background => {
                let cache = cache.clone();
                let query = query.to_string();
                let to_store = results.clone();
                tokio::spawn(async move {
                    cache.populate(&query, &to_store).await;
                });
            }
            CacheWriteMode::Inline => {
                cache.populate(query, &results).await;
            }
        }

        Ok(SearchOutcome {
            results,
            cache: CacheStatus::Miss,
        })
    }
}

fn validate_query(query: &str) -> Result<(), QueryError> {
    let actual = query.chars().count();
    if actual > MAX_QUERY_CHARS {
        return Err(QueryError::TooLong {
            max: MAX_QUERY_CHARS,
            actual,
        });
    }
    Ok(())
}
