use crate::corpus::types::Document;
use serde::{Deserialize, Serialize};

/// Similarity score. `0` means no match.
pub type Rank = u32;

/// Searchable parts of a document, in the order they are scored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SearchField {
    Title,
    Description,
    Topic,
    Content,
}

/// A document paired with its best rank across all scored fields.
#[derive(Debug, Clone, Copy)]
pub struct ScoredMatch<'a> {
    pub document: &'a Document,
    pub rank: Rank,
    /// The field that produced `rank`. On ties the earlier field in scoring order wins.
    pub field: SearchField,
}

/// Public projection of a matched document. The body is never exposed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchHit {
    pub url: String,
    pub title: String,
    pub description: String,
    pub topics: Vec<String>,
}

impl From<&Document> for SearchHit {
    fn from(doc: &Document) -> Self {
        Self {
            url: doc.url.clone(),
            title: doc.frontmatter.title.clone(),
            description: doc.frontmatter.description.clone(),
            topics: doc.frontmatter.topics.clone(),
        }
    }
}

impl From<&ScoredMatch<'_>> for SearchHit {
    fn from(m: &ScoredMatch<'_>) -> Self {
        SearchHit::from(m.document)
    }
}

/// Body of `POST /api/search`.
#[derive(Debug, Deserialize)]
pub struct SearchRequest {
    pub query: String,
}

/// Body of a successful search response. Cache hits and misses share this shape.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchResponse {
    pub results: Vec<SearchHit>,
}

/// Where a response came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheStatus {
    /// Served from the result cache.
    Hit,
    /// Computed by the ranking engine (cache enabled but empty for this key).
    Miss,
    /// Computed without consulting any cache.
    Bypass,
}

impl CacheStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            CacheStatus::Hit => "hit",
            CacheStatus::Miss => "miss",
            CacheStatus::Bypass => "bypass",
        }
    }
}

/// Result of `SearchService::handle`.
#[derive(Debug, Clone)]
pub struct SearchOutcome {
    pub results: Vec<SearchHit>,
    pub cache: CacheStatus,
}
