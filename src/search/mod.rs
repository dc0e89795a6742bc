//! Search Service Module
//!
//! Fuzzy search over the in-memory corpus of posts.
//!
//! ## Pipeline
//! query → `SearchService` (cache lookup) → `RankingEngine` → `FuzzyScorer` per field
//! → ranked matches → cache populate → `SearchResponse`.
//!
//! ## Submodules
//! - **`scorer`**: The `FuzzyScorer` strategy trait and its implementations.
//! - **`engine`**: Multi-field scoring, per-document max reduction and stable ordering.
//! - **`service`**: The request facade orchestrating cache and ranking.
//! - **`handlers`**: HTTP handlers and router for the Axum web server.
//! - **`errors`**: HTTP error responses.
//! - **`types`**: Match types and the DTOs of the HTTP API.

pub mod engine;
pub mod errors;
pub mod handlers;
pub mod scorer;
pub mod service;
pub mod types;
