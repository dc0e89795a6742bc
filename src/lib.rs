//! Blog Post Search Service Library
//!
//! Fuzzy search over a fixed, in-memory corpus of blog posts, with an optional result cache.
//! The binary (`main.rs`) wires these modules into an HTTP server.
//!
//! ## Modules
//! - **`corpus`**: Loading post files and holding them in an immutable `DocumentStore`.
//! - **`search`**: Fuzzy scorers, the ranking engine, the request facade and the HTTP handlers.
//! - **`cache`**: The best-effort result cache (in-process, Redis or an HTTP key-value store).
//! - **`config`**: Command-line and environment configuration.
//! - **`app`**: Startup wiring from configuration to a ready service.

pub mod app;
pub mod cache;
pub mod config;
pub mod corpus;
pub mod search;
