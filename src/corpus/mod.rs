//! Corpus Module
//!
//! Owns the set of posts the service searches over.
//!
//! ## Lifecycle
//! 1. **Load**: At startup the loader reads every post file from the configured directory
//!    and splits it into a frontmatter block and a body.
//! 2. **Freeze**: The parsed documents are moved into a `DocumentStore`, which never changes
//!    afterwards and is shared across request handlers behind an `Arc`.
//!
//! A corpus that fails to load aborts startup; the service has nothing to serve without it.

pub mod loader;
pub mod store;
pub mod types;
