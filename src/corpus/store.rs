use super::loader::load_documents;
use super::types::Document;

use anyhow::Result;
use std::path::Path;

/// Immutable, process-lifetime collection of posts.
///
/// There is no mutating API: once built, the store is shared as `Arc<DocumentStore>` and
/// every query reads the same slice concurrently without locking.
#[derive(Debug, Default)]
pub struct DocumentStore {
    documents: Vec<Document>,
}

impl DocumentStore {
    pub fn new(documents: Vec<Document>) -> Self {
        Self { documents }
    }

    /// Builds the store from a directory of post files.
    pub fn load(dir: &Path, url_prefix: &str) -> Result<Self> {
        let documents = load_documents(dir, url_prefix)?;
        tracing::info!(
            "Loaded {} documents from {}",
            documents.len(),
            dir.display()
        );
        Ok(Self::new(documents))
    }

    /// Documents in corpus order.
    pub fn documents(&self) -> &[Document] {
        &self.documents
    }

    pub fn len(&self) -> usize {
        self.documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }
}

impl From<Vec<Document>> for DocumentStore {
    fn from(documents: Vec<Document>) -> Self {
        Self::new(documents)
    }
}
