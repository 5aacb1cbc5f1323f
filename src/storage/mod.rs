//! Document store boundary
//!
//! The migration core operates purely over in-memory documents; reading
//! and writing them is the host's job. This module defines that seam plus
//! two backends:
//! - `MemoryDocumentStore` - in-process map, used by tests and the CLI
//! - `FileDocumentStore` - JSON files on disk (feature `native-fs`)

pub mod memory;

#[cfg(feature = "native-fs")]
pub mod filesystem;

use async_trait::async_trait;

use crate::models::Document;

pub use memory::MemoryDocumentStore;

#[cfg(feature = "native-fs")]
pub use filesystem::FileDocumentStore;

/// Error raised by a document store backend.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    /// The requested document does not exist. Propagated to the host
    /// caller; the migration core never swallows it.
    #[error("document {doc_type}/{id} not found")]
    NotFound { doc_type: String, id: String },
    #[error("storage backend error: {0}")]
    Backend(String),
}

/// Get/bulk-update access to persisted documents.
///
/// `doc_type` names the document class (e.g. `"cases-comments"`); ids are
/// unique within a class.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Fetch one document.
    async fn get(&self, doc_type: &str, id: &str) -> Result<Document, StorageError>;

    /// Write back a batch of migrated documents.
    ///
    /// Results are per document and positionally aligned with the input;
    /// one failed write does not abort the rest.
    async fn bulk_update(
        &self,
        doc_type: &str,
        documents: Vec<Document>,
    ) -> Vec<Result<Document, StorageError>>;
}
