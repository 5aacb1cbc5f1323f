//! In-memory document store
//!
//! Backs tests and the CLI harness. Documents are keyed by
//! `(doc_type, id)` behind a read-write lock.

use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;

use super::{DocumentStore, StorageError};
use crate::models::Document;

#[derive(Default)]
pub struct MemoryDocumentStore {
    documents: RwLock<HashMap<(String, String), Document>>,
}

impl MemoryDocumentStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed the store with a document.
    pub fn insert(&self, doc_type: &str, document: Document) {
        let key = (doc_type.to_string(), document.id.clone());
        self.documents
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .insert(key, document);
    }

    pub fn len(&self) -> usize {
        self.documents
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl DocumentStore for MemoryDocumentStore {
    async fn get(&self, doc_type: &str, id: &str) -> Result<Document, StorageError> {
        let key = (doc_type.to_string(), id.to_string());
        self.documents
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .get(&key)
            .cloned()
            .ok_or_else(|| StorageError::NotFound {
                doc_type: doc_type.to_string(),
                id: id.to_string(),
            })
    }

    async fn bulk_update(
        &self,
        doc_type: &str,
        documents: Vec<Document>,
    ) -> Vec<Result<Document, StorageError>> {
        let mut store = self
            .documents
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        documents
            .into_iter()
            .map(|document| {
                let key = (doc_type.to_string(), document.id.clone());
                store.insert(key, document.clone());
                Ok(document)
            })
            .collect()
    }
}
