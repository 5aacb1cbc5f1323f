//! File-backed document store
//!
//! Lays documents out as `{root}/{doc_type}/{id}.json`. Intended for
//! local tooling and fixtures, not as a production store.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::fs;

use super::{DocumentStore, StorageError};
use crate::models::Document;

pub struct FileDocumentStore {
    root: PathBuf,
}

impl FileDocumentStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn document_path(&self, doc_type: &str, id: &str) -> PathBuf {
        self.root.join(doc_type).join(format!("{id}.json"))
    }

    async fn write_document(
        &self,
        dir: &Path,
        document: &Document,
    ) -> Result<(), StorageError> {
        let serialized = serde_json::to_vec_pretty(document)
            .map_err(|e| StorageError::Backend(format!("failed to serialize document: {e}")))?;
        let path = dir.join(format!("{}.json", document.id));
        fs::write(&path, serialized)
            .await
            .map_err(|e| StorageError::Backend(format!("failed to write {}: {e}", path.display())))
    }
}

#[async_trait]
impl DocumentStore for FileDocumentStore {
    async fn get(&self, doc_type: &str, id: &str) -> Result<Document, StorageError> {
        let path = self.document_path(doc_type, id);
        let raw = match fs::read(&path).await {
            Ok(raw) => raw,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                return Err(StorageError::NotFound {
                    doc_type: doc_type.to_string(),
                    id: id.to_string(),
                });
            }
            Err(e) => {
                return Err(StorageError::Backend(format!(
                    "failed to read {}: {e}",
                    path.display()
                )));
            }
        };
        serde_json::from_slice(&raw)
            .map_err(|e| StorageError::Backend(format!("failed to parse {}: {e}", path.display())))
    }

    async fn bulk_update(
        &self,
        doc_type: &str,
        documents: Vec<Document>,
    ) -> Vec<Result<Document, StorageError>> {
        let dir = self.root.join(doc_type);
        if let Err(e) = fs::create_dir_all(&dir).await {
            let message = format!("failed to create {}: {e}", dir.display());
            return documents
                .into_iter()
                .map(|_| Err(StorageError::Backend(message.clone())))
                .collect();
        }

        let mut results = Vec::with_capacity(documents.len());
        for document in documents {
            let result = self
                .write_document(&dir, &document)
                .await
                .map(|()| document);
            results.push(result);
        }
        results
    }
}
