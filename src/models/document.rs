//! Persisted document model
//!
//! A document is an opaque record: a stable id, an open-ended attribute
//! map and a list of references to other documents. Transforms never
//! mutate a document in place; the helpers here return updated copies so
//! a failed migration step can always hand back the untouched input.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A relationship from one document to another.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reference {
    pub id: String,
    #[serde(rename = "type")]
    pub ref_type: String,
}

impl Reference {
    pub fn new(id: impl Into<String>, ref_type: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            ref_type: ref_type.into(),
        }
    }
}

/// A persisted record as read from the document store.
///
/// `references` is optional on input because documents written before the
/// field existed carry no value at all. Every migrated document leaves the
/// pipeline with `Some(..)`; the empty vector is the canonical
/// "no references" value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    pub id: String,
    #[serde(default)]
    pub attributes: Map<String, Value>,
    #[serde(default)]
    pub references: Option<Vec<Reference>>,
}

impl Document {
    /// Create a document with the given id and no attributes or references.
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            attributes: Map::new(),
            references: None,
        }
    }

    /// Look up an attribute value.
    pub fn attribute(&self, key: &str) -> Option<&Value> {
        self.attributes.get(key)
    }

    /// Look up an attribute and view it as a string.
    pub fn attribute_str(&self, key: &str) -> Option<&str> {
        self.attributes.get(key).and_then(Value::as_str)
    }

    /// Return a copy of this document with one attribute set.
    pub fn with_attribute(&self, key: impl Into<String>, value: Value) -> Document {
        let mut updated = self.clone();
        updated.attributes.insert(key.into(), value);
        updated
    }

    /// Return a copy of this document with one attribute removed.
    ///
    /// Removing an attribute that is not present is a no-op copy.
    pub fn without_attribute(&self, key: &str) -> Document {
        let mut updated = self.clone();
        updated.attributes.remove(key);
        updated
    }

    /// Return a copy with `references` guaranteed to be an array.
    pub fn with_normalized_references(&self) -> Document {
        let mut updated = self.clone();
        updated.references.get_or_insert_with(Vec::new);
        updated
    }

    /// Return a copy keeping only the references accepted by `keep`.
    ///
    /// A missing reference list normalizes to the empty vector.
    pub fn with_filtered_references(&self, keep: impl Fn(&Reference) -> bool) -> Document {
        let mut updated = self.clone();
        updated.references = Some(
            updated
                .references
                .unwrap_or_default()
                .into_iter()
                .filter(|reference| keep(reference))
                .collect(),
        );
        updated
    }
}
