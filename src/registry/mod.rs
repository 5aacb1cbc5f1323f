//! Transform registry
//!
//! An ordered, version-keyed collection of document transforms, assembled
//! from multiple sources:
//! - the built-in migration table of a document class
//! - tables contributed dynamically by embedded-content owners
//!
//! Because independent feature owners register transforms against the same
//! document class at different version checkpoints, registering an already
//! present key composes the new transform after the existing one. A later
//! registration never replaces an earlier one.
//!
//! The registry is immutable once assembled and safe to share across
//! worker threads behind an `Arc`.

use std::collections::BTreeMap;
use std::collections::btree_map::Entry;
use std::ops::Bound;
use std::sync::Arc;

use crate::content::ParseError;
use crate::models::{Document, MalformedVersion, SchemaVersion};

/// A document transform registered for one version key.
pub type TransformFn = Arc<dyn Fn(&Document) -> Result<Document, TransformError> + Send + Sync>;

/// Error returned by a transform for a single document.
///
/// These are scoped to one document and one step; the migrator converts
/// them into a failed outcome without touching sibling documents.
#[derive(Debug, thiserror::Error)]
pub enum TransformError {
    #[error("failed to rewrite field {field:?}: {source}")]
    Content {
        field: String,
        #[source]
        source: ParseError,
    },
    #[error("missing required attribute: {0}")]
    MissingAttribute(String),
    #[error("transform failed: {0}")]
    Failed(String),
}

impl TransformError {
    /// The attribute the error originated from, when it names one.
    pub fn field(&self) -> Option<&str> {
        match self {
            TransformError::Content { field, .. } => Some(field),
            TransformError::MissingAttribute(field) => Some(field),
            TransformError::Failed(_) => None,
        }
    }
}

/// A transform together with its scheduling class.
#[derive(Clone)]
pub struct TransformEntry {
    pub transform: TransformFn,
    /// Deferred entries are skipped by the eager migration sweep and run
    /// through an explicit on-demand call instead.
    pub deferred: bool,
}

impl std::fmt::Debug for TransformEntry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TransformEntry")
            .field("deferred", &self.deferred)
            .finish_non_exhaustive()
    }
}

impl TransformEntry {
    /// An entry applied during the eager migration sweep.
    pub fn eager(
        transform: impl Fn(&Document) -> Result<Document, TransformError> + Send + Sync + 'static,
    ) -> Self {
        Self {
            transform: Arc::new(transform),
            deferred: false,
        }
    }

    /// An entry whose application may be delayed past the eager sweep.
    pub fn deferred(
        transform: impl Fn(&Document) -> Result<Document, TransformError> + Send + Sync + 'static,
    ) -> Self {
        Self {
            transform: Arc::new(transform),
            deferred: true,
        }
    }
}

/// Either an already-built registry value or a factory producing one.
///
/// Embedded-content owners hand over their migrations as a value or as a
/// factory closure. The source is resolved exactly once, at assembly
/// time, before any document flows through the pipeline.
pub enum RegistrySource<T> {
    Eager(T),
    Factory(Box<dyn FnOnce() -> T + Send>),
}

impl<T> RegistrySource<T> {
    pub fn resolve(self) -> T {
        match self {
            RegistrySource::Eager(value) => value,
            RegistrySource::Factory(factory) => factory(),
        }
    }
}

impl<T: Default> Default for RegistrySource<T> {
    fn default() -> Self {
        RegistrySource::Eager(T::default())
    }
}

/// Ordered, version-keyed collection of transforms.
///
/// Keys are held in a sorted map, so iteration and path resolution are
/// deterministic regardless of registration order.
#[derive(Clone, Default)]
pub struct TransformRegistry {
    entries: BTreeMap<SchemaVersion, TransformEntry>,
}

impl std::fmt::Debug for TransformRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TransformRegistry")
            .field("entries", &self.entries)
            .finish()
    }
}

impl TransformRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// The registered version keys in ascending order.
    pub fn versions(&self) -> Vec<SchemaVersion> {
        self.entries.keys().copied().collect()
    }

    /// The highest registered version key, if any.
    pub fn latest_version(&self) -> Option<SchemaVersion> {
        self.entries.keys().next_back().copied()
    }

    /// Register a transform entry for a version key.
    ///
    /// If the key is already present the new transform is chained to run
    /// after the existing one on the same document state. The composed
    /// entry stays deferred only when both parts are deferred; an eager
    /// part forces the whole chain into the eager sweep.
    pub fn register(&mut self, version: SchemaVersion, entry: TransformEntry) {
        match self.entries.entry(version) {
            Entry::Occupied(mut slot) => {
                let existing = slot.get().clone();
                let first = existing.transform;
                let second = entry.transform;
                let chained: TransformFn = Arc::new(move |document| {
                    let intermediate = first(document)?;
                    second(&intermediate)
                });
                slot.insert(TransformEntry {
                    transform: chained,
                    deferred: existing.deferred && entry.deferred,
                });
            }
            Entry::Vacant(slot) => {
                slot.insert(entry);
            }
        }
    }

    /// Fold another registry into this one.
    ///
    /// Entries of `other` are registered in ascending key order, so the
    /// merge is associative and colliding keys compose in registration
    /// order: this registry's transform first, then `other`'s.
    pub fn merge(mut self, other: TransformRegistry) -> TransformRegistry {
        for (version, entry) in other.entries {
            self.register(version, entry);
        }
        self
    }

    /// Build a registry from string version keys.
    ///
    /// This is the assembly seam for tables contributed by other
    /// components. A malformed key aborts the whole build.
    pub fn from_string_keyed<I>(entries: I) -> Result<Self, MalformedVersion>
    where
        I: IntoIterator<Item = (String, TransformEntry)>,
    {
        let mut registry = TransformRegistry::new();
        for (key, entry) in entries {
            registry.register(key.parse()?, entry);
        }
        Ok(registry)
    }

    /// Resolve the ordered transform path from one version to another.
    ///
    /// Returns every entry keyed strictly above `from` and at or below
    /// `to`, ascending. `from == to` resolves to the empty path.
    pub fn resolve_path(
        &self,
        from: SchemaVersion,
        to: SchemaVersion,
    ) -> Vec<(SchemaVersion, TransformEntry)> {
        if from >= to {
            return Vec::new();
        }
        self.entries
            .range((Bound::Excluded(from), Bound::Included(to)))
            .map(|(version, entry)| (*version, entry.clone()))
            .collect()
    }
}
