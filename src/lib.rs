//! Document Migration SDK - Versioned saved-document migration engine
//!
//! Provides the transformation pipeline that upgrades persisted documents
//! from the schema version they were written under to the current one:
//! - Version-keyed transform registries, merged from multiple owners
//! - Embedded structured-content rewriting (comment bodies with typed nodes)
//! - Per-document migration with step-level failure isolation
//! - Batch coordination over a bounded worker pool
//! - Document store boundary (memory and file backends)

pub mod batch;
pub mod config;
pub mod content;
pub mod migrations;
pub mod migrator;
pub mod models;
pub mod registry;
pub mod storage;

// Re-export commonly used types
pub use batch::{BatchCoordinator, BatchError, BatchReport, CancelFlag, VersionedDocument};
pub use config::{ConfigError, MigrationSettings};
pub use content::ParseError;
pub use migrations::{
    CommentMigrationDeps, EmbeddedMigrations, EmbeddedTransformFn, create_comment_migrations,
};
pub use migrator::{DocumentMigrator, MigrationFailure, MigrationOutcome, MigrationState};
pub use models::{
    ContentNode, ContentTree, Document, EmbeddedNode, MalformedVersion, Reference, SchemaVersion,
};
pub use registry::{
    RegistrySource, TransformEntry, TransformError, TransformFn, TransformRegistry,
};
pub use storage::{DocumentStore, MemoryDocumentStore, StorageError};

#[cfg(feature = "native-fs")]
pub use storage::FileDocumentStore;
