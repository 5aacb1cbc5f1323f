//! Batch coordination
//!
//! Runs the document migrator over a collection of documents. Documents
//! have no data dependency on each other, so the work fans out over a
//! bounded worker pool; results come back in input order. One document's
//! failure never affects a sibling, and a cancelled batch returns the
//! remaining documents untouched.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use chrono::{DateTime, Utc};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::migrator::{DocumentMigrator, MigrationOutcome};
use crate::models::{Document, SchemaVersion};

/// Error during batch coordinator construction
#[derive(Debug, thiserror::Error)]
pub enum BatchError {
    #[error("failed to build worker pool: {0}")]
    WorkerPool(#[from] rayon::ThreadPoolBuildError),
}

/// A document paired with the schema version it was persisted under.
///
/// The version tag is not stored on the document itself; the host reads
/// it from the store's metadata and supplies it here.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VersionedDocument {
    pub source_version: SchemaVersion,
    pub document: Document,
}

impl VersionedDocument {
    pub fn new(source_version: SchemaVersion, document: Document) -> Self {
        Self {
            source_version,
            document,
        }
    }
}

/// Cooperative cancellation handle shared with the host.
///
/// Cancellation is checked at document granularity: a document is either
/// fully migrated or untouched, never in between.
#[derive(Clone, Default)]
pub struct CancelFlag(Arc<AtomicBool>);

impl CancelFlag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Summary of one batch run.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchReport {
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub total: usize,
    pub migrated: usize,
    pub failed: usize,
    pub cancelled: usize,
}

/// Runs per-document migrations across a bounded worker pool.
pub struct BatchCoordinator {
    migrator: Arc<DocumentMigrator>,
    pool: rayon::ThreadPool,
    cancel: CancelFlag,
}

impl BatchCoordinator {
    /// Create a coordinator with its own worker pool.
    ///
    /// `worker_threads == 0` sizes the pool to the machine's logical CPU
    /// count, matching the CPU-bound cost profile of content rewrites.
    pub fn new(migrator: DocumentMigrator, worker_threads: usize) -> Result<Self, BatchError> {
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(worker_threads)
            .thread_name(|index| format!("doc-migration-{index}"))
            .build()?;
        Ok(Self {
            migrator: Arc::new(migrator),
            pool,
            cancel: CancelFlag::new(),
        })
    }

    /// Handle the host can use to cancel the batch between documents.
    pub fn cancel_flag(&self) -> CancelFlag {
        self.cancel.clone()
    }

    /// Migrate a collection of documents, preserving input order.
    ///
    /// Failures are reported per document and never abort the batch.
    pub fn migrate(&self, documents: Vec<VersionedDocument>) -> Vec<MigrationOutcome> {
        let migrator = Arc::clone(&self.migrator);
        let cancel = self.cancel.clone();

        self.pool.install(|| {
            documents
                .into_par_iter()
                .map(|item| {
                    if cancel.is_cancelled() {
                        return MigrationOutcome::Cancelled {
                            version: item.source_version,
                            document: item.document,
                        };
                    }
                    migrator.migrate(&item.document, item.source_version)
                })
                .collect()
        })
    }

    /// Migrate a collection and summarize the run.
    pub fn migrate_with_report(
        &self,
        documents: Vec<VersionedDocument>,
    ) -> (Vec<MigrationOutcome>, BatchReport) {
        let started_at = Utc::now();
        let total = documents.len();

        let outcomes = self.migrate(documents);

        let mut migrated = 0usize;
        let mut failed = 0usize;
        let mut cancelled = 0usize;
        for outcome in &outcomes {
            match outcome {
                MigrationOutcome::Done { .. } => migrated += 1,
                MigrationOutcome::Failed { .. } => failed += 1,
                MigrationOutcome::Cancelled { .. } => cancelled += 1,
            }
        }

        let report = BatchReport {
            started_at,
            finished_at: Utc::now(),
            total,
            migrated,
            failed,
            cancelled,
        };

        if failed > 0 {
            warn!(total, migrated, failed, cancelled, "batch finished with failures");
        } else {
            info!(total, migrated, cancelled, "batch finished");
        }

        (outcomes, report)
    }
}
