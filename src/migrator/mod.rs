//! Per-document migration
//!
//! Applies the resolved transform path for a single document strictly in
//! ascending version order. Each step consumes the previous step's output;
//! a failing step never leaks a half-applied document. All transform
//! errors are absorbed here and converted into a failed outcome, so no
//! error crosses this boundary toward the batch coordinator.

use std::sync::Arc;

use serde::Serialize;
use tracing::{debug, error};

use crate::models::{Document, SchemaVersion};
use crate::registry::{TransformError, TransformRegistry};

/// Progression of a single document through its transform path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MigrationState {
    Pending(SchemaVersion),
    Applying {
        version: SchemaVersion,
        step_index: usize,
    },
    Done(SchemaVersion),
    Failed {
        last_good_version: SchemaVersion,
    },
}

/// Structured record of a failed migration step.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MigrationFailure {
    pub document_id: String,
    /// The attribute being rewritten when the step failed, if the error
    /// names one (content rewrites report `"comment"`).
    pub field: Option<String>,
    pub version_step: SchemaVersion,
    pub message: String,
}

impl MigrationFailure {
    fn from_error(document_id: &str, version_step: SchemaVersion, error: &TransformError) -> Self {
        Self {
            document_id: document_id.to_string(),
            field: error.field().map(str::to_string),
            version_step,
            message: error.to_string(),
        }
    }
}

/// Terminal result of migrating one document.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "status", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum MigrationOutcome {
    /// Every eager step applied; the document is at the target version.
    Done {
        document: Document,
        version: SchemaVersion,
        /// Deferred version steps skipped by the eager sweep, still owed
        /// to an on-demand `run_deferred` call.
        pending_deferred: Vec<SchemaVersion>,
    },
    /// A step failed. The original document is returned unmodified so the
    /// host can retry the whole path on a later read.
    Failed {
        document: Document,
        failure: MigrationFailure,
    },
    /// The batch was cancelled before this document was processed.
    Cancelled {
        document: Document,
        version: SchemaVersion,
    },
}

impl MigrationOutcome {
    /// The document value carried by any outcome variant.
    pub fn document(&self) -> &Document {
        match self {
            MigrationOutcome::Done { document, .. }
            | MigrationOutcome::Failed { document, .. }
            | MigrationOutcome::Cancelled { document, .. } => document,
        }
    }

    pub fn is_done(&self) -> bool {
        matches!(self, MigrationOutcome::Done { .. })
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, MigrationOutcome::Failed { .. })
    }
}

/// Migrates single documents through an assembled transform registry.
pub struct DocumentMigrator {
    registry: Arc<TransformRegistry>,
    target: SchemaVersion,
}

impl DocumentMigrator {
    pub fn new(registry: TransformRegistry, target: SchemaVersion) -> Self {
        Self {
            registry: Arc::new(registry),
            target,
        }
    }

    /// The version every successfully migrated document ends up at.
    pub fn target_version(&self) -> SchemaVersion {
        self.target
    }

    pub fn registry(&self) -> &TransformRegistry {
        &self.registry
    }

    /// Run the eager migration sweep for one document.
    ///
    /// Deferred entries on the path are skipped and reported via
    /// `pending_deferred` on the outcome. An empty path returns the
    /// document unchanged, which makes a second sweep over an
    /// already-migrated document a no-op.
    pub fn migrate(&self, document: &Document, source_version: SchemaVersion) -> MigrationOutcome {
        let path = self.registry.resolve_path(source_version, self.target);

        let mut state = MigrationState::Pending(source_version);
        debug!(document_id = %document.id, state = ?state, steps = path.len(), "resolved migration path");

        let mut current = document.clone();
        let mut last_good = source_version;
        let mut pending_deferred = Vec::new();
        let mut applied = 0usize;

        for (step_index, (version, entry)) in path.iter().enumerate() {
            if entry.deferred {
                pending_deferred.push(*version);
                continue;
            }

            state = MigrationState::Applying {
                version: *version,
                step_index,
            };
            debug!(document_id = %document.id, state = ?state, "applying migration step");

            match (entry.transform)(&current) {
                Ok(next) => {
                    current = next;
                    last_good = *version;
                    applied += 1;
                }
                Err(step_error) => {
                    state = MigrationState::Failed {
                        last_good_version: last_good,
                    };
                    let failure = MigrationFailure::from_error(&document.id, *version, &step_error);
                    error!(
                        document_id = %failure.document_id,
                        version_step = %failure.version_step,
                        field = ?failure.field,
                        state = ?state,
                        "migration step failed: {step_error}"
                    );
                    return MigrationOutcome::Failed {
                        document: document.clone(),
                        failure,
                    };
                }
            }
        }

        if applied > 0 {
            current = current.with_normalized_references();
        }
        state = MigrationState::Done(self.target);
        debug!(document_id = %document.id, state = ?state, steps = applied, "document migrated");

        MigrationOutcome::Done {
            document: current,
            version: self.target,
            pending_deferred,
        }
    }

    /// Apply the deferred entries of the path on demand.
    ///
    /// This is the out-of-band counterpart to `migrate`, triggered by the
    /// embedded-content owner once it is ready to pay the rewrite cost.
    /// Error handling matches the eager sweep: the original document is
    /// returned on any step failure.
    pub fn run_deferred(
        &self,
        document: &Document,
        source_version: SchemaVersion,
    ) -> MigrationOutcome {
        let mut current = document.clone();
        let mut applied = 0usize;

        for (version, entry) in self.registry.resolve_path(source_version, self.target) {
            if !entry.deferred {
                continue;
            }
            match (entry.transform)(&current) {
                Ok(next) => {
                    current = next;
                    applied += 1;
                }
                Err(step_error) => {
                    let failure = MigrationFailure::from_error(&document.id, version, &step_error);
                    error!(
                        document_id = %failure.document_id,
                        version_step = %failure.version_step,
                        field = ?failure.field,
                        "deferred migration step failed: {step_error}"
                    );
                    return MigrationOutcome::Failed {
                        document: document.clone(),
                        failure,
                    };
                }
            }
        }

        if applied > 0 {
            current = current.with_normalized_references();
        }
        MigrationOutcome::Done {
            document: current,
            version: self.target,
            pending_deferred: Vec::new(),
        }
    }
}
