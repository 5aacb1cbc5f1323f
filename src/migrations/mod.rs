//! Built-in migration tables
//!
//! Provides the version-keyed migration set for the case comment document
//! class and the wrapper that folds an embedded visualization owner's
//! migrations into it.

pub mod comment;
pub mod embedded;

pub use comment::{CommentMigrationDeps, create_comment_migrations};
pub use embedded::{EmbeddedMigrations, EmbeddedTransformFn, is_visualization_node};

use crate::models::SchemaVersion;

/// Comment type written by a person.
pub const COMMENT_TYPE_USER: &str = "user";
/// Comment type attached by an alerting rule.
pub const COMMENT_TYPE_ALERT: &str = "alert";
/// Comment type for alerts attached automatically, introduced alongside
/// the alert type and retired with it.
pub const GENERATED_ALERT: &str = "generated_alert";

/// Reference type of the retired sub-case document class.
pub const SUB_CASE_REF_TYPE: &str = "cases-sub-case";

/// Owner stamped on documents that predate per-solution ownership.
pub const SECURITY_SOLUTION_OWNER: &str = "securitySolution";

/// Registrations at or above this version may be deferred past the eager
/// migration sweep.
pub const MIN_DEFERRED_VERSION: SchemaVersion = SchemaVersion::new(8, 10, 0);

/// Classify a migration registration as deferred.
///
/// The comparison is against the registration's own version key, never
/// against the version of any document flowing through it.
pub fn is_deferred_migration(
    min_deferred: &SchemaVersion,
    migration_version: &SchemaVersion,
) -> bool {
    migration_version.is_at_least(min_deferred)
}
