//! Comment document migrations
//!
//! The built-in version table for the comment document class, assembled
//! together with the embedded visualization owner's table into one
//! registry. Each transform returns an updated copy and normalizes the
//! reference list, because documents written before 7.11.0 may carry no
//! reference field at all.

use serde_json::json;

use super::{
    COMMENT_TYPE_ALERT, COMMENT_TYPE_USER, GENERATED_ALERT, SECURITY_SOLUTION_OWNER,
    SUB_CASE_REF_TYPE,
};
use crate::migrations::embedded::{self, EmbeddedMigrations};
use crate::models::{Document, MalformedVersion, SchemaVersion};
use crate::registry::{RegistrySource, TransformEntry, TransformError, TransformRegistry};

/// The latest version with a built-in comment migration.
pub const LATEST_COMMENT_VERSION: SchemaVersion = SchemaVersion::new(8, 1, 0);

/// Collaborator inputs needed to assemble the comment migration set.
pub struct CommentMigrationDeps {
    /// Migrations contributed by the embedded visualization owner, either
    /// as a built table or as a factory for one.
    pub embedded_migrations: RegistrySource<EmbeddedMigrations>,
    /// Threshold above which embedded migrations run deferred.
    pub min_deferred_version: SchemaVersion,
}

/// Assemble the full comment migration registry.
///
/// The embedded source is resolved once, its version keys are parsed and
/// each of its node transforms is wrapped into a document-level comment
/// rewrite. A malformed version key from either table aborts assembly.
pub fn create_comment_migrations(
    deps: CommentMigrationDeps,
) -> Result<TransformRegistry, MalformedVersion> {
    let embedded = embedded::wrap_embedded_migrations(
        deps.embedded_migrations.resolve(),
        &deps.min_deferred_version,
    )?;

    let mut comments = TransformRegistry::new();
    comments.register(SchemaVersion::new(7, 11, 0), TransformEntry::eager(backfill_comment_type));
    comments.register(SchemaVersion::new(7, 12, 0), TransformEntry::eager(add_association_type));
    comments.register(SchemaVersion::new(7, 14, 0), TransformEntry::eager(add_owner));
    comments.register(SchemaVersion::new(8, 0, 0), TransformEntry::eager(remove_rule_information));
    comments.register(SchemaVersion::new(8, 1, 0), TransformEntry::eager(remove_association_type));

    Ok(comments.merge(embedded))
}

/// 7.11.0: stamp the comment type.
///
/// Alert comments did not exist before 7.12.0, so everything persisted at
/// this point is a user comment.
fn backfill_comment_type(doc: &Document) -> Result<Document, TransformError> {
    Ok(doc
        .with_attribute("type", json!(COMMENT_TYPE_USER))
        .with_normalized_references())
}

/// 7.12.0: record how the comment is associated with its case.
///
/// Alert comments additionally grow an empty rule placeholder, filled in
/// by the rule lookup the reading side performs.
fn add_association_type(doc: &Document) -> Result<Document, TransformError> {
    let mut updated = doc.with_attribute("associationType", json!("case"));
    if doc.attribute_str("type") == Some(COMMENT_TYPE_ALERT) {
        updated = updated.with_attribute("rule", json!({ "id": null, "name": null }));
    }
    Ok(updated.with_normalized_references())
}

/// 7.14.0: stamp the owning solution on documents created before
/// per-solution ownership existed.
fn add_owner(doc: &Document) -> Result<Document, TransformError> {
    Ok(doc
        .with_attribute("owner", json!(SECURITY_SOLUTION_OWNER))
        .with_normalized_references())
}

/// 8.0.0: drop stale rule details from alert comments.
///
/// The reading side looks the rule up by id when the stored value is
/// null, so resetting the object is safe while rewriting the reference
/// array is not.
fn remove_rule_information(doc: &Document) -> Result<Document, TransformError> {
    let comment_type = doc.attribute_str("type");
    if comment_type == Some(COMMENT_TYPE_ALERT) || comment_type == Some(GENERATED_ALERT) {
        return Ok(doc
            .with_attribute("rule", json!({ "id": null, "name": null }))
            .with_normalized_references());
    }
    Ok(doc.with_normalized_references())
}

/// 8.1.0: retire the association type attribute and sub-case references.
fn remove_association_type(doc: &Document) -> Result<Document, TransformError> {
    Ok(doc
        .without_attribute("associationType")
        .with_filtered_references(|reference| reference.ref_type != SUB_CASE_REF_TYPE))
}
