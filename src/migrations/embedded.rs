//! Embedded visualization migrations
//!
//! Visualization nodes embedded in comment bodies carry their own
//! versioned attributes, owned by another component. That owner hands
//! over a string-keyed table of node transforms; each one is wrapped here
//! into a document-level transform that parses the comment, rewrites
//! every visualization node and re-serializes with newline fidelity.

use std::collections::HashMap;
use std::sync::Arc;

use serde_json::Value;

use super::is_deferred_migration;
use crate::content;
use crate::models::{Document, EmbeddedNode, MalformedVersion, SchemaVersion};
use crate::registry::{TransformEntry, TransformError, TransformFn, TransformRegistry};

/// Node type discriminant of embedded visualizations.
pub const VISUALIZATION_NODE_TYPE: &str = "visualization";

/// The attribute holding a comment's content string.
const COMMENT_FIELD: &str = "comment";

/// A transform over one embedded node's attributes.
pub type EmbeddedTransformFn =
    Arc<dyn Fn(&EmbeddedNode) -> Result<EmbeddedNode, TransformError> + Send + Sync>;

/// The table an embedded-content owner contributes: version key strings
/// mapped to node transforms.
pub type EmbeddedMigrations = HashMap<String, EmbeddedTransformFn>;

/// Whether a content node is an embedded visualization.
pub fn is_visualization_node(node: &EmbeddedNode) -> bool {
    node.node_type == VISUALIZATION_NODE_TYPE
}

/// Wrap an owner-contributed table into document-level transforms.
///
/// Version keys are parsed up front; a malformed key aborts assembly
/// before any document is processed. Registrations at or above
/// `min_deferred` are marked deferred so the eager sweep can skip the
/// comparatively expensive content rewrite.
pub fn wrap_embedded_migrations(
    migrations: EmbeddedMigrations,
    min_deferred: &SchemaVersion,
) -> Result<TransformRegistry, MalformedVersion> {
    let mut registry = TransformRegistry::new();
    for (key, node_transform) in migrations {
        let version: SchemaVersion = key.parse()?;
        let deferred = is_deferred_migration(min_deferred, &version);

        let transform: TransformFn =
            Arc::new(move |doc| rewrite_comment_content(doc, &node_transform));
        registry.register(
            version,
            TransformEntry {
                transform,
                deferred,
            },
        );
    }
    Ok(registry)
}

/// Rewrite every visualization node of a document's comment body.
///
/// A document without a comment attribute passes through unchanged. Parse
/// and node-transform failures surface as content errors naming the
/// comment field, leaving the failure policy to the migrator.
fn rewrite_comment_content(
    doc: &Document,
    node_transform: &EmbeddedTransformFn,
) -> Result<Document, TransformError> {
    let Some(raw) = doc.attribute_str(COMMENT_FIELD) else {
        return Ok(doc.clone());
    };

    let tree = content::parse(raw).map_err(|source| TransformError::Content {
        field: COMMENT_FIELD.to_string(),
        source,
    })?;

    let rewritten = content::map_embedded_nodes(&tree, is_visualization_node, |node| {
        node_transform(node)
    })?;

    let serialized = content::serialize(&rewritten);
    Ok(doc.with_attribute(COMMENT_FIELD, Value::String(serialized)))
}
