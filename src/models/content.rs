//! Structured content tree
//!
//! Comment bodies are free text that may embed typed nodes written as
//! `!{<type>{<json>}}`. The parsed form keeps text runs verbatim so that
//! re-serialization reproduces the source byte for byte, apart from the
//! trailing-newline normalization applied by the serializer.

use serde_json::Value;

/// One node of a parsed content tree.
#[derive(Debug, Clone, PartialEq)]
pub enum ContentNode {
    /// A verbatim run of text between embedded nodes.
    Text(String),
    /// An embedded typed node carrying its own attributes.
    Embedded(EmbeddedNode),
}

/// An embedded node with a type discriminant and a JSON attribute payload.
///
/// The payload of a visualization node carries its own schema version and
/// is migrated by the registry its owner contributes.
#[derive(Debug, Clone, PartialEq)]
pub struct EmbeddedNode {
    pub node_type: String,
    pub attributes: Value,
}

impl EmbeddedNode {
    pub fn new(node_type: impl Into<String>, attributes: Value) -> Self {
        Self {
            node_type: node_type.into(),
            attributes,
        }
    }
}

/// A parsed content string.
#[derive(Debug, Clone, PartialEq)]
pub struct ContentTree {
    pub nodes: Vec<ContentNode>,
    /// Whether the source string ended with a newline. The serializer
    /// emits exactly one trailing newline when set and none otherwise.
    pub ends_with_newline: bool,
}

impl ContentTree {
    /// Iterate over the embedded nodes of the tree.
    pub fn embedded_nodes(&self) -> impl Iterator<Item = &EmbeddedNode> {
        self.nodes.iter().filter_map(|node| match node {
            ContentNode::Embedded(embedded) => Some(embedded),
            ContentNode::Text(_) => None,
        })
    }
}
