//! Content parsing and serialization
//!
//! Provides the round-trip between raw comment strings and [`ContentTree`]
//! values:
//! - `parse` - tokenize free text and `!{type{json}}` embedded nodes
//! - `map_embedded_nodes` - rewrite matching embedded nodes, structure untouched
//! - `serialize` - deterministic re-serialization with trailing-newline fidelity

use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;

use crate::models::{ContentNode, ContentTree, EmbeddedNode};

// Opening marker of an embedded node. The second brace starts the JSON
// attribute object and stays part of the payload.
static RE_EMBED_OPEN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"!\{([A-Za-z][A-Za-z0-9_-]*)\{").expect("Invalid regex"));

/// Error during content parsing
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseError {
    #[error("unterminated embedded node at byte {offset}")]
    UnterminatedEmbed { offset: usize },
    #[error("invalid attributes for embedded {node_type:?} node: {message}")]
    InvalidAttributes { node_type: String, message: String },
}

/// Parse a raw content string into a tree of text and embedded nodes.
///
/// Text runs are kept verbatim. A `!{` that does not introduce a
/// well-formed embedded node marker is treated as plain text; a marker
/// whose payload is malformed fails the whole parse.
pub fn parse(raw: &str) -> Result<ContentTree, ParseError> {
    let mut nodes = Vec::new();
    let mut text_start = 0usize;
    let mut cursor = 0usize;

    while let Some(captures) = RE_EMBED_OPEN.captures_at(raw, cursor) {
        let (Some(marker), Some(type_match)) = (captures.get(0), captures.get(1)) else {
            break;
        };
        let node_type = type_match.as_str().to_string();

        // The JSON object begins at the second brace of the marker.
        let payload_start = marker.end() - 1;
        let mut stream =
            serde_json::Deserializer::from_str(&raw[payload_start..]).into_iter::<Value>();
        // The payload starts at a brace, so a successful parse is always
        // a JSON object.
        let attributes = match stream.next() {
            Some(Ok(value)) => value,
            Some(Err(err)) => {
                return Err(ParseError::InvalidAttributes {
                    node_type,
                    message: err.to_string(),
                });
            }
            None => {
                return Err(ParseError::UnterminatedEmbed {
                    offset: marker.start(),
                });
            }
        };

        // The embedded node closes with one more brace after the payload.
        let payload_end = payload_start + stream.byte_offset();
        if !raw[payload_end..].starts_with('}') {
            return Err(ParseError::UnterminatedEmbed {
                offset: marker.start(),
            });
        }

        if marker.start() > text_start {
            nodes.push(ContentNode::Text(raw[text_start..marker.start()].to_string()));
        }
        nodes.push(ContentNode::Embedded(EmbeddedNode {
            node_type,
            attributes,
        }));

        cursor = payload_end + 1;
        text_start = cursor;
    }

    if text_start < raw.len() {
        nodes.push(ContentNode::Text(raw[text_start..].to_string()));
    }

    Ok(ContentTree {
        nodes,
        ends_with_newline: raw.ends_with('\n'),
    })
}

/// Apply `transform` to every embedded node matching `predicate`.
///
/// Non-matching nodes and text runs are copied untouched. The first
/// failing node fails the whole call; no partially rewritten tree is
/// ever returned.
pub fn map_embedded_nodes<E>(
    tree: &ContentTree,
    predicate: impl Fn(&EmbeddedNode) -> bool,
    transform: impl Fn(&EmbeddedNode) -> Result<EmbeddedNode, E>,
) -> Result<ContentTree, E> {
    let mut nodes = Vec::with_capacity(tree.nodes.len());
    for node in &tree.nodes {
        match node {
            ContentNode::Embedded(embedded) if predicate(embedded) => {
                nodes.push(ContentNode::Embedded(transform(embedded)?));
            }
            other => nodes.push(other.clone()),
        }
    }
    Ok(ContentTree {
        nodes,
        ends_with_newline: tree.ends_with_newline,
    })
}

/// Serialize a content tree back to its string form.
///
/// Embedded nodes serialize as compact JSON. The output ends with exactly
/// one newline when the source did and with none otherwise.
pub fn serialize(tree: &ContentTree) -> String {
    let mut out = String::new();
    for node in &tree.nodes {
        match node {
            ContentNode::Text(text) => out.push_str(text),
            ContentNode::Embedded(embedded) => {
                out.push_str("!{");
                out.push_str(&embedded.node_type);
                out.push_str(&embedded.attributes.to_string());
                out.push('}');
            }
        }
    }

    let body_len = out.trim_end_matches('\n').len();
    out.truncate(body_len);
    if tree.ends_with_newline {
        out.push('\n');
    }
    out
}
