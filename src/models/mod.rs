//! Models module for the SDK
//!
//! Defines the core data structures the migration pipeline operates on:
//! documents, schema versions and parsed content trees.

pub mod content;
pub mod document;
pub mod version;

pub use content::{ContentNode, ContentTree, EmbeddedNode};
pub use document::{Document, Reference};
pub use version::{MalformedVersion, SchemaVersion};
