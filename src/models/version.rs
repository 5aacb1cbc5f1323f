//! Schema version identifiers
//!
//! Migration registries are keyed by dotted `major.minor.patch` version
//! identifiers. The ordering of those keys decides which transforms apply
//! to a document and in what sequence, so the comparison here is numeric
//! per component, never lexicographic.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Error raised when a version identifier cannot be parsed.
///
/// Version keys come from migration definitions, not from documents, so a
/// malformed key is a configuration error and aborts registry assembly.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("malformed schema version: {0:?}")]
pub struct MalformedVersion(pub String);

/// A `major.minor.patch` schema version.
///
/// Total ordering is component-wise numeric: `7.9.0 < 7.10.0 < 8.0.0`.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(try_from = "String", into = "String")]
pub struct SchemaVersion {
    pub major: u32,
    pub minor: u32,
    pub patch: u32,
}

impl SchemaVersion {
    /// Create a version from its numeric components.
    pub const fn new(major: u32, minor: u32, patch: u32) -> Self {
        Self {
            major,
            minor,
            patch,
        }
    }

    /// Whether `self` satisfies the given minimum version predicate.
    pub fn is_at_least(&self, minimum: &SchemaVersion) -> bool {
        self >= minimum
    }
}

impl FromStr for SchemaVersion {
    type Err = MalformedVersion;

    fn from_str(input: &str) -> Result<Self, Self::Err> {
        let mut components = input.split('.');

        let next_component = |raw: Option<&str>| -> Result<u32, MalformedVersion> {
            let raw = raw.ok_or_else(|| MalformedVersion(input.to_string()))?;
            // Reject signs, whitespace and empty components that u32::from_str
            // would otherwise tolerate or misreport.
            if raw.is_empty() || !raw.bytes().all(|b| b.is_ascii_digit()) {
                return Err(MalformedVersion(input.to_string()));
            }
            raw.parse::<u32>()
                .map_err(|_| MalformedVersion(input.to_string()))
        };

        let major = next_component(components.next())?;
        let minor = next_component(components.next())?;
        let patch = next_component(components.next())?;

        if components.next().is_some() {
            return Err(MalformedVersion(input.to_string()));
        }

        Ok(SchemaVersion::new(major, minor, patch))
    }
}

impl fmt::Display for SchemaVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.patch)
    }
}

impl TryFrom<String> for SchemaVersion {
    type Error = MalformedVersion;

    fn try_from(input: String) -> Result<Self, Self::Error> {
        input.parse()
    }
}

impl From<SchemaVersion> for String {
    fn from(version: SchemaVersion) -> Self {
        version.to_string()
    }
}
