//! Corrective and migration transforms
//!
//! Transforms never touch the filesystem: they take a parsed document and
//! return the rewritten document together with a [`ChangeReport`]. Writing
//! the result back is up to the caller.

mod fixes;
pub mod migrate;

pub use fixes::{
    Fix, address_fields, checksum_records, encode_logo_uris, filter_tokens, remove_vault_curator,
    remove_vault_field,
};
pub use migrate::{LegacySources, Migration, migrate};

use serde::Serialize;
use serde_json::Value;
use std::fmt;
use thiserror::Error;

use crate::loader::Registry;

#[derive(Error, Debug)]
pub enum TransformError {
    #[error("{0} must be a top-level array to be transformed")]
    NotAnArray(Registry),

    #[error("{0} has no address fields to checksum")]
    NoAddressFields(Registry),

    #[error("{fix} does not apply to {registry}")]
    Unsupported { fix: Fix, registry: Registry },

    #[error("--curator only applies to remove-curators on a vault listing (got {0})")]
    CuratorFilter(Fix),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Change {
    pub location: String,
    pub before: String,
    pub after: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ChangeReport {
    pub changes: Vec<Change>,
    /// Things the transform noticed but left alone
    pub notes: Vec<String>,
}

impl ChangeReport {
    pub fn change(
        &mut self,
        location: impl Into<String>,
        before: impl Into<String>,
        after: impl Into<String>,
    ) {
        self.changes.push(Change {
            location: location.into(),
            before: before.into(),
            after: after.into(),
        });
    }

    pub fn note(&mut self, note: impl Into<String>) {
        self.notes.push(note.into());
    }
}

impl fmt::Display for ChangeReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for change in &self.changes {
            writeln!(f, "{}", change.location)?;
            writeln!(f, "  from: {}", change.before)?;
            writeln!(f, "    to: {}", change.after)?;
        }
        for note in &self.notes {
            writeln!(f, "note: {note}")?;
        }
        Ok(())
    }
}

/// A rewritten document and what changed in it
#[derive(Debug, Clone)]
pub struct Transformed {
    pub document: Value,
    pub report: ChangeReport,
}

/// Pretty JSON with two-space indentation and a trailing newline, the layout
/// of every registry file
pub fn to_registry_json(document: &Value) -> serde_json::Result<String> {
    let mut out = serde_json::to_string_pretty(document)?;
    out.push('\n');
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_report_display() {
        let mut report = ChangeReport::default();
        report.change("index 0 address", "0xabc", "0xAbC");
        report.note("index 1: no logoURI");
        assert_eq!(
            report.to_string(),
            "index 0 address\n  from: 0xabc\n    to: 0xAbC\nnote: index 1: no logoURI\n"
        );
    }

    #[test]
    fn test_registry_json_layout() {
        let text = to_registry_json(&json!([{"chainId": 1}])).unwrap();
        assert_eq!(text, "[\n  {\n    \"chainId\": 1\n  }\n]\n");
    }
}
