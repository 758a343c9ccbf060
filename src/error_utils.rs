//! Helpers for pointing diagnostics at registry files

use miette::{NamedSource, SourceSpan};
use std::path::Path;

/// Source handle for a registry file, labelled with its path as the user
/// typed it
pub fn create_named_source(path: &Path, content: String) -> NamedSource<String> {
    let label = crate::loader::context::to_original_relative_path(path);
    NamedSource::new(label.display().to_string(), content).with_language("json")
}

/// Span covering the character serde_json reported an error at.
///
/// serde_json lines and columns are 1-based; column 0 means "before the first
/// character of the line".
pub fn span_at(content: &str, line: usize, column: usize) -> SourceSpan {
    let mut offset = 0;
    for (i, text) in content.split_inclusive('\n').enumerate() {
        if i + 1 == line {
            let col = column.saturating_sub(1).min(text.len());
            let start = offset + col;
            let len = usize::from(start < content.len());
            return SourceSpan::new(start.into(), len);
        }
        offset += text.len();
    }
    SourceSpan::new(content.len().into(), 0)
}
