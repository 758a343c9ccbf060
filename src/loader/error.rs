use miette::{Diagnostic, NamedSource, SourceSpan};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Infrastructure failures while reading a registry. These abort the run.
#[derive(Error, Debug, Diagnostic)]
pub enum LoadError {
    #[error("Registry file not found: {}", path.display())]
    #[diagnostic(
        code(reglint::load::not_found),
        help("check --data-dir or REGLINT_DATA_DIR")
    )]
    NotFound { path: PathBuf },

    #[error("Failed to read {}", path.display())]
    #[diagnostic(code(reglint::load::io))]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid JSON in {}: {message}", path.display())]
    #[diagnostic(code(reglint::load::parse))]
    Parse {
        path: PathBuf,
        #[source_code]
        src: NamedSource<String>,
        #[label("here")]
        span: SourceSpan,
        message: String,
    },

    #[error("{}: expected a top-level {expected}", path.display())]
    #[diagnostic(code(reglint::load::shape))]
    Shape {
        path: PathBuf,
        expected: &'static str,
    },
}

impl LoadError {
    pub fn parse(path: &Path, content: String, error: &serde_json::Error) -> Self {
        let span = crate::error_utils::span_at(&content, error.line(), error.column());
        Self::Parse {
            path: path.to_path_buf(),
            src: crate::error_utils::create_named_source(path, content),
            span,
            message: error.to_string(),
        }
    }
}
