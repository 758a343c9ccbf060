//! Context information for error reporting

use std::path::{Path, PathBuf};
use std::sync::OnceLock;

static ORIGINAL_DIR: OnceLock<PathBuf> = OnceLock::new();

/// Remember the directory reglint was invoked from
pub fn init_context(original_dir: PathBuf) {
    ORIGINAL_DIR.set(original_dir).ok();
}

/// Render a registry path relative to the invocation directory when possible
pub fn to_original_relative_path(path: &Path) -> PathBuf {
    let Some(original) = ORIGINAL_DIR.get() else {
        return path.to_path_buf();
    };

    if !path.is_absolute() {
        return path.to_path_buf();
    }

    match path.strip_prefix(original) {
        Ok(relative) => relative.to_path_buf(),
        Err(_) => path.to_path_buf(),
    }
}
