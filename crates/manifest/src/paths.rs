//! Derived-path convention for corrected artifacts.

use std::ffi::OsString;
use std::path::{Path, PathBuf};

/// `<dir>/<name><suffix><ext>` next to `path`.
///
/// The extension is the part after the last dot of the file name, so
/// `talk.tar.gz` becomes `talk.tar_synced.gz`. Leading-dot names such as
/// `.clip` have no extension and become `.clip_synced`.
pub fn derived_path(path: &Path, suffix: &str) -> PathBuf {
    let mut name = OsString::new();
    if let Some(stem) = path.file_stem() {
        name.push(stem);
    }
    name.push(suffix);
    if let Some(ext) = path.extension() {
        name.push(".");
        name.push(ext);
    }

    match path.parent() {
        Some(parent) => parent.join(name),
        None => PathBuf::from(name),
    }
}
