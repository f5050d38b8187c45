//! Path planning: every file the pipeline reads or writes is named here.

pub mod naming;
pub mod subject;
pub mod templates;

pub use naming::{Hemisphere, Mesh, Space, ANNOTATIONS, SEGMENTATIONS};
pub use subject::{DenseKind, SubjectLayout};
pub use templates::TemplatePaths;

use std::path::{Path, PathBuf};

/// Replace `from` with `to` in the file name only, keeping the directory.
pub fn sibling_path(path: &Path, from: &str, to: &str) -> PathBuf {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().replace(from, to))
        .unwrap_or_default();
    match path.parent() {
        Some(dir) => dir.join(name),
        None => PathBuf::from(name),
    }
}
