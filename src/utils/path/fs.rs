//! Path normalization utilities.
//!
//! - `normalize_path` - project root resolution (canonicalize + fallback)
//! - `relative_display` - root-relative paths for diagnostics
//! - `is_contained` - reject config entries that escape their directory

use std::path::{Component, Path, PathBuf};

/// Normalize a file system path to absolute form.
///
/// Tries `canonicalize()` first (resolves symlinks, `.`, `..`).
/// Falls back to:
/// - Return as-is if already absolute
/// - Join with current directory if relative
#[inline]
pub fn normalize_path(path: &Path) -> PathBuf {
    path.canonicalize().unwrap_or_else(|_| {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            std::env::current_dir().map_or_else(|_| path.to_path_buf(), |cwd| cwd.join(path))
        }
    })
}

/// Display `path` relative to `root` when it lives below it.
///
/// Diagnostics read `gzip 'embed/favicon.svg' to '.pio/embed/favicon.svg.gz'`
/// regardless of where the project is checked out.
pub fn relative_display(path: &Path, root: &Path) -> String {
    path.strip_prefix(root)
        .unwrap_or(path)
        .display()
        .to_string()
}

/// Check that a relative path stays inside the directory it is joined to.
///
/// Absolute paths, `..` components and empty paths are rejected.
pub fn is_contained(path: &Path) -> bool {
    let mut has_normal = false;
    for component in path.components() {
        match component {
            Component::Normal(_) => has_normal = true,
            Component::CurDir => {}
            Component::ParentDir | Component::RootDir | Component::Prefix(_) => return false,
        }
    }
    has_normal
}
