//! Asset route: source → artifact → timestamp record mapping.

use std::ffi::OsString;
use std::path::{Path, PathBuf};

/// Path information for one asset of a pipeline.
///
/// This is the single source of truth for where an asset is read from and
/// where its artifact, intermediate and timestamp record live.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssetRoute {
    /// Logical filename as listed in the pipeline (e.g. "toastify.css")
    pub name: String,
    /// Source file path (`<source_dir>/<name>`)
    pub source: PathBuf,
    /// Compressed artifact path (`<output_dir>/<name>.gz`)
    pub output: PathBuf,
    /// Timestamp record path (`<record_dir>/<name>.timestamp`)
    pub record: PathBuf,
    /// Minified intermediate path (`<output_dir>/<name>`)
    pub intermediate: PathBuf,
}

impl AssetRoute {
    pub fn new(name: &str, source_dir: &Path, output_dir: &Path, record_dir: &Path) -> Self {
        let intermediate = output_dir.join(name);
        Self {
            name: name.to_owned(),
            source: source_dir.join(name),
            output: with_suffix(&intermediate, ".gz"),
            record: with_suffix(&record_dir.join(name), ".timestamp"),
            intermediate,
        }
    }

    /// Extension of the logical filename, lowercased.
    pub fn extension(&self) -> Option<String> {
        Path::new(&self.name)
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase)
    }
}

/// Append `suffix` to the file name (`a.css` + `.gz` → `a.css.gz`).
fn with_suffix(path: &Path, suffix: &str) -> PathBuf {
    let mut name = OsString::from(path.as_os_str());
    name.push(suffix);
    PathBuf::from(name)
}
