//! Asset pipelines.
//!
//! A pipeline takes a fixed list of files through the same steps, one file
//! after the other:
//!
//! ```text
//! cache gate ──up to date──▶ skip
//!     │ stale
//!     ▼
//! minify ──▶ gzip ──▶ timestamp record ──▶ remove intermediate
//! ```
//!
//! The record is written only after the artifact is in place, so a failed
//! run is retried on the next build.

mod process;

use std::path::{Path, PathBuf};

use crate::asset::{AssetRoute, Minifier};
use crate::config::{PackConfig, PipelineConfig};
use crate::utils::path::relative_display;

pub use process::Outcome;

/// A configured pipeline resolved against the project root.
#[derive(Debug, Clone)]
pub struct Pipeline {
    /// Name used as the diagnostic prefix
    pub name: String,
    /// Assets in processing order
    pub routes: Vec<AssetRoute>,
    pub minifier: Minifier,
    /// Gzip level
    pub level: u32,
    /// Project root (cwd for external minifiers, base for diagnostics)
    pub root: PathBuf,
}

impl Pipeline {
    pub fn from_config(config: &PipelineConfig, root: &Path, level: u32) -> Self {
        let source_dir = root.join(&config.source_dir);
        let output_dir = root.join(&config.output_dir);
        let record_dir = root.join(config.record_dir());

        let routes = config
            .files
            .iter()
            .map(|name| AssetRoute::new(name, &source_dir, &output_dir, &record_dir))
            .collect();

        Self {
            name: config.name.clone(),
            routes,
            minifier: config.minify.to_minifier(),
            level,
            root: root.to_path_buf(),
        }
    }

    /// Resolve the selected pipelines of `config` (all when `names` is empty).
    pub fn select(config: &PackConfig, names: &[String]) -> anyhow::Result<Vec<Self>> {
        Ok(config
            .select(names)?
            .into_iter()
            .map(|p| Self::from_config(p, config.get_root(), config.gzip.level))
            .collect())
    }

    /// Root-relative display of a path for diagnostics.
    fn show(&self, path: &Path) -> String {
        relative_display(path, &self.root)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::section::default_pipelines;

    #[test]
    fn test_from_config_resolves_paths() {
        let root = Path::new("/work/firmware");
        let configs = default_pipelines();
        let db = Pipeline::from_config(&configs[2], root, 9);

        assert_eq!(db.name, "compress_db");
        assert_eq!(db.minifier, Minifier::None);
        assert_eq!(db.routes.len(), 1);
        assert_eq!(
            db.routes[0].source,
            Path::new("/work/firmware/assets/material_database.json")
        );
        assert_eq!(
            db.routes[0].output,
            Path::new("/work/firmware/data/material_database.json.gz")
        );
        assert_eq!(
            db.routes[0].record,
            Path::new("/work/firmware/.pio/assets/material_database.json.timestamp")
        );
        assert_eq!(
            db.show(&db.routes[0].output),
            "data/material_database.json.gz"
        );
    }

    #[test]
    fn test_select_keeps_config_order() {
        let mut config = PackConfig::default();
        config.root = PathBuf::from("/work/firmware");
        config.gzip.level = 4;

        let pipelines =
            Pipeline::select(&config, &["compress_db".into(), "compress_embed".into()]).unwrap();
        let names: Vec<_> = pipelines.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, ["compress_embed", "compress_db"]);
        assert!(pipelines.iter().all(|p| p.level == 4));
        assert_eq!(pipelines[0].routes.len(), 10);
    }
}
