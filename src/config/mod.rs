//! Project configuration management for `firmpack.toml`.
//!
//! # Module Structure
//!
//! ```text
//! config/
//! ├── section/       # Configuration section definitions
//! │   ├── gzip       # [gzip]
//! │   └── pipeline   # [[pipeline]]
//! ├── types/         # Utility types
//! │   └── error      # ConfigError, ConfigDiagnostics
//! └── mod.rs         # PackConfig (this file)
//! ```
//!
//! The config file is optional. Without one, the stock pipelines
//! (`compress_css`, `compress_embed`, `compress_db`) are used.

pub mod section;
pub mod types;
mod util;

use util::find_config_file;

pub use section::{GzipConfig, PipelineConfig};
pub use types::{ConfigDiagnostics, ConfigError};

use crate::{cli::Cli, debug, log, utils::path::normalize_path};
use anyhow::{Context, Result};
use serde::Deserialize;
use std::{
    fs,
    path::{Path, PathBuf},
};

/// Config file name looked up when `--config` is not given.
pub const DEFAULT_CONFIG_NAME: &str = "firmpack.toml";

// ============================================================================
// root configuration
// ============================================================================

/// Root configuration structure representing firmpack.toml
#[derive(Debug, Clone, Deserialize)]
pub struct PackConfig {
    /// Path of the loaded config file, if any (internal use only)
    #[serde(skip)]
    pub config_path: Option<PathBuf>,

    /// Project root directory all configured paths are relative to (internal use only)
    #[serde(skip)]
    pub root: PathBuf,

    /// Compression settings
    #[serde(default)]
    pub gzip: GzipConfig,

    /// Asset pipelines, processed in order
    #[serde(default = "section::default_pipelines", rename = "pipeline")]
    pub pipelines: Vec<PipelineConfig>,
}

impl Default for PackConfig {
    fn default() -> Self {
        Self {
            config_path: None,
            root: PathBuf::new(),
            gzip: GzipConfig::default(),
            pipelines: section::default_pipelines(),
        }
    }
}

impl PackConfig {
    /// Load configuration from CLI arguments.
    ///
    /// With `--root`, the config is looked up only in that directory.
    /// Otherwise it is searched upward from cwd and its directory becomes
    /// the root. A missing default config falls back to the stock
    /// pipelines rooted at cwd; a missing `--config` file is an error.
    pub fn load(cli: &Cli) -> Result<Self> {
        let cwd = std::env::current_dir().context("Failed to get current working directory")?;
        let explicit = cli.config != Path::new(DEFAULT_CONFIG_NAME);

        let found = match &cli.root {
            Some(root) => {
                let path = normalize_path(root).join(&cli.config);
                path.is_file().then_some(path)
            }
            None => find_config_file(&cli.config, &cwd),
        };

        if found.is_none() && explicit {
            return Err(ConfigError::NotFound(cli.config.clone()).into());
        }

        let mut config = match &found {
            Some(path) => Self::from_path(path)?,
            None => Self::default(),
        };

        let root = match (&cli.root, &found) {
            (Some(root), _) => normalize_path(root),
            (None, Some(path)) => path.parent().map(Path::to_path_buf).unwrap_or(cwd),
            (None, None) => cwd,
        };

        match &found {
            Some(path) => debug!("config"; "using {}", path.display()),
            None => debug!("config"; "no {} found, using stock pipelines", cli.config.display()),
        }

        config.root = root;
        config.config_path = found;
        config.validate()?;
        Ok(config)
    }

    /// Parse configuration from TOML string
    #[cfg(test)]
    pub fn from_str(content: &str) -> Result<Self> {
        let config: Self = toml::from_str(content).map_err(ConfigError::from)?;
        Ok(config)
    }

    /// Load configuration from file path with unknown field detection.
    fn from_path(path: &Path) -> Result<Self> {
        let content =
            fs::read_to_string(path).map_err(|err| ConfigError::Io(path.to_path_buf(), err))?;

        let (config, ignored) = Self::parse_with_ignored(&content)?;

        if !ignored.is_empty() {
            Self::print_unknown_fields_warning(&ignored, path);
        }

        Ok(config)
    }

    /// Parse TOML content, collecting any unknown fields.
    fn parse_with_ignored(content: &str) -> Result<(Self, Vec<String>)> {
        let mut ignored = Vec::new();
        let deserializer = toml::Deserializer::new(content);
        let config = serde_ignored::deserialize(deserializer, |path: serde_ignored::Path| {
            ignored.push(path.to_string());
        })
        .map_err(ConfigError::from)?;
        Ok((config, ignored))
    }

    /// Print warning about unknown fields.
    ///
    /// Runs inside a build, so there is no prompt: the fields are ignored.
    fn print_unknown_fields_warning(fields: &[String], path: &Path) {
        let display_path = path
            .file_name()
            .map(|n| n.to_string_lossy())
            .unwrap_or_else(|| path.to_string_lossy());
        log!("warning"; "unknown fields in {} are ignored: {}", display_path, fields.join(", "));
    }

    /// Check every section, reporting all problems at once.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let mut diag = ConfigDiagnostics::new();
        self.gzip.validate(&mut diag);
        section::validate_pipelines(&self.pipelines, &mut diag);
        diag.into_result()
    }

    /// Get the root directory path
    pub fn get_root(&self) -> &Path {
        &self.root
    }

    /// Select pipelines by name, keeping config order. Empty selects all.
    pub fn select(&self, names: &[String]) -> Result<Vec<&PipelineConfig>> {
        if let Some(unknown) = names
            .iter()
            .find(|name| !self.pipelines.iter().any(|p| &p.name == *name))
        {
            let available: Vec<_> = self.pipelines.iter().map(|p| p.name.as_str()).collect();
            anyhow::bail!(
                "unknown pipeline '{unknown}' (available: {})",
                available.join(", ")
            );
        }

        Ok(self
            .pipelines
            .iter()
            .filter(|p| names.is_empty() || names.contains(&p.name))
            .collect())
    }
}
