//! `[[pipeline]]` section configuration.
//!
//! Each pipeline names a source directory, an output directory and the
//! files to gzip from one into the other.
//!
//! # Example
//!
//! ```toml
//! [[pipeline]]
//! name = "compress_css"
//! source_dir = "embed"
//! output_dir = ".pio/embed"
//! minify = "cleancss"          # none | cleancss | builtin | { command = [...] }
//! files = ["toastify.css"]
//!
//! [[pipeline]]
//! name = "compress_db"
//! source_dir = "assets"
//! output_dir = "data"
//! record_dir = ".pio/assets"   # defaults to output_dir
//! files = ["material_database.json"]
//! ```

use std::path::{Path, PathBuf};

use rustc_hash::FxHashSet;
use serde::Deserialize;

use crate::asset::Minifier;
use crate::asset::minify::{INPUT_PLACEHOLDER, OUTPUT_PLACEHOLDER};
use crate::config::ConfigDiagnostics;
use crate::utils::path::is_contained;

// ============================================================================
// Pipeline
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct PipelineConfig {
    /// Pipeline name, used as the diagnostic prefix and on the command line.
    pub name: String,

    /// Directory the listed files are read from.
    pub source_dir: PathBuf,

    /// Directory the `.gz` artifacts (and minifier intermediates) go to.
    pub output_dir: PathBuf,

    /// Directory for `.timestamp` records. Defaults to `output_dir`.
    #[serde(default)]
    pub record_dir: Option<PathBuf>,

    /// Minification before compression.
    #[serde(default)]
    pub minify: MinifySetting,

    /// File names relative to `source_dir`.
    pub files: Vec<String>,
}

impl PipelineConfig {
    /// Directory holding the timestamp records.
    pub fn record_dir(&self) -> &Path {
        self.record_dir.as_deref().unwrap_or(&self.output_dir)
    }

    fn validate(&self, idx: usize, diag: &mut ConfigDiagnostics) {
        let field = |name: &str| format!("pipeline[{idx}].{name}");

        if self.name.trim().is_empty() {
            diag.error(field("name"), "must not be empty");
        }

        for (key, dir) in [
            ("source_dir", Some(self.source_dir.as_path())),
            ("output_dir", Some(self.output_dir.as_path())),
            ("record_dir", self.record_dir.as_deref()),
        ] {
            if dir.is_some_and(|d| d.as_os_str().is_empty()) {
                diag.error(field(key), "must not be empty");
            }
        }

        if self.files.is_empty() {
            diag.error(field("files"), "no files listed");
        }

        let mut seen = FxHashSet::default();
        for (i, file) in self.files.iter().enumerate() {
            if !is_contained(Path::new(file)) {
                diag.error_with_hint(
                    format!("pipeline[{idx}].files[{i}]"),
                    format!("'{file}' is not a relative path inside source_dir"),
                    "list files relative to source_dir without `..`",
                );
            } else if !seen.insert(file.as_str()) {
                diag.error(
                    format!("pipeline[{idx}].files[{i}]"),
                    format!("'{file}' is listed twice"),
                );
            }
        }

        self.minify.validate(&field("minify"), diag);

        // External minifiers write `<output_dir>/<file>`, which would be the source itself.
        if self.minify.is_external() && self.source_dir == self.output_dir {
            diag.error_with_hint(
                field("output_dir"),
                "must differ from source_dir when an external minifier is used",
                "point output_dir at a build directory such as `.pio/embed`",
            );
        }
    }
}

/// Validate all pipelines, including name uniqueness across them.
pub fn validate_pipelines(pipelines: &[PipelineConfig], diag: &mut ConfigDiagnostics) {
    if pipelines.is_empty() {
        diag.error_with_hint(
            "pipeline",
            "no pipelines configured",
            "add a [[pipeline]] table or remove the empty `pipeline` key",
        );
    }

    let mut names = FxHashSet::default();
    for (idx, pipeline) in pipelines.iter().enumerate() {
        pipeline.validate(idx, diag);
        if !names.insert(pipeline.name.as_str()) {
            diag.error(
                format!("pipeline[{idx}].name"),
                format!("duplicate pipeline name '{}'", pipeline.name),
            );
        }
    }
}

// ============================================================================
// Minify setting
// ============================================================================

/// `minify = "none" | "cleancss" | "builtin"` or `minify = { command = [...] }`
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum MinifySetting {
    Preset(MinifyPreset),
    Command { command: Vec<String> },
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MinifyPreset {
    #[default]
    None,
    Cleancss,
    Builtin,
}

impl Default for MinifySetting {
    fn default() -> Self {
        Self::Preset(MinifyPreset::None)
    }
}

impl MinifySetting {
    /// Build the runtime minifier.
    pub fn to_minifier(&self) -> Minifier {
        match self {
            Self::Preset(MinifyPreset::None) => Minifier::None,
            Self::Preset(MinifyPreset::Cleancss) => Minifier::cleancss(),
            Self::Preset(MinifyPreset::Builtin) => Minifier::Builtin,
            Self::Command { command } => Minifier::External {
                program: command.first().cloned().unwrap_or_default(),
                args: command.iter().skip(1).cloned().collect(),
            },
        }
    }

    /// Whether minification runs an external program.
    pub fn is_external(&self) -> bool {
        matches!(
            self,
            Self::Preset(MinifyPreset::Cleancss) | Self::Command { .. }
        )
    }

    fn validate(&self, field: &str, diag: &mut ConfigDiagnostics) {
        let Self::Command { command } = self else {
            return;
        };
        if command.first().is_none_or(|p| p.trim().is_empty()) {
            diag.error(field, "command must start with a program name");
        } else if !command.iter().any(|a| a.contains(OUTPUT_PLACEHOLDER)) {
            diag.error_with_hint(
                field,
                format!("command never mentions {OUTPUT_PLACEHOLDER}"),
                format!(
                    "the minifier must write to {OUTPUT_PLACEHOLDER}, e.g. [\"tool\", \"{INPUT_PLACEHOLDER}\", \"-o\", \"{OUTPUT_PLACEHOLDER}\"]"
                ),
            );
        }
    }
}

// ============================================================================
// Defaults
// ============================================================================

/// The stock pipelines: minified CSS, static embeds, and the material database.
pub fn default_pipelines() -> Vec<PipelineConfig> {
    vec![
        PipelineConfig {
            name: "compress_css".into(),
            source_dir: "embed".into(),
            output_dir: ".pio/embed".into(),
            record_dir: None,
            minify: MinifySetting::Preset(MinifyPreset::Cleancss),
            files: vec!["toastify.css".into()],
        },
        PipelineConfig {
            name: "compress_embed".into(),
            source_dir: "embed".into(),
            output_dir: ".pio/embed".into(),
            record_dir: None,
            minify: MinifySetting::default(),
            files: [
                "logo_captive.svg",
                "logo_thingy.svg",
                "logo_webserial.svg",
                "apple-touch-icon.png",
                "favicon.svg",
                "favicon.ico",
                "icon_96.png",
                "icon_192.png",
                "icon_512.png",
                "toastify.min.js",
            ]
            .map(String::from)
            .to_vec(),
        },
        PipelineConfig {
            name: "compress_db".into(),
            source_dir: "assets".into(),
            output_dir: "data".into(),
            record_dir: Some(".pio/assets".into()),
            minify: MinifySetting::default(),
            files: vec!["material_database.json".into()],
        },
    ]
}
