//! Configuration section definitions.
//!
//! Each module corresponds to a section in `firmpack.toml`:
//!
//! | Module     | TOML Section   | Purpose                              |
//! |------------|----------------|--------------------------------------|
//! | `gzip`     | `[gzip]`       | Compression level                    |
//! | `pipeline` | `[[pipeline]]` | Source/output dirs, files, minifier  |

mod gzip;
mod pipeline;

pub use gzip::GzipConfig;
pub use pipeline::{PipelineConfig, default_pipelines, validate_pipelines};

#[cfg(test)]
pub use pipeline::{MinifyPreset, MinifySetting};
