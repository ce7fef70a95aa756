//! `firmpack run`: process the selected pipelines.

use anyhow::Result;

use crate::config::PackConfig;
use crate::debug;
use crate::pipeline::{Outcome, Pipeline};

/// Totals over all processed assets.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct RunSummary {
    pub compressed: usize,
    pub skipped: usize,
}

/// Run the pipelines named in `names` (all when empty) in config order.
///
/// The first failing asset aborts the whole run.
pub fn run_pipelines(config: &PackConfig, names: &[String], force: bool) -> Result<RunSummary> {
    let mut summary = RunSummary::default();

    for pipeline in Pipeline::select(config, names)? {
        for outcome in pipeline.run(force)? {
            match outcome {
                Outcome::Skipped => summary.skipped += 1,
                Outcome::Compressed { .. } => summary.compressed += 1,
            }
        }
    }

    debug!(
        "run";
        "{} compressed, {} up to date",
        summary.compressed,
        summary.skipped
    );
    Ok(summary)
}
