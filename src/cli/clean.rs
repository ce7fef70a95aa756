//! `firmpack clean`: drop artifacts and records so the next run rebuilds.

use anyhow::Result;

use crate::config::PackConfig;
use crate::log;
use crate::pipeline::Pipeline;

/// Remove generated files of the selected pipelines.
pub fn clean_pipelines(config: &PackConfig, names: &[String]) -> Result<usize> {
    let mut total = 0;
    for pipeline in Pipeline::select(config, names)? {
        let removed = pipeline.clean()?;
        if removed > 0 {
            log!(&pipeline.name; "removed {removed} file(s)");
        }
        total += removed;
    }
    Ok(total)
}
