//! `firmpack status`: report stale assets without touching the filesystem.

use anyhow::Result;

use crate::config::PackConfig;
use crate::log;
use crate::pipeline::Pipeline;

/// Log one line per asset and return how many would be rebuilt.
pub fn report_status(config: &PackConfig, names: &[String]) -> Result<usize> {
    let mut stale = 0;
    for pipeline in Pipeline::select(config, names)? {
        for (route, freshness) in pipeline.status() {
            if !freshness.is_up_to_date() {
                stale += 1;
            }
            log!(&pipeline.name; "{}: {}", route.name, freshness);
        }
    }
    log!("status"; "{stale} asset(s) need rebuilding");
    Ok(stale)
}
