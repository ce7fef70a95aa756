//! `[gzip]` section configuration.
//!
//! # Example
//!
//! ```toml
//! [gzip]
//! level = 9    # 0 (store) ..= 9 (smallest)
//! ```

use serde::Deserialize;

use crate::asset::DEFAULT_LEVEL;
use crate::config::ConfigDiagnostics;

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct GzipConfig {
    /// Compression level applied to every artifact.
    pub level: u32,
}

impl Default for GzipConfig {
    fn default() -> Self {
        Self {
            level: DEFAULT_LEVEL,
        }
    }
}

impl GzipConfig {
    pub fn validate(&self, diag: &mut ConfigDiagnostics) {
        if self.level > 9 {
            diag.error_with_hint(
                "gzip.level",
                format!("level {} is out of range", self.level),
                "use a value between 0 and 9",
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_level_range() {
        let mut diag = ConfigDiagnostics::new();
        GzipConfig { level: 9 }.validate(&mut diag);
        GzipConfig { level: 0 }.validate(&mut diag);
        assert!(diag.is_empty());

        GzipConfig { level: 10 }.validate(&mut diag);
        assert_eq!(diag.len(), 1);
    }
}
