use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::Result;

/// Store behavior switches, loadable from YAML
///
/// ```yaml
/// refresh_on_write: true
/// record_skips: true
/// verify_invariants: false
/// ```
///
/// Missing keys take their defaults; unknown keys are rejected.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct StoreConfig {
    /// Re-fold the log after every successful append
    pub refresh_on_write: bool,
    /// Keep per-entry skip details in the fold report
    pub record_skips: bool,
    /// Check tree invariants after every rebuild
    pub verify_invariants: bool,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            refresh_on_write: true,
            record_skips: true,
            verify_invariants: false,
        }
    }
}

impl StoreConfig {
    pub fn from_yaml(text: &str) -> Result<Self> {
        Ok(serde_yaml_ng::from_str(text)?)
    }

    pub async fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let text = tokio::fs::read_to_string(path).await?;
        Self::from_yaml(&text)
    }
}
