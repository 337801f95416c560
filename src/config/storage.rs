use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Local bookmark store settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Database file (default: `<data_dir>/storyline/storyline.db`)
    pub database_path: Option<PathBuf>,

    /// Drop unbookmarked leftovers every time the app starts (default: false)
    pub sweep_on_start: bool,
}
