use std::fs;
use std::io::ErrorKind;
use std::path::Path;

use geocache_core::GameConfig;

use crate::error::{Result, StoreError};

/// Load gameplay settings from a TOML file. A missing file means defaults.
pub fn load_config(path: &Path) -> Result<GameConfig> {
    let content = match fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) if e.kind() == ErrorKind::NotFound => {
            tracing::debug!("no config at {}, using defaults", path.display());
            return Ok(GameConfig::default());
        }
        Err(e) => {
            return Err(StoreError::InvalidData(format!(
                "failed to read {}: {e}",
                path.display()
            )));
        }
    };
    toml::from_str(&content)
        .map_err(|e| StoreError::InvalidData(format!("invalid config {}: {e}", path.display())))
}
