use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{Result, StoreError};
use crate::store::Store;

/// Default base directory for all geocache storage.
pub fn default_base_dir() -> PathBuf {
    dirs_home().join(".geocache")
}

fn dirs_home() -> PathBuf {
    env::var("HOME")
        .or_else(|_| env::var("USERPROFILE"))
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("."))
}

pub fn db_path(base: &Path) -> PathBuf {
    base.join("world.db")
}

pub fn config_path(base: &Path) -> PathBuf {
    base.join("config.toml")
}

/// Open (creating if needed) the world database under `base`.
///
/// Layout:
/// ```text
/// <base>/
/// ├── world.db
/// └── config.toml   (optional)
/// ```
pub fn open_data_dir(base: &Path) -> Result<Store> {
    fs::create_dir_all(base).map_err(|e| {
        StoreError::InvalidData(format!("failed to create {}: {e}", base.display()))
    })?;
    Store::open(&db_path(base))
}
