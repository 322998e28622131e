use std::fs;
use std::path::Path;

use geocache_core::{WorldSnapshot, encode_records, export_json, import_json};

use crate::error::{Result, StoreError};
use crate::store::Store;

impl Store {
    /// Snapshot of every persisted memento plus the player slot.
    pub fn snapshot(&self) -> Result<WorldSnapshot> {
        Ok(WorldSnapshot {
            mementos: self.load_mementos()?.into_iter().collect(),
            player: self.load_player()?,
        })
    }

    /// Replace the stored world with `snapshot`.
    pub fn restore_snapshot(&self, snapshot: &WorldSnapshot) -> Result<()> {
        let records = encode_records(&snapshot.mementos)
            .map_err(|e| StoreError::InvalidData(e.to_string()))?;
        self.replace_world(&records, snapshot.player.as_ref())?;
        tracing::info!("restored snapshot with {} mementos", snapshot.mementos.len());
        Ok(())
    }

    /// Import a JSON export file into this store.
    pub fn import_json_file(&self, path: &Path) -> Result<()> {
        let json = fs::read_to_string(path).map_err(|e| {
            StoreError::InvalidData(format!("failed to read {}: {e}", path.display()))
        })?;
        self.import_json_str(&json)
    }

    /// Import a JSON export string into this store.
    pub fn import_json_str(&self, json: &str) -> Result<()> {
        let snapshot = import_json(json).map_err(|e| StoreError::InvalidData(e.to_string()))?;
        self.restore_snapshot(&snapshot)
    }

    /// Export the store contents to a JSON file.
    pub fn export_json_file(&self, path: &Path) -> Result<()> {
        let json = self.export_json_string()?;
        fs::write(path, json).map_err(|e| {
            StoreError::InvalidData(format!("failed to write {}: {e}", path.display()))
        })
    }

    /// Export the store contents as a JSON string.
    pub fn export_json_string(&self) -> Result<String> {
        let snapshot = self.snapshot()?;
        export_json(&snapshot).map_err(|e| StoreError::InvalidData(format!("JSON export failed: {e}")))
    }
}
