//! JSON export/import format.
//!
//! ```json
//! {
//!   "version": 1,
//!   "timestamp": "2026-10-16T12:30:05Z",
//!   "cells": [{"key": "2,1", "visited": true, "taken": true, "tokens": 0, "lastTakenAt": 1792153805}],
//!   "player": {"position": {"lat": 36.5, "lng": -122.25}, "carried": 7, "hasToken": true}
//! }
//! ```

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::constants::MEMENTO_FORMAT_VERSION;
use crate::error::{Result, WorldError};
use crate::grid::CellCoord;
use crate::ledger::Player;
use crate::memento::{CellMemento, MementoStore};
use crate::time::now_iso8601;

#[derive(Serialize, Deserialize, Debug)]
pub struct WireExport {
    pub version: u32,
    #[serde(default)]
    pub timestamp: String,
    pub cells: Vec<WireCell>,
    #[serde(default)]
    pub player: Option<Player>,
}

#[derive(Serialize, Deserialize, Debug)]
pub struct WireCell {
    pub key: String,
    #[serde(flatten)]
    pub memento: CellMemento,
}

/// Everything durable about a world: its mementos and, optionally, the
/// player's save slot.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct WorldSnapshot {
    pub mementos: BTreeMap<CellCoord, CellMemento>,
    pub player: Option<Player>,
}

impl WorldSnapshot {
    pub fn from_store(store: &MementoStore, player: Option<Player>) -> Self {
        Self {
            mementos: store.iter().map(|(cell, m)| (cell, *m)).collect(),
            player,
        }
    }
}

impl WireExport {
    pub fn from_snapshot(snapshot: &WorldSnapshot) -> Self {
        WireExport {
            version: MEMENTO_FORMAT_VERSION,
            timestamp: now_iso8601(),
            cells: snapshot
                .mementos
                .iter()
                .map(|(cell, memento)| WireCell {
                    key: cell.to_string(),
                    memento: *memento,
                })
                .collect(),
            player: snapshot.player,
        }
    }

    pub fn into_snapshot(self) -> Result<WorldSnapshot> {
        if self.version > MEMENTO_FORMAT_VERSION {
            return Err(WorldError::InvalidMementoRecord(format!(
                "export version {} is newer than {MEMENTO_FORMAT_VERSION}",
                self.version
            )));
        }
        let mementos = self
            .cells
            .into_iter()
            .map(|cell| {
                let coord = cell
                    .key
                    .parse::<CellCoord>()
                    .map_err(|e| WorldError::InvalidMementoRecord(e.to_string()))?;
                Ok((coord, cell.memento))
            })
            .collect::<Result<_>>()?;
        Ok(WorldSnapshot {
            mementos,
            player: self.player,
        })
    }
}

/// Export a snapshot to a pretty-printed JSON string.
pub fn export_json(snapshot: &WorldSnapshot) -> serde_json::Result<String> {
    serde_json::to_string_pretty(&WireExport::from_snapshot(snapshot))
}

/// Import a snapshot from JSON.
pub fn import_json(json: &str) -> Result<WorldSnapshot> {
    let wire: WireExport = serde_json::from_str(json)
        .map_err(|e| WorldError::InvalidMementoRecord(format!("invalid JSON: {e}")))?;
    wire.into_snapshot()
}
