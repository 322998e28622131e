use std::path::Path;

use rusqlite::{Connection, OptionalExtension, params};

use geocache_core::{Backing, CellMemento, Player, WorldError, decode_records};

use crate::error::{Result, StoreError};
use crate::schema;

const PLAYER_KEY: &str = "player";

/// Summary of what the player has done to the world so far.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct MementoStats {
    pub total: usize,
    pub taken: usize,
    pub tokens_remaining: u64,
}

/// SQLite-backed durable store: the memento records plus a metadata table
/// holding the schema version and the player's save slot.
pub struct Store {
    conn: Connection,
}

impl Store {
    pub fn open(path: &Path) -> Result<Self> {
        let conn = Connection::open(path)?;
        schema::initialize(&conn)?;
        Ok(Self { conn })
    }

    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        schema::initialize(&conn)?;
        Ok(Self { conn })
    }

    pub fn conn(&self) -> &Connection {
        &self.conn
    }

    // --- Metadata ---

    pub fn get_metadata(&self, key: &str) -> Result<Option<String>> {
        let value = self
            .conn
            .query_row("SELECT value FROM metadata WHERE key = ?1", [key], |row| {
                row.get(0)
            })
            .optional()?;
        Ok(value)
    }

    pub fn set_metadata(&self, key: &str, value: &str) -> Result<()> {
        self.conn.execute(
            "INSERT OR REPLACE INTO metadata (key, value) VALUES (?1, ?2)",
            params![key, value],
        )?;
        Ok(())
    }

    // --- Memento records ---

    /// All records in insertion order.
    pub fn read_records(&self) -> Result<Vec<(String, String)>> {
        let mut stmt = self
            .conn
            .prepare("SELECT key, value FROM mementos ORDER BY rowid")?;
        let records = stmt
            .query_map([], |row| Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?)))?
            .collect::<std::result::Result<_, _>>()?;
        Ok(records)
    }

    /// Replace every record in one transaction.
    pub fn write_records(&self, records: &[(String, String)]) -> Result<()> {
        let tx = self.conn.unchecked_transaction()?;
        replace_records(&tx, records)?;
        tx.commit()?;
        Ok(())
    }

    /// Replace every record and, when given, the player slot, all or nothing.
    pub fn replace_world(&self, records: &[(String, String)], player: Option<&Player>) -> Result<()> {
        let tx = self.conn.unchecked_transaction()?;
        replace_records(&tx, records)?;
        if let Some(player) = player {
            write_player(&tx, player)?;
        }
        tx.commit()?;
        Ok(())
    }

    pub fn load_mementos(&self) -> Result<Vec<(geocache_core::CellCoord, CellMemento)>> {
        let records = self.read_records()?;
        let mementos = decode_records(&records)
            .map_err(|e| StoreError::InvalidData(e.to_string()))?;
        Ok(mementos.into_iter().collect())
    }

    pub fn memento_stats(&self) -> Result<MementoStats> {
        let mementos = self.load_mementos()?;
        Ok(MementoStats {
            total: mementos.len(),
            taken: mementos.iter().filter(|(_, m)| m.taken).count(),
            tokens_remaining: mementos
                .iter()
                .fold(0u64, |acc, (_, m)| acc.saturating_add(m.tokens)),
        })
    }

    // --- Player save slot ---

    pub fn save_player(&self, player: &Player) -> Result<()> {
        write_player(&self.conn, player)
    }

    /// The saved player, or `None` if there is none or it no longer parses.
    pub fn load_player(&self) -> Result<Option<Player>> {
        let Some(json) = self.get_metadata(PLAYER_KEY)? else {
            return Ok(None);
        };
        match serde_json::from_str(&json) {
            Ok(player) => Ok(Some(player)),
            Err(e) => {
                tracing::warn!("ignoring unreadable player slot: {e}");
                Ok(None)
            }
        }
    }

    /// Forget every memento and the player slot.
    pub fn clear(&self) -> Result<()> {
        let tx = self.conn.unchecked_transaction()?;
        tx.execute("DELETE FROM mementos", [])?;
        tx.execute("DELETE FROM metadata WHERE key = ?1", [PLAYER_KEY])?;
        tx.commit()?;
        tracing::info!("cleared world state");
        Ok(())
    }
}

fn replace_records(conn: &Connection, records: &[(String, String)]) -> Result<()> {
    conn.execute("DELETE FROM mementos", [])?;
    let mut stmt = conn.prepare("INSERT OR REPLACE INTO mementos (key, value) VALUES (?1, ?2)")?;
    for (key, value) in records {
        stmt.execute(params![key, value])?;
    }
    Ok(())
}

fn write_player(conn: &Connection, player: &Player) -> Result<()> {
    let json = serde_json::to_string(player)
        .map_err(|e| StoreError::InvalidData(format!("player: {e}")))?;
    conn.execute(
        "INSERT OR REPLACE INTO metadata (key, value) VALUES (?1, ?2)",
        params![PLAYER_KEY, json],
    )?;
    Ok(())
}

impl Backing for Store {
    fn read_all(&self) -> geocache_core::Result<Vec<(String, String)>> {
        self.read_records().map_err(WorldError::from)
    }

    fn write_all(&self, records: &[(String, String)]) -> geocache_core::Result<()> {
        self.write_records(records).map_err(WorldError::from)
    }
}

#[cfg(test)]
mod tests {
    use std::rc::Rc;

    use super::*;
    use geocache_core::{CellCoord, LatLng, MementoStore};

    fn memento(tokens: u64, taken: bool) -> CellMemento {
        CellMemento {
            visited: true,
            taken,
            tokens,
            last_taken_at: taken.then_some(1_792_153_805),
        }
    }

    #[test]
    fn test_memento_store_roundtrip_through_sqlite() {
        let store = Rc::new(Store::open_in_memory().unwrap());

        let mut mementos = MementoStore::restore(Rc::clone(&store));
        mementos.set(CellCoord::new(2, 1), memento(0, true));
        mementos.set(CellCoord::new(-1, -1), memento(9, false));
        mementos.persist();

        let restored = MementoStore::restore(Rc::clone(&store));
        let before: Vec<_> = mementos.iter().map(|(c, m)| (c, *m)).collect();
        let after: Vec<_> = restored.iter().map(|(c, m)| (c, *m)).collect();
        assert_eq!(before, after);
    }

    #[test]
    fn test_write_replaces_all_records() {
        let store = Store::open_in_memory().unwrap();
        store
            .write_records(&[("a".into(), "1".into()), ("b".into(), "2".into())])
            .unwrap();
        store.write_records(&[("c".into(), "3".into())]).unwrap();

        assert_eq!(store.read_records().unwrap(), vec![("c".to_string(), "3".to_string())]);
    }

    #[test]
    fn test_read_preserves_write_order() {
        let store = Store::open_in_memory().unwrap();
        let records: Vec<(String, String)> = vec![
            ("version".into(), "1".into()),
            ("5,5".into(), "x".into()),
            ("-9,0".into(), "y".into()),
        ];
        store.write_records(&records).unwrap();
        assert_eq!(store.read_records().unwrap(), records);
    }

    #[test]
    fn test_corrupt_row_restores_empty() {
        let store = Rc::new(Store::open_in_memory().unwrap());
        store
            .write_records(&[("0,0".into(), "garbage".into())])
            .unwrap();

        let mementos = MementoStore::restore(Rc::clone(&store));
        assert!(mementos.is_empty());
        assert!(store.memento_stats().is_err());
    }

    #[test]
    fn test_memento_stats() {
        let store = Rc::new(Store::open_in_memory().unwrap());
        let mut mementos = MementoStore::restore(Rc::clone(&store));
        mementos.set(CellCoord::new(0, 1), memento(0, true));
        mementos.set(CellCoord::new(0, 2), memento(4, false));
        mementos.set(CellCoord::new(0, 3), memento(6, false));
        mementos.persist();

        assert_eq!(
            store.memento_stats().unwrap(),
            MementoStats {
                total: 3,
                taken: 1,
                tokens_remaining: 10
            }
        );
    }

    #[test]
    fn test_memento_stats_saturate_on_huge_caches() {
        let store = Store::open_in_memory().unwrap();
        store
            .import_json_str(
                r#"{"version": 1, "cells": [
                    {"key": "0,0", "visited": true, "taken": false, "tokens": 18446744073709551615, "lastTakenAt": null},
                    {"key": "1,0", "visited": true, "taken": false, "tokens": 18446744073709551615, "lastTakenAt": null}
                ]}"#,
            )
            .unwrap();

        let stats = store.memento_stats().unwrap();
        assert_eq!(stats.total, 2);
        assert_eq!(stats.tokens_remaining, u64::MAX);
    }

    #[test]
    fn test_player_slot() {
        let store = Store::open_in_memory().unwrap();
        assert!(store.load_player().unwrap().is_none());

        let player = Player {
            position: LatLng::new(36.5, -122.25),
            carried: 7,
            has_token: true,
        };
        store.save_player(&player).unwrap();
        assert_eq!(store.load_player().unwrap(), Some(player));
    }

    #[test]
    fn test_unreadable_player_slot_is_none() {
        let store = Store::open_in_memory().unwrap();
        store.set_metadata("player", "{broken").unwrap();
        assert!(store.load_player().unwrap().is_none());
    }

    #[test]
    fn test_clear() {
        let store = Store::open_in_memory().unwrap();
        store.write_records(&[("0,0".into(), "{}".into())]).unwrap();
        store.save_player(&Player::new(LatLng::new(0.0, 0.0))).unwrap();

        store.clear().unwrap();
        assert!(store.read_records().unwrap().is_empty());
        assert!(store.load_player().unwrap().is_none());
        assert!(store.get_metadata("schema_version").unwrap().is_some());
    }

    #[test]
    fn test_metadata() {
        let store = Store::open_in_memory().unwrap();
        assert!(store.get_metadata("foo").unwrap().is_none());
        store.set_metadata("foo", "bar").unwrap();
        assert_eq!(store.get_metadata("foo").unwrap(), Some("bar".to_string()));
    }

    #[test]
    fn test_file_store_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("world.db");
        {
            let store = Rc::new(Store::open(&path).unwrap());
            let mut mementos = MementoStore::restore(Rc::clone(&store));
            mementos.set(CellCoord::new(3, 3), memento(0, true));
            mementos.persist();
        }
        let store = Store::open(&path).unwrap();
        let loaded = store.load_mementos().unwrap();
        assert_eq!(loaded, vec![(CellCoord::new(3, 3), memento(0, true))]);
    }
}
