//! Durable per-cell overrides layered over the procedural baseline.
//!
//! Once a cell is realized its memento is the only source of truth for
//! that cell; the baseline is never consulted again.

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::collections::btree_map::Entry;
use std::rc::Rc;

use serde::{Deserialize, Serialize};

use crate::constants::MEMENTO_FORMAT_VERSION;
use crate::error::{Result, WorldError};
use crate::grid::CellCoord;
use crate::oracle::CacheBaseline;

/// Reserved record key carrying the format version.
pub const VERSION_KEY: &str = "version";

/// Player-caused state of one realized cell.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CellMemento {
    pub visited: bool,
    pub taken: bool,
    pub tokens: u64,
    /// Unix seconds of the last successful take.
    pub last_taken_at: Option<u64>,
}

impl CellMemento {
    pub fn from_baseline(baseline: CacheBaseline) -> Self {
        Self {
            visited: true,
            taken: false,
            tokens: baseline.initial_tokens,
            last_taken_at: None,
        }
    }
}

/// A string-keyed blob store that survives restarts.
///
/// Methods take `&self` so one handle can be shared between the memento
/// store and other users of the same storage; implementations provide their
/// own interior mutability.
pub trait Backing {
    fn read_all(&self) -> Result<Vec<(String, String)>>;

    /// Replace everything previously written with `records`.
    fn write_all(&self, records: &[(String, String)]) -> Result<()>;
}

impl<B: Backing + ?Sized> Backing for Rc<B> {
    fn read_all(&self) -> Result<Vec<(String, String)>> {
        (**self).read_all()
    }

    fn write_all(&self, records: &[(String, String)]) -> Result<()> {
        (**self).write_all(records)
    }
}

/// In-process backing. Clones share the same records, so a second store
/// restored from a clone sees what the first one persisted.
#[derive(Clone, Debug, Default)]
pub struct MemoryBacking {
    records: Rc<RefCell<Vec<(String, String)>>>,
}

impl MemoryBacking {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_records(records: Vec<(String, String)>) -> Self {
        Self {
            records: Rc::new(RefCell::new(records)),
        }
    }

    pub fn records(&self) -> Vec<(String, String)> {
        self.records.borrow().clone()
    }
}

impl Backing for MemoryBacking {
    fn read_all(&self) -> Result<Vec<(String, String)>> {
        Ok(self.records.borrow().clone())
    }

    fn write_all(&self, records: &[(String, String)]) -> Result<()> {
        *self.records.borrow_mut() = records.to_vec();
        Ok(())
    }
}

/// Serialize mementos into backing records, version header first.
pub fn encode_records(mementos: &BTreeMap<CellCoord, CellMemento>) -> Result<Vec<(String, String)>> {
    let mut records = Vec::with_capacity(mementos.len() + 1);
    records.push((VERSION_KEY.to_string(), MEMENTO_FORMAT_VERSION.to_string()));
    for (cell, memento) in mementos {
        let json = serde_json::to_string(memento)
            .map_err(|e| WorldError::InvalidMementoRecord(format!("{cell}: {e}")))?;
        records.push((cell.to_string(), json));
    }
    Ok(records)
}

/// Parse backing records. Any bad record rejects the whole set.
/// A missing version header is read as version 1.
pub fn decode_records(records: &[(String, String)]) -> Result<BTreeMap<CellCoord, CellMemento>> {
    let mut mementos = BTreeMap::new();
    for (key, value) in records {
        if key == VERSION_KEY {
            let version: u32 = value.trim().parse().map_err(|_| {
                WorldError::InvalidMementoRecord(format!("bad version tag '{value}'"))
            })?;
            if version > MEMENTO_FORMAT_VERSION {
                return Err(WorldError::InvalidMementoRecord(format!(
                    "format version {version} is newer than {MEMENTO_FORMAT_VERSION}"
                )));
            }
            continue;
        }
        let cell: CellCoord = key
            .parse()
            .map_err(|e| WorldError::InvalidMementoRecord(format!("{e}")))?;
        let memento: CellMemento = serde_json::from_str(value)
            .map_err(|e| WorldError::InvalidMementoRecord(format!("{key}: {e}")))?;
        mementos.insert(cell, memento);
    }
    Ok(mementos)
}

/// In-memory memento map plus the backing it is persisted to.
pub struct MementoStore {
    mementos: BTreeMap<CellCoord, CellMemento>,
    backing: Box<dyn Backing>,
}

impl std::fmt::Debug for MementoStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MementoStore")
            .field("mementos", &self.mementos.len())
            .finish_non_exhaustive()
    }
}

impl MementoStore {
    /// Load everything previously persisted to `backing`.
    ///
    /// Never fails: unreadable storage or a corrupt record leaves the store
    /// empty and the world falls back to its procedural baseline.
    pub fn restore(backing: impl Backing + 'static) -> Self {
        let mementos = match backing.read_all().and_then(|records| decode_records(&records)) {
            Ok(mementos) => {
                tracing::info!("restored {} mementos", mementos.len());
                mementos
            }
            Err(e) => {
                tracing::warn!("discarding persisted mementos: {e}");
                BTreeMap::new()
            }
        };
        Self {
            mementos,
            backing: Box::new(backing),
        }
    }

    pub fn get(&self, cell: CellCoord) -> Option<&CellMemento> {
        self.mementos.get(&cell)
    }

    pub fn get_mut(&mut self, cell: CellCoord) -> Option<&mut CellMemento> {
        self.mementos.get_mut(&cell)
    }

    pub fn set(&mut self, cell: CellCoord, memento: CellMemento) {
        self.mementos.insert(cell, memento);
    }

    pub fn delete(&mut self, cell: CellCoord) -> Option<CellMemento> {
        self.mementos.remove(&cell)
    }

    pub fn contains(&self, cell: CellCoord) -> bool {
        self.mementos.contains_key(&cell)
    }

    pub fn len(&self) -> usize {
        self.mementos.len()
    }

    pub fn is_empty(&self) -> bool {
        self.mementos.is_empty()
    }

    /// Mementos in cell order.
    pub fn iter(&self) -> impl Iterator<Item = (CellCoord, &CellMemento)> {
        self.mementos.iter().map(|(cell, m)| (*cell, m))
    }

    /// The memento for `cell`, created from `baseline` if this is the
    /// first realization. The flag reports whether it was created.
    ///
    /// `baseline` is only evaluated for cells without a memento.
    pub fn realize(
        &mut self,
        cell: CellCoord,
        baseline: impl FnOnce() -> CacheBaseline,
    ) -> (&mut CellMemento, bool) {
        match self.mementos.entry(cell) {
            Entry::Occupied(entry) => (entry.into_mut(), false),
            Entry::Vacant(entry) => {
                let baseline = baseline();
                tracing::debug!("realized {cell} with {} tokens", baseline.initial_tokens);
                (entry.insert(CellMemento::from_baseline(baseline)), true)
            }
        }
    }

    /// Write the full map to the backing store.
    pub fn try_persist(&self) -> Result<()> {
        let records = encode_records(&self.mementos)?;
        self.backing.write_all(&records)
    }

    /// Write the full map to the backing store, logging and swallowing
    /// any failure.
    pub fn persist(&self) {
        match self.try_persist() {
            Ok(()) => tracing::debug!("persisted {} mementos", self.mementos.len()),
            Err(e) => tracing::warn!("failed to persist mementos: {e}"),
        }
    }
}
