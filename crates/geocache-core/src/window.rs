//! Visibility window: which cells currently have a live representation.
//!
//! Each cell moves Unrealized → Active → Unrealized as the player comes and
//! goes. Activation happens inside `visible_radius`; deactivation beyond
//! `visible_radius + despawn_buffer`. Existence draws for the surrounding
//! `visible_radius + prefetch_radius` square are memoized so a one-tile
//! move only consults the oracle for the newly exposed edge.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::constants::{DESPAWN_BUFFER, PREFETCH_RADIUS, VISIBLE_RADIUS};
use crate::grid::CellCoord;
use crate::memento::MementoStore;
use crate::oracle::{CacheBaseline, SpawnOracle};
use crate::presenter::Presenter;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct WindowConfig {
    pub visible_radius: i32,
    pub prefetch_radius: i32,
    pub despawn_buffer: i32,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            visible_radius: VISIBLE_RADIUS,
            prefetch_radius: PREFETCH_RADIUS,
            despawn_buffer: DESPAWN_BUFFER,
        }
    }
}

impl WindowConfig {
    fn visible(&self) -> i32 {
        self.visible_radius.max(0)
    }

    fn decision_radius(&self) -> i32 {
        self.visible() + self.prefetch_radius.max(0)
    }

    fn despawn_radius(&self) -> i32 {
        self.visible() + self.despawn_buffer.max(0)
    }
}

/// What one window pass changed. Cell lists are sorted.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct WindowDiff {
    pub shown: Vec<CellCoord>,
    pub hidden: Vec<CellCoord>,
    /// Mementos created for first-time realizations.
    pub created: usize,
}

impl WindowDiff {
    pub fn is_empty(&self) -> bool {
        self.shown.is_empty() && self.hidden.is_empty()
    }
}

pub struct VisibilityWindow<H> {
    config: WindowConfig,
    center: Option<CellCoord>,
    active: HashMap<CellCoord, H>,
    prefetched: HashMap<CellCoord, bool>,
}

impl<H> std::fmt::Debug for VisibilityWindow<H> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VisibilityWindow")
            .field("config", &self.config)
            .field("center", &self.center)
            .field("active", &self.active.len())
            .field("prefetched", &self.prefetched.len())
            .finish()
    }
}

impl<H> VisibilityWindow<H> {
    pub fn new(config: WindowConfig) -> Self {
        Self {
            config,
            center: None,
            active: HashMap::new(),
            prefetched: HashMap::new(),
        }
    }

    pub fn config(&self) -> WindowConfig {
        self.config
    }

    pub fn center(&self) -> Option<CellCoord> {
        self.center
    }

    pub fn is_active(&self, cell: CellCoord) -> bool {
        self.active.contains_key(&cell)
    }

    pub fn handle(&self, cell: CellCoord) -> Option<&H> {
        self.active.get(&cell)
    }

    pub fn len(&self) -> usize {
        self.active.len()
    }

    pub fn is_empty(&self) -> bool {
        self.active.is_empty()
    }

    /// Active cells in sorted order.
    pub fn active_cells(&self) -> Vec<CellCoord> {
        let mut cells: Vec<_> = self.active.keys().copied().collect();
        cells.sort_unstable();
        cells
    }

    /// Number of memoized existence draws around the centre.
    pub fn prefetched_len(&self) -> usize {
        self.prefetched.len()
    }

    /// Re-centre the window on `center`, activating and tearing down
    /// representations as needed. Re-centring on the same cell is a no-op.
    pub fn update<O, P>(
        &mut self,
        center: CellCoord,
        oracle: &O,
        store: &mut MementoStore,
        presenter: &mut P,
    ) -> WindowDiff
    where
        O: SpawnOracle + ?Sized,
        P: Presenter<Handle = H> + ?Sized,
    {
        if self.center == Some(center) {
            return WindowDiff::default();
        }
        self.center = Some(center);
        self.prefetch(center, oracle);

        let mut diff = WindowDiff::default();

        let despawn = self.config.despawn_radius() as u32;
        diff.hidden = self
            .active
            .keys()
            .copied()
            .filter(|cell| cell.chebyshev(center) > despawn)
            .collect();
        diff.hidden.sort_unstable();
        for cell in &diff.hidden {
            if let Some(handle) = self.active.remove(cell) {
                presenter.cell_became_hidden(handle);
            }
        }

        for cell in center.square(self.config.visible()) {
            let exists = self.prefetched.get(&cell).copied().unwrap_or(false);
            if !exists || self.active.contains_key(&cell) {
                continue;
            }
            let (memento, created) = store.realize(cell, || CacheBaseline {
                exists,
                initial_tokens: oracle.initial_tokens(cell),
            });
            let memento = *memento;
            if created {
                diff.created += 1;
            }
            let handle = presenter.cell_became_visible(cell, &memento);
            self.active.insert(cell, handle);
            diff.shown.push(cell);
        }
        diff.shown.sort_unstable();

        tracing::debug!(
            "window at {center}: +{} -{} ({} active, {} new mementos)",
            diff.shown.len(),
            diff.hidden.len(),
            self.active.len(),
            diff.created
        );
        diff
    }

    /// Memoize existence for the decision square, dropping draws that fell
    /// outside it.
    fn prefetch<O: SpawnOracle + ?Sized>(&mut self, center: CellCoord, oracle: &O) {
        let decision = self.config.decision_radius();
        self.prefetched
            .retain(|cell, _| cell.chebyshev(center) <= decision as u32);
        for cell in center.square(decision) {
            self.prefetched
                .entry(cell)
                .or_insert_with(|| oracle.exists(cell));
        }
    }

    /// Tear down every representation and forget the centre.
    pub fn clear<P: Presenter<Handle = H> + ?Sized>(&mut self, presenter: &mut P) -> Vec<CellCoord> {
        let mut hidden: Vec<_> = self.active.keys().copied().collect();
        hidden.sort_unstable();
        for cell in &hidden {
            if let Some(handle) = self.active.remove(cell) {
                presenter.cell_became_hidden(handle);
            }
        }
        self.center = None;
        self.prefetched.clear();
        hidden
    }
}
