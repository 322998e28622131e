use crate::config::GameConfig;
use crate::grid::{CellCoord, GridMapper, LatLng};
use crate::ledger::{Player, TokenLedger};
use crate::memento::{CellMemento, MementoStore};
use crate::oracle::{LuckOracle, SpawnOracle};
use crate::presenter::Presenter;
use crate::time::now_unix_secs;
use crate::window::{VisibilityWindow, WindowDiff};

/// Result of a player interaction with a cell.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Interaction {
    /// Token value moved from the cache to the player.
    Took { amount: u64 },
    /// As `Took`, and the carried value hit the win threshold exactly.
    Won { amount: u64 },
    /// The carried token was deposited; the cache now holds `tokens`.
    Combined { tokens: u64 },
    /// The rules refused the interaction. Nothing changed.
    Unchanged,
    /// The cell has no active cache representation.
    Ignored,
}

impl Interaction {
    pub fn changed_state(&self) -> bool {
        matches!(
            self,
            Interaction::Took { .. } | Interaction::Won { .. } | Interaction::Combined { .. }
        )
    }
}

/// One game session: every piece of world and player state, owned in one
/// place and driven by presentation events.
pub struct World<P: Presenter, O: SpawnOracle = LuckOracle> {
    mapper: GridMapper,
    oracle: O,
    ledger: TokenLedger,
    store: MementoStore,
    window: VisibilityWindow<P::Handle>,
    player: Player,
    presenter: P,
}

impl<P: Presenter> World<P, LuckOracle> {
    pub fn from_config(config: &GameConfig, store: MementoStore, presenter: P) -> Self {
        Self::new(config, config.oracle(), store, presenter)
    }
}

impl<P: Presenter, O: SpawnOracle> World<P, O> {
    /// Build a session with the player at the configured origin.
    /// Nothing is visible until [`World::start`] or the first move.
    pub fn new(config: &GameConfig, oracle: O, store: MementoStore, presenter: P) -> Self {
        Self {
            mapper: config.mapper(),
            oracle,
            ledger: config.ledger(),
            store,
            window: VisibilityWindow::new(config.window()),
            player: Player::new(config.origin()),
            presenter,
        }
    }

    /// Replace the player, e.g. with one loaded from a save slot.
    /// Takes effect for the window on the next pass.
    pub fn with_player(mut self, player: Player) -> Self {
        self.player = player;
        self
    }

    /// Run the first window pass at the player's position.
    pub fn start(&mut self) -> WindowDiff {
        self.on_player_move(self.player.position)
    }

    pub fn on_player_move(&mut self, position: LatLng) -> WindowDiff {
        self.player.position = position;
        let cell = self.mapper.to_cell(position);
        let diff = self
            .window
            .update(cell, &self.oracle, &mut self.store, &mut self.presenter);
        if diff.created > 0 {
            self.store.persist();
        }
        diff
    }

    /// Move by whole tiles: `dx` east, `dy` north.
    pub fn step(&mut self, dx: i32, dy: i32) -> WindowDiff {
        let tile = self.mapper.tile_degrees();
        let pos = self.player.position;
        self.on_player_move(LatLng::new(
            pos.lat + dy as f64 * tile,
            pos.lng + dx as f64 * tile,
        ))
    }

    /// Click semantics: combine when carrying a token, otherwise take.
    pub fn on_cell_clicked(&mut self, cell: CellCoord) -> Interaction {
        if self.player.has_token {
            self.combine(cell)
        } else {
            self.take(cell)
        }
    }

    pub fn take(&mut self, cell: CellCoord) -> Interaction {
        self.interact(cell, |ledger, player, memento| {
            let eligible = !player.has_token && !memento.taken;
            let amount = ledger.take(player, memento, now_unix_secs());
            if !eligible {
                Interaction::Unchanged
            } else if ledger.is_win(player) {
                Interaction::Won { amount }
            } else {
                Interaction::Took { amount }
            }
        })
    }

    pub fn combine(&mut self, cell: CellCoord) -> Interaction {
        self.interact(cell, |ledger, player, memento| {
            if ledger.combine(player, memento) {
                Interaction::Combined {
                    tokens: memento.tokens,
                }
            } else {
                Interaction::Unchanged
            }
        })
    }

    /// Apply `op` to the memento of an active cell, then persist and notify
    /// the presenter before returning if anything changed.
    fn interact(
        &mut self,
        cell: CellCoord,
        op: impl FnOnce(&TokenLedger, &mut Player, &mut CellMemento) -> Interaction,
    ) -> Interaction {
        if !self.window.is_active(cell) {
            tracing::debug!("ignoring interaction with inactive cell {cell}");
            return Interaction::Ignored;
        }
        let Some(memento) = self.store.get_mut(cell) else {
            tracing::warn!("active cell {cell} has no memento");
            return Interaction::Ignored;
        };
        let outcome = op(&self.ledger, &mut self.player, memento);
        let snapshot = *memento;
        if outcome.changed_state() {
            tracing::info!("{cell}: {outcome:?}");
            self.store.persist();
            self.presenter.cache_state_changed(cell, &snapshot);
        }
        outcome
    }

    /// Status panel text.
    pub fn status_line(&self) -> String {
        if self.player.has_token {
            format!("You have a token of value {}.", self.player.carried)
        } else {
            "You don't have a token.".to_string()
        }
    }

    pub fn current_cell(&self) -> CellCoord {
        self.mapper.to_cell(self.player.position)
    }

    /// Active caches and their mementos, in cell order.
    pub fn visible_caches(&self) -> Vec<(CellCoord, CellMemento)> {
        self.window
            .active_cells()
            .into_iter()
            .filter_map(|cell| self.store.get(cell).map(|m| (cell, *m)))
            .collect()
    }

    pub fn memento(&self, cell: CellCoord) -> Option<&CellMemento> {
        self.store.get(cell)
    }

    pub fn player(&self) -> &Player {
        &self.player
    }

    pub fn mapper(&self) -> &GridMapper {
        &self.mapper
    }

    pub fn oracle(&self) -> &O {
        &self.oracle
    }

    pub fn ledger(&self) -> &TokenLedger {
        &self.ledger
    }

    pub fn store(&self) -> &MementoStore {
        &self.store
    }

    pub fn window(&self) -> &VisibilityWindow<P::Handle> {
        &self.window
    }

    pub fn presenter(&self) -> &P {
        &self.presenter
    }

    pub fn presenter_mut(&mut self) -> &mut P {
        &mut self.presenter
    }

    /// Hide everything and hand back the durable parts.
    pub fn into_parts(mut self) -> (MementoStore, Player, P) {
        self.window.clear(&mut self.presenter);
        (self.store, self.player, self.presenter)
    }
}
