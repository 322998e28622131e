use serde::{Deserialize, Serialize};

use crate::constants::WIN_THRESHOLD;
use crate::grid::LatLng;
use crate::memento::CellMemento;

/// The one player of a session.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Player {
    pub position: LatLng,
    pub carried: u64,
    pub has_token: bool,
}

impl Player {
    pub fn new(position: LatLng) -> Self {
        Self {
            position,
            carried: 0,
            has_token: false,
        }
    }
}

/// Rules for moving token value between caches and the player.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TokenLedger {
    win_threshold: u64,
}

impl Default for TokenLedger {
    fn default() -> Self {
        Self::new(WIN_THRESHOLD)
    }
}

impl TokenLedger {
    pub fn new(win_threshold: u64) -> Self {
        Self { win_threshold }
    }

    pub fn win_threshold(&self) -> u64 {
        self.win_threshold
    }

    /// Move the cache's whole value into the player's hand.
    ///
    /// Only an empty-handed player can take, and only from a cache that has
    /// not been taken. Anything else returns 0 and mutates nothing.
    pub fn take(&self, player: &mut Player, memento: &mut CellMemento, now: u64) -> u64 {
        if player.has_token || memento.taken {
            return 0;
        }
        let amount = memento.tokens;
        memento.tokens = 0;
        memento.taken = true;
        memento.last_taken_at = Some(now);
        player.carried = amount;
        player.has_token = true;
        amount
    }

    /// Deposit a carried token whose value matches the cache exactly,
    /// doubling the cache. The grown cache can be taken again.
    ///
    /// Returns whether anything changed; a mismatch is not an error.
    pub fn combine(&self, player: &mut Player, memento: &mut CellMemento) -> bool {
        if !player.has_token || player.carried != memento.tokens {
            return false;
        }
        memento.tokens = memento.tokens.saturating_mul(2);
        memento.taken = false;
        player.carried = 0;
        player.has_token = false;
        true
    }

    pub fn is_win(&self, player: &Player) -> bool {
        player.has_token && player.carried == self.win_threshold
    }
}
