// Team rosters accumulated during a draft.

use std::sync::Arc;

use serde::Serialize;

use super::player::{DraftedPlayer, Player};
use super::position::{parse_position_letters, Position};

/// A team's drafted players.
///
/// Players are kept sorted by valuation, highest first; equal valuations stay
/// in the order they were drafted. `position_string` holds one letter per
/// player sorted ascending ("DQRRW") and is the key into the eligibility
/// rule tables.
#[derive(Debug, Clone, Default, Serialize)]
pub struct Team {
    players: Vec<DraftedPlayer>,
    position_string: String,
}

impl Team {
    pub fn new() -> Self {
        Team::default()
    }

    /// Put a drafted copy of `player` on the roster.
    pub fn add(&mut self, player: Arc<Player>, pick: usize, justification: impl Into<String>) {
        let letter = player.position.letter();

        let at = self
            .players
            .iter()
            .position(|p| player.value > p.value())
            .unwrap_or(self.players.len());
        self.players.insert(
            at,
            DraftedPlayer {
                player,
                pick,
                justification: justification.into(),
            },
        );

        let at = self
            .position_string
            .find(|c: char| c > letter)
            .unwrap_or(self.position_string.len());
        self.position_string.insert(at, letter);
    }

    /// Players sorted by valuation descending. Callers should not rely on any
    /// other order.
    pub fn players_by_value(&self) -> &[DraftedPlayer] {
        &self.players
    }

    /// A copy of the roster sorted by pick ascending.
    pub fn players_by_pick(&self) -> Vec<&DraftedPlayer> {
        let mut players: Vec<&DraftedPlayer> = self.players.iter().collect();
        players.sort_by_key(|p| p.pick);
        players
    }

    pub fn position_string(&self) -> &str {
        &self.position_string
    }

    /// The drafted positions in letter order.
    pub fn positions(&self) -> Vec<Position> {
        // The string only ever holds letters written by `add`.
        parse_position_letters(&self.position_string).unwrap_or_default()
    }

    pub fn len(&self) -> usize {
        self.players.len()
    }

    pub fn is_empty(&self) -> bool {
        self.players.is_empty()
    }

    pub fn contains(&self, id: u32) -> bool {
        self.players.iter().any(|p| p.player.id == id)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
