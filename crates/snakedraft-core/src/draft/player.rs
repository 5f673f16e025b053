// Player records and their drafted copies.

use std::fmt;
use std::sync::Arc;

use serde::Serialize;

use super::position::Position;

/// Stable player identifier from the projection source.
pub type PlayerId = u32;

/// Immutable player metadata. Shared as `Arc<Player>` between the undrafted
/// pools, team rosters and every simulation branch cloned from them.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Player {
    pub id: PlayerId,
    pub name: String,
    /// NFL team abbreviation.
    pub team: String,
    pub position: Position,
    /// Primary valuation used for sorting and scoring.
    pub value: f64,
    /// Raw projected points.
    pub points: f64,
    pub rank: u32,
    pub position_rank: u32,
    pub adp: f64,
    /// Standard deviation of ADP across reference drafts.
    pub stddev: f64,
    pub ceiling: Option<f64>,
    /// Loaded for reporting only; bye weeks play no part in scoring.
    pub bye: Option<u32>,
}

impl Player {
    /// Short tag such as "R03": position letter and positional rank.
    pub fn tag(&self) -> String {
        format!("{}{:02}", self.position.letter(), self.position_rank)
    }
}

/// One row of the player table: the player plus the pick a keeper was taken
/// with (0 when undrafted).
#[derive(Debug, Clone, PartialEq)]
pub struct PlayerRecord {
    pub player: Player,
    pub pick: usize,
}

/// A player taken in a particular draft: the pick that took them and the
/// reason the selecting policy gave.
#[derive(Debug, Clone, Serialize)]
pub struct DraftedPlayer {
    pub player: Arc<Player>,
    pub pick: usize,
    pub justification: String,
}

impl DraftedPlayer {
    pub fn value(&self) -> f64 {
        self.player.value
    }

    pub fn position(&self) -> Position {
        self.player.position
    }
}

impl fmt::Display for DraftedPlayer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let p = &self.player;
        let bye = p.bye.map(|b| format!("b{b:02}")).unwrap_or_else(|| "b--".into());
        write!(
            f,
            "{:3} {:07} {:3} {:5.1} {:3} {:3} {:7.2} {:<3} {} {:<30} # {}",
            self.pick,
            p.id,
            p.rank,
            p.adp,
            p.position.display_str(),
            p.position_rank,
            p.value,
            p.team,
            bye,
            p.name,
            self.justification
        )
    }
}
