// Team scoring: greedy lineup assignment against the roster-slot schema.

use std::collections::HashMap;

use serde::Serialize;

use crate::draft::player::DraftedPlayer;
use crate::draft::position::{Position, Schema, SchemaError, Slot};
use crate::draft::team::Team;

// ---------------------------------------------------------------------------
// Bench weights
// ---------------------------------------------------------------------------

/// Fraction of a bench player's valuation that counts toward the team score,
/// by the slot code the bench spot backs up.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BenchWeights {
    by_position: [f64; 6],
    flex: f64,
}

impl Default for BenchWeights {
    fn default() -> Self {
        let mut by_position = [2.0 / 16.0; 6];
        by_position[Position::Defense.index()] = 1.0 / 16.0;
        by_position[Position::Kicker.index()] = 0.0;
        BenchWeights {
            by_position,
            flex: 0.0,
        }
    }
}

impl BenchWeights {
    /// Override the defaults from a letter-keyed map, e.g. `{"D": 0.0625}`.
    pub fn from_map(map: &HashMap<String, f64>) -> Result<Self, SchemaError> {
        let mut weights = BenchWeights::default();
        for (key, &weight) in map {
            let mut chars = key.trim().chars();
            let (Some(c), None) = (chars.next(), chars.next()) else {
                return Err(SchemaError::UnrecognizedPosition(key.clone()));
            };
            match Slot::from_letter(c) {
                Some(Slot::Starter(pos)) => weights.by_position[pos.index()] = weight,
                Some(Slot::Flex) => weights.flex = weight,
                _ => return Err(SchemaError::UnrecognizedPosition(key.clone())),
            }
        }
        Ok(weights)
    }

    pub fn get(&self, slot: Slot) -> f64 {
        match slot {
            Slot::Starter(pos) => self.by_position[pos.index()],
            Slot::Flex => self.flex,
            Slot::Bench => 0.0,
        }
    }
}

// ---------------------------------------------------------------------------
// Scorer
// ---------------------------------------------------------------------------

/// Where the scorer put a player.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Assignment {
    Starter(Slot),
    Bench(Slot),
    Unused,
}

/// One line of a scored lineup.
#[derive(Debug, Clone, Serialize)]
pub struct ScoredPlayer {
    pub player_id: u32,
    pub assignment: Assignment,
    pub contribution: f64,
}

/// Scores a team by filling its starting lineup with its highest-valued
/// players.
///
/// Each player, best first, takes the first open slot of their own position,
/// then the flex slot if eligible. With bench scoring on, leftover players
/// back up one starter slot each (own position first, then flex) and count at
/// that slot's bench weight. Everyone else counts zero.
#[derive(Debug, Clone)]
pub struct Scorer {
    schema: Schema,
    bench: bool,
    weights: BenchWeights,
}

impl Scorer {
    pub fn new(schema: Schema, bench: bool) -> Self {
        Scorer {
            schema,
            bench,
            weights: BenchWeights::default(),
        }
    }

    pub fn with_bench_weights(mut self, weights: BenchWeights) -> Self {
        self.weights = weights;
        self
    }

    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    pub fn score(&self, team: &Team) -> f64 {
        self.score_players(team.players_by_value())
    }

    /// Score any list of drafted players; the order of `players` is ignored.
    pub fn score_players(&self, players: &[DraftedPlayer]) -> f64 {
        let mut total = 0.0;
        self.assign(players, |_, _, points| total += points);
        total
    }

    /// Per-player lineup assignment, best player first.
    pub fn breakdown(&self, team: &Team) -> Vec<ScoredPlayer> {
        let mut lines = Vec::with_capacity(team.len());
        self.assign(team.players_by_value(), |player, assignment, contribution| {
            lines.push(ScoredPlayer {
                player_id: player.player.id,
                assignment,
                contribution,
            })
        });
        lines
    }

    fn assign<'a>(&self, players: &'a [DraftedPlayer], mut visit: impl FnMut(&'a DraftedPlayer, Assignment, f64)) {
        let mut sorted: Vec<&DraftedPlayer> = players.iter().collect();
        sorted.sort_by(|a, b| b.value().total_cmp(&a.value()));

        let flex = self.schema.flex_eligible();
        let mut start = self.schema.starter_slots();
        let mut bench = self.schema.starter_slots();

        for player in sorted {
            let pos = player.position();
            if let Some(slot) = start.place(pos, flex) {
                visit(player, Assignment::Starter(slot), player.value());
                continue;
            }
            if self.bench {
                if let Some(slot) = bench.place(pos, flex) {
                    visit(player, Assignment::Bench(slot), player.value() * self.weights.get(slot));
                    continue;
                }
            }
            visit(player, Assignment::Unused, 0.0);
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
