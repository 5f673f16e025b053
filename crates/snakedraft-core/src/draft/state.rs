// Draft state: teams, undrafted pools, and the pick cursor.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use serde::Deserialize;
use tracing::debug;

use super::player::{Player, PlayerId, PlayerRecord};
use super::team::Team;
use super::DraftError;

/// Justification recorded for players seeded onto a roster before the draft.
pub const KEEPER_JUSTIFICATION: &str = "*** KEEPER ***";

// ---------------------------------------------------------------------------
// Draft order
// ---------------------------------------------------------------------------

/// Who owns a pick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PickSlot {
    /// Index into `State::teams`.
    Team(usize),
    /// Already resolved by a keeper; the draft skips it.
    Keeper,
}

/// Pick order, 1-based.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DraftOrder {
    slots: Vec<PickSlot>,
}

impl DraftOrder {
    /// Build an order from the owning team index of each pick, starting at
    /// pick 1.
    pub fn from_teams(teams: Vec<usize>) -> Self {
        DraftOrder {
            slots: teams.into_iter().map(PickSlot::Team).collect(),
        }
    }

    /// A snake order: direction reverses every round.
    pub fn snake(num_teams: usize, rounds: usize) -> Self {
        let teams = (0..rounds)
            .flat_map(|round| {
                (0..num_teams).map(move |i| if round % 2 == 1 { num_teams - i - 1 } else { i })
            })
            .collect();
        DraftOrder::from_teams(teams)
    }

    pub fn get(&self, pick: usize) -> Option<PickSlot> {
        pick.checked_sub(1).and_then(|i| self.slots.get(i)).copied()
    }

    /// Number of the final pick (equals the number of picks).
    pub fn last_pick(&self) -> usize {
        self.slots.len()
    }

    fn mark_keeper(&mut self, pick: usize) {
        if let Some(slot) = pick.checked_sub(1).and_then(|i| self.slots.get_mut(i)) {
            *slot = PickSlot::Keeper;
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (usize, PickSlot)> + '_ {
        self.slots.iter().enumerate().map(|(i, s)| (i + 1, *s))
    }
}

// ---------------------------------------------------------------------------
// Pools
// ---------------------------------------------------------------------------

/// Which undrafted pool a policy scans.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PoolOrder {
    /// Valuation, highest first.
    Value,
    /// ADP, lowest first.
    Adp,
}

// ---------------------------------------------------------------------------
// State
// ---------------------------------------------------------------------------

/// The mutable simulation state.
///
/// Every player is either in both undrafted pools or on exactly one team.
/// Cloning copies the teams and pools but shares the player metadata, so
/// branching a hypothetical continuation is cheap.
#[derive(Debug, Clone)]
pub struct State {
    teams: Vec<Team>,
    by_value: Vec<Arc<Player>>,
    by_adp: Vec<Arc<Player>>,
    drafted: HashSet<PlayerId>,
    catalog: Arc<Vec<Arc<Player>>>,
    pick: usize,
}

impl State {
    /// Build the initial state.
    ///
    /// Records with a non-zero pick are keepers: they are placed on the team
    /// that owns that pick in `order`, and the pick is marked as resolved in
    /// the returned order. The cursor starts at the first pick that is not
    /// a keeper.
    pub fn new(
        records: Vec<PlayerRecord>,
        num_teams: usize,
        order: &DraftOrder,
    ) -> Result<(State, DraftOrder), DraftError> {
        for (pick, slot) in order.iter() {
            if let PickSlot::Team(team) = slot {
                if team >= num_teams {
                    return Err(DraftError::UnknownTeam { pick, team, num_teams });
                }
            }
        }

        let mut seen: HashSet<PlayerId> = HashSet::new();
        let mut keepers: HashMap<usize, Arc<Player>> = HashMap::new();
        let mut catalog: Vec<Arc<Player>> = Vec::with_capacity(records.len());

        for record in records {
            if !seen.insert(record.player.id) {
                return Err(DraftError::DuplicatePlayer { id: record.player.id });
            }
            let player = Arc::new(record.player);
            if record.pick != 0 {
                if record.pick > order.last_pick() {
                    return Err(DraftError::KeeperOutsideOrder {
                        pick: record.pick,
                        name: player.name.clone(),
                        last_pick: order.last_pick(),
                    });
                }
                if let Some(existing) = keepers.get(&record.pick) {
                    return Err(DraftError::DuplicateKeeperPick {
                        pick: record.pick,
                        first: existing.name.clone(),
                        second: player.name.clone(),
                    });
                }
                keepers.insert(record.pick, Arc::clone(&player));
            }
            catalog.push(player);
        }

        let mut teams: Vec<Team> = (0..num_teams).map(|_| Team::new()).collect();
        let mut drafted = HashSet::new();
        let mut order = order.clone();

        let mut keeper_picks: Vec<usize> = keepers.keys().copied().collect();
        keeper_picks.sort_unstable();
        for pick in keeper_picks {
            let player = &keepers[&pick];
            // Range-checked above; the slot is a team until marked here.
            if let Some(PickSlot::Team(team)) = order.get(pick) {
                teams[team].add(Arc::clone(player), pick, KEEPER_JUSTIFICATION);
                drafted.insert(player.id);
                order.mark_keeper(pick);
                debug!("keeper {} seeded to team {} at pick {}", player.name, team, pick);
            }
        }

        let mut by_value: Vec<Arc<Player>> = catalog
            .iter()
            .filter(|p| !drafted.contains(&p.id))
            .cloned()
            .collect();
        let mut by_adp = by_value.clone();
        by_value.sort_by(|a, b| b.value.total_cmp(&a.value));
        by_adp.sort_by(|a, b| a.adp.total_cmp(&b.adp));

        let pick = (1..=order.last_pick())
            .find(|&p| order.get(p) != Some(PickSlot::Keeper))
            .unwrap_or(order.last_pick() + 1);

        let state = State {
            teams,
            by_value,
            by_adp,
            drafted,
            catalog: Arc::new(catalog),
            pick,
        };
        Ok((state, order))
    }

    pub fn teams(&self) -> &[Team] {
        &self.teams
    }

    pub fn team(&self, index: usize) -> Option<&Team> {
        self.teams.get(index)
    }

    /// Undrafted players by valuation, highest first.
    pub fn by_value(&self) -> &[Arc<Player>] {
        &self.by_value
    }

    /// Undrafted players by ADP, lowest first.
    pub fn by_adp(&self) -> &[Arc<Player>] {
        &self.by_adp
    }

    pub fn pool(&self, order: PoolOrder) -> &[Arc<Player>] {
        match order {
            PoolOrder::Value => &self.by_value,
            PoolOrder::Adp => &self.by_adp,
        }
    }

    /// Every player, drafted or not, in input order.
    pub fn catalog(&self) -> &Arc<Vec<Arc<Player>>> {
        &self.catalog
    }

    /// The pick currently on the clock.
    pub fn pick(&self) -> usize {
        self.pick
    }

    pub fn advance(&mut self) {
        self.pick += 1;
    }

    pub fn is_drafted(&self, id: PlayerId) -> bool {
        self.drafted.contains(&id)
    }

    pub fn is_complete(&self, order: &DraftOrder) -> bool {
        self.pick > order.last_pick()
    }

    /// Draft `player` onto `team` at the current pick: append to the roster
    /// and remove from both pools. Does not move the cursor.
    pub fn draft(
        &mut self,
        team: usize,
        player: &Arc<Player>,
        justification: impl Into<String>,
    ) -> Result<(), DraftError> {
        if team >= self.teams.len() {
            return Err(DraftError::UnknownTeam {
                pick: self.pick,
                team,
                num_teams: self.teams.len(),
            });
        }
        if self.drafted.contains(&player.id) {
            return Err(DraftError::AlreadyDrafted {
                id: player.id,
                name: player.name.clone(),
                pick: self.pick,
            });
        }
        let by_value = self.by_value.iter().position(|p| p.id == player.id);
        let by_adp = self.by_adp.iter().position(|p| p.id == player.id);
        let (Some(i), Some(j)) = (by_value, by_adp) else {
            return Err(DraftError::NotInPool {
                id: player.id,
                name: player.name.clone(),
            });
        };
        self.by_value.remove(i);
        self.by_adp.remove(j);
        self.drafted.insert(player.id);
        self.teams[team].add(Arc::clone(player), self.pick, justification);
        Ok(())
    }

    /// Check that every catalog player is in both pools exactly once or on
    /// exactly one team, and nowhere else.
    pub fn verify_partition(&self) -> Result<(), DraftError> {
        let mut placements: HashMap<PlayerId, usize> = HashMap::new();
        for team in &self.teams {
            for p in team.players_by_value() {
                *placements.entry(p.player.id).or_default() += 1;
            }
        }
        let mut pooled: HashMap<PlayerId, usize> = HashMap::new();
        for p in &self.by_value {
            *placements.entry(p.id).or_default() += 1;
            *pooled.entry(p.id).or_default() += 1;
        }
        for p in &self.by_adp {
            *pooled.entry(p.id).or_default() += 1;
        }

        for player in self.catalog.iter() {
            let placed = placements.get(&player.id).copied().unwrap_or(0);
            if placed != 1 {
                return Err(DraftError::Partition(format!(
                    "player {} ({}) placed {} times",
                    player.id, player.name, placed
                )));
            }
            let pooled = pooled.get(&player.id).copied().unwrap_or(0);
            let drafted = self.drafted.contains(&player.id);
            if (drafted && pooled != 0) || (!drafted && pooled != 2) {
                return Err(DraftError::Partition(format!(
                    "player {} ({}) drafted={} but appears in pools {} times",
                    player.id, player.name, drafted, pooled
                )));
            }
        }
        let total: usize = placements.values().sum();
        if total != self.catalog.len() || placements.len() != self.catalog.len() {
            return Err(DraftError::Partition(format!(
                "{} placements for {} players",
                total,
                self.catalog.len()
            )));
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
