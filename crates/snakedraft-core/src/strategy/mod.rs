// Pick-selection policies.
//
// Every policy answers the same question: given the draft so far, which
// undrafted player does the team on the clock take, and why. Randomness
// comes only from the RNG passed in, so a seeded run is reproducible.

pub mod autopick;
pub mod humanoid;
pub mod lineup;
pub mod optimize;

use std::sync::Arc;

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use crate::draft::player::Player;
use crate::draft::state::State;
use crate::draft::team::Team;
use crate::draft::DraftError;

pub use autopick::Autopick;
pub use humanoid::{Board, Humanoid};
pub use lineup::{Lineup, Manager, OptimizeSettings};
pub use optimize::{Candidate, Optimize};

/// The RNG threaded through every simulation.
pub type DraftRng = ChaCha8Rng;

pub fn seeded_rng(seed: u64) -> DraftRng {
    DraftRng::seed_from_u64(seed)
}

/// A policy's choice.
#[derive(Debug, Clone)]
pub struct Selection {
    pub player: Arc<Player>,
    pub justification: String,
}

/// A pick-selection policy.
pub trait Strategy: Send + Sync {
    /// Short name for reports ("autopick", "humanoid", "optimize").
    fn name(&self) -> &'static str;

    /// Choose a player for `team`, which is on the clock at `state.pick()`.
    /// Must return an undrafted player.
    fn select(&self, state: &State, team: usize, rng: &mut DraftRng) -> Result<Selection, DraftError>;
}

/// Builds a fresh set of per-team policies for one rollout. Called once per
/// trial so randomized components (personal ADP boards) are redrawn.
pub trait RolloutPolicies: Send + Sync {
    fn build(&self, rng: &mut DraftRng) -> Vec<Box<dyn Strategy>>;
}

pub(crate) fn team_on_clock(state: &State, team: usize) -> Result<&Team, DraftError> {
    state.team(team).ok_or(DraftError::UnknownTeam {
        pick: state.pick(),
        team,
        num_teams: state.teams().len(),
    })
}

/// The always-legal fallback: the first entry of a pool.
pub(crate) fn first_in_pool(pool: &[Arc<Player>], pick: usize) -> Result<Arc<Player>, DraftError> {
    pool.first().cloned().ok_or(DraftError::PoolExhausted { pick })
}
