// Draft data model and the pick-by-pick draft loop.

pub mod player;
pub mod position;
pub mod state;
pub mod team;

use thiserror::Error;
use tracing::trace;

use crate::strategy::{DraftRng, Strategy};
use player::PlayerId;
use state::{DraftOrder, PickSlot, State};

// ---------------------------------------------------------------------------
// Error type
// ---------------------------------------------------------------------------

/// Invariant violations during setup or simulation. Any of these means the
/// state can no longer be trusted, so callers stop rather than continue.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum DraftError {
    #[error("player {id} ({name}) is already drafted (pick {pick})")]
    AlreadyDrafted { id: PlayerId, name: String, pick: usize },

    #[error("player {id} ({name}) is not in the undrafted pool")]
    NotInPool { id: PlayerId, name: String },

    #[error("pick {pick} belongs to team {team}, but there are only {num_teams} teams")]
    UnknownTeam { pick: usize, team: usize, num_teams: usize },

    #[error("no selection policy for team {team}")]
    NoPolicy { team: usize },

    #[error("player id {id} appears more than once")]
    DuplicatePlayer { id: PlayerId },

    #[error("pick {pick} is kept by both {first} and {second}")]
    DuplicateKeeperPick { pick: usize, first: String, second: String },

    #[error("keeper {name} has pick {pick}, past the last pick {last_pick}")]
    KeeperOutsideOrder { pick: usize, name: String, last_pick: usize },

    #[error("no undrafted players left at pick {pick}")]
    PoolExhausted { pick: usize },

    #[error("the draft is over (last pick {last_pick})")]
    DraftOver { last_pick: usize },

    #[error("invalid {name}: {message}")]
    InvalidParameter { name: &'static str, message: String },

    #[error("partition invariant violated: {0}")]
    Partition(String),
}

// ---------------------------------------------------------------------------
// Draft loop
// ---------------------------------------------------------------------------

/// Run the draft from the state's current pick through the last pick in
/// `order`. `policies[i]` selects for team `i`. Keeper picks are skipped.
///
/// Calling this on a finished state does nothing.
pub fn run_draft(
    state: &mut State,
    order: &DraftOrder,
    policies: &[Box<dyn Strategy>],
    rng: &mut DraftRng,
) -> Result<(), DraftError> {
    while !state.is_complete(order) {
        let pick = state.pick();
        let team = match order.get(pick) {
            Some(PickSlot::Team(team)) => team,
            Some(PickSlot::Keeper) | None => {
                state.advance();
                continue;
            }
        };
        let policy = policies.get(team).ok_or(DraftError::NoPolicy { team })?;
        let selection = policy.select(state, team, rng)?;
        trace!(pick, team, player = %selection.player.name, "{}", selection.justification);
        state.draft(team, &selection.player, selection.justification)?;
        state.advance();
    }
    Ok(())
}
