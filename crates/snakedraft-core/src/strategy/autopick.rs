// Autopick: the platform's deterministic best-available pick.

use std::sync::Arc;

use crate::draft::state::{PoolOrder, State};
use crate::draft::DraftError;
use crate::rules::{RuleKind, Rules};

use super::{first_in_pool, team_on_clock, DraftRng, Selection, Strategy};

/// Takes the first player in the configured pool whose position the
/// autopick rules allow.
#[derive(Debug, Clone)]
pub struct Autopick {
    rules: Arc<Rules>,
    pool: PoolOrder,
}

impl Autopick {
    pub fn new(rules: Arc<Rules>, pool: PoolOrder) -> Self {
        Autopick { rules, pool }
    }
}

impl Strategy for Autopick {
    fn name(&self) -> &'static str {
        "autopick"
    }

    fn select(&self, state: &State, team: usize, _rng: &mut DraftRng) -> Result<Selection, DraftError> {
        let team = team_on_clock(state, team)?;
        let allowed = self.rules.allowed(RuleKind::Autopick, team.position_string());
        let pool = state.pool(self.pool);

        if let Some(player) = pool.iter().find(|p| allowed.contains(p.position)) {
            return Ok(Selection {
                player: Arc::clone(player),
                justification: format!("autopick {allowed}"),
            });
        }
        Ok(Selection {
            player: first_in_pool(pool, state.pick())?,
            justification: format!("autopick {allowed} (none eligible)"),
        })
    }
}
