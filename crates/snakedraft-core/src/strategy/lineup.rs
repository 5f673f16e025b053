// Per-team policy assignment from a strategy string such as "AHHHOHHHHHHH".

use std::fmt;
use std::sync::Arc;

use rand_distr::Exp;

use crate::draft::player::Player;
use crate::draft::state::{DraftOrder, PoolOrder};
use crate::draft::DraftError;
use crate::rules::Rules;
use crate::score::Scorer;

use super::humanoid::{reach_distribution, DEFAULT_LAMBDA};
use super::{Autopick, Board, DraftRng, Humanoid, Optimize, RolloutPolicies, Strategy};

/// Which policy runs a team.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Manager {
    Autopick,
    Humanoid,
    Optimize,
}

impl Manager {
    pub fn from_letter(c: char) -> Option<Self> {
        match c.to_ascii_uppercase() {
            'A' => Some(Manager::Autopick),
            'H' => Some(Manager::Humanoid),
            'O' => Some(Manager::Optimize),
            _ => None,
        }
    }

    pub fn letter(self) -> char {
        match self {
            Manager::Autopick => 'A',
            Manager::Humanoid => 'H',
            Manager::Optimize => 'O',
        }
    }
}

/// Lookahead settings used when a team is run by [`Manager::Optimize`].
#[derive(Clone)]
pub struct OptimizeSettings {
    pub order: Arc<DraftOrder>,
    pub scorer: Arc<Scorer>,
    pub num_trials: usize,
    pub candidates_per_position: usize,
}

/// One manager per team, plus what it takes to build their policies.
///
/// As rollout policies, optimizing teams are modeled as humanoids: nesting
/// a lookahead inside a lookahead is too expensive, and a humanoid is the
/// closest cheap stand-in for a drafter who mostly follows consensus.
#[derive(Debug, Clone)]
pub struct Lineup {
    managers: Vec<Manager>,
    rules: Arc<Rules>,
    catalog: Arc<Vec<Arc<Player>>>,
    reach: Exp<f64>,
    autopick_pool: PoolOrder,
    personal_boards: bool,
}

impl Lineup {
    pub fn parse(
        strategies: &str,
        rules: Arc<Rules>,
        catalog: Arc<Vec<Arc<Player>>>,
    ) -> Result<Self, DraftError> {
        let managers = strategies
            .chars()
            .filter(|c| !c.is_whitespace())
            .map(|c| {
                Manager::from_letter(c).ok_or_else(|| DraftError::InvalidParameter {
                    name: "strategies",
                    message: format!("unknown strategy letter '{c}' (expected A, H or O)"),
                })
            })
            .collect::<Result<Vec<_>, _>>()?;
        if managers.is_empty() {
            return Err(DraftError::InvalidParameter {
                name: "strategies",
                message: "no teams".into(),
            });
        }
        Ok(Lineup {
            managers,
            rules,
            catalog,
            reach: reach_distribution(DEFAULT_LAMBDA)?,
            autopick_pool: PoolOrder::Value,
            personal_boards: true,
        })
    }

    pub fn with_lambda(mut self, lambda: f64) -> Result<Self, DraftError> {
        self.reach = reach_distribution(lambda)?;
        Ok(self)
    }

    pub fn with_autopick_pool(mut self, pool: PoolOrder) -> Self {
        self.autopick_pool = pool;
        self
    }

    /// Give each humanoid its own jittered ADP board (on by default).
    pub fn with_personal_boards(mut self, on: bool) -> Self {
        self.personal_boards = on;
        self
    }

    pub fn managers(&self) -> &[Manager] {
        &self.managers
    }

    pub fn num_teams(&self) -> usize {
        self.managers.len()
    }

    fn humanoid(&self, rng: &mut DraftRng) -> Humanoid {
        let board = self
            .personal_boards
            .then(|| Board::perturbed(&self.catalog, rng));
        Humanoid::from_parts(Arc::clone(&self.rules), self.reach, board)
    }

    fn cheap_policy(&self, manager: Manager, rng: &mut DraftRng) -> Box<dyn Strategy> {
        match manager {
            Manager::Autopick => Box::new(Autopick::new(Arc::clone(&self.rules), self.autopick_pool)),
            Manager::Humanoid | Manager::Optimize => Box::new(self.humanoid(rng)),
        }
    }

    /// Policies for the draft being reported on, optimizers included.
    pub fn policies(
        self: &Arc<Self>,
        settings: &OptimizeSettings,
        rng: &mut DraftRng,
    ) -> Result<Vec<Box<dyn Strategy>>, DraftError> {
        self.managers
            .iter()
            .map(|&manager| match manager {
                Manager::Optimize => {
                    let rollouts: Arc<dyn RolloutPolicies> = Arc::clone(self) as Arc<dyn RolloutPolicies>;
                    let optimize = Optimize::new(
                        Arc::clone(&settings.order),
                        rollouts,
                        Arc::clone(&settings.scorer),
                        settings.num_trials,
                    )?
                    .with_candidates_per_position(settings.candidates_per_position);
                    Ok(Box::new(optimize) as Box<dyn Strategy>)
                }
                other => Ok(self.cheap_policy(other, rng)),
            })
            .collect()
    }
}

impl RolloutPolicies for Lineup {
    fn build(&self, rng: &mut DraftRng) -> Vec<Box<dyn Strategy>> {
        self.managers
            .iter()
            .map(|&manager| self.cheap_policy(manager, rng))
            .collect()
    }
}

impl fmt::Display for Lineup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for manager in &self.managers {
            write!(f, "{}", manager.letter())?;
        }
        Ok(())
    }
}
