// Humanoid: a randomized model of a person drafting roughly by ADP.

use std::sync::Arc;

use rand::Rng;
use rand_distr::{Distribution, Exp, StandardNormal};

use crate::draft::player::Player;
use crate::draft::state::State;
use crate::draft::DraftError;
use crate::rules::{RuleKind, Rules};

use super::{first_in_pool, team_on_clock, DraftRng, Selection, Strategy};

/// Default reach rate: a humanoid skips past about 1/0.36 ≈ 2.8 eligible
/// players on average.
pub const DEFAULT_LAMBDA: f64 = 0.36;

// ---------------------------------------------------------------------------
// Personal board
// ---------------------------------------------------------------------------

/// One drafter's private ordering of the player catalog.
///
/// Each player's ADP is jittered by a normal draw scaled by that player's
/// ADP standard deviation, so different humanoids disagree the way real
/// drafters do.
#[derive(Debug, Clone)]
pub struct Board {
    ranked: Vec<Arc<Player>>,
}

impl Board {
    /// Rank `players` by `adp + N(0,1) * stddev`, lowest first.
    pub fn perturbed<R: Rng + ?Sized>(players: &[Arc<Player>], rng: &mut R) -> Self {
        let mut keyed: Vec<(f64, Arc<Player>)> = players
            .iter()
            .map(|p| {
                let z: f64 = StandardNormal.sample(rng);
                (p.adp + z * p.stddev, Arc::clone(p))
            })
            .collect();
        keyed.sort_by(|a, b| a.0.total_cmp(&b.0));
        Board {
            ranked: keyed.into_iter().map(|(_, p)| p).collect(),
        }
    }

    pub fn players(&self) -> &[Arc<Player>] {
        &self.ranked
    }
}

// ---------------------------------------------------------------------------
// Policy
// ---------------------------------------------------------------------------

/// Draws a reach count `r` from an exponential distribution, then takes the
/// `r`-th (0-based) eligible player in ADP order. Scans a personal board
/// when one is attached, otherwise the shared ADP pool.
#[derive(Debug, Clone)]
pub struct Humanoid {
    rules: Arc<Rules>,
    reach: Exp<f64>,
    board: Option<Board>,
}

impl Humanoid {
    pub fn new(rules: Arc<Rules>, lambda: f64) -> Result<Self, DraftError> {
        Ok(Humanoid {
            rules,
            reach: reach_distribution(lambda)?,
            board: None,
        })
    }

    pub fn with_board(mut self, board: Board) -> Self {
        self.board = Some(board);
        self
    }

    pub(crate) fn from_parts(rules: Arc<Rules>, reach: Exp<f64>, board: Option<Board>) -> Self {
        Humanoid { rules, reach, board }
    }
}

/// Validate `lambda` and build the reach distribution.
pub(crate) fn reach_distribution(lambda: f64) -> Result<Exp<f64>, DraftError> {
    if !(lambda.is_finite() && lambda > 0.0) {
        return Err(DraftError::InvalidParameter {
            name: "lambda",
            message: format!("must be a positive number, got {lambda}"),
        });
    }
    Exp::new(lambda).map_err(|e| DraftError::InvalidParameter {
        name: "lambda",
        message: e.to_string(),
    })
}

impl Strategy for Humanoid {
    fn name(&self) -> &'static str {
        "humanoid"
    }

    fn select(&self, state: &State, team: usize, rng: &mut DraftRng) -> Result<Selection, DraftError> {
        let team = team_on_clock(state, team)?;
        let allowed = self.rules.allowed(RuleKind::Humanoid, team.position_string());
        let reach = self.reach.sample(rng).floor() as usize;

        let found = match &self.board {
            Some(board) => board
                .players()
                .iter()
                .filter(|p| !state.is_drafted(p.id) && allowed.contains(p.position))
                .nth(reach),
            None => state
                .by_adp()
                .iter()
                .filter(|p| allowed.contains(p.position))
                .nth(reach),
        };

        match found {
            Some(player) => Ok(Selection {
                player: Arc::clone(player),
                justification: format!("humanoid {allowed} reached {reach}"),
            }),
            None => Ok(Selection {
                player: first_in_pool(state.by_adp(), state.pick())?,
                justification: format!("humanoid {allowed} reached {reach} (ran out)"),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::draft::player::tests::player;
    use crate::draft::player::PlayerRecord;
    use crate::draft::position::{Position, Schema};
    use crate::draft::state::DraftOrder;
    use crate::rules::eligibility::PolicyLimits;
    use crate::strategy::seeded_rng;

    fn rules() -> Arc<Rules> {
        let schema = Schema::parse("QRWB", "").unwrap();
        Arc::new(Rules::on_demand(
            &schema,
            PolicyLimits::autopick_default(),
            PolicyLimits::humanoid_default(),
        ))
    }

    fn state(n: u32) -> State {
        let positions = [Position::Quarterback, Position::RunningBack, Position::WideReceiver];
        let records = (1..=n)
            .map(|id| PlayerRecord {
                player: (*player(id, positions[id as usize % 3], 500.0 - id as f64, id as f64)).clone(),
                pick: 0,
            })
            .collect();
        State::new(records, 2, &DraftOrder::snake(2, 4)).unwrap().0
    }

    #[test]
    fn rejects_non_positive_lambda() {
        assert!(Humanoid::new(rules(), 0.0).is_err());
        assert!(Humanoid::new(rules(), -1.0).is_err());
        assert!(Humanoid::new(rules(), f64::NAN).is_err());
        assert!(Humanoid::new(rules(), DEFAULT_LAMBDA).is_ok());
    }

    #[test]
    fn large_lambda_takes_first_eligible_by_adp() {
        // With lambda huge the reach is almost surely 0.
        let state = state(12);
        let humanoid = Humanoid::new(rules(), 1e9).unwrap();
        let mut rng = seeded_rng(7);
        for _ in 0..20 {
            let sel = humanoid.select(&state, 0, &mut rng).unwrap();
            assert_eq!(sel.player.id, 1);
            assert!(sel.justification.starts_with("humanoid QRW reached 0"));
        }
    }

    #[test]
    fn always_returns_an_undrafted_player() {
        let mut state = state(12);
        let humanoid = Humanoid::new(rules(), 0.05).unwrap();
        let mut rng = seeded_rng(11);
        for team in [0, 1, 1, 0] {
            let sel = humanoid.select(&state, team, &mut rng).unwrap();
            assert!(!state.is_drafted(sel.player.id));
            state.draft(team, &sel.player, sel.justification).unwrap();
            state.advance();
        }
        state.verify_partition().unwrap();
    }

    #[test]
    fn small_lambda_reaches_past_the_top() {
        let state = state(60);
        let humanoid = Humanoid::new(rules(), 0.05).unwrap();
        let mut rng = seeded_rng(3);
        let reached = (0..50)
            .map(|_| humanoid.select(&state, 0, &mut rng).unwrap().player.id)
            .filter(|&id| id != 1)
            .count();
        assert!(reached > 25, "only {reached} of 50 picks went past the top player");
    }

    #[test]
    fn board_order_is_used_and_drafted_players_skipped() {
        let mut state = state(6);
        let mut ranked: Vec<Arc<Player>> = state.by_adp().to_vec();
        ranked.reverse();
        let humanoid = Humanoid::new(rules(), 1e9)
            .unwrap()
            .with_board(Board { ranked });
        let mut rng = seeded_rng(1);

        let sel = humanoid.select(&state, 0, &mut rng).unwrap();
        assert_eq!(sel.player.id, 6);
        state.draft(0, &sel.player, "").unwrap();
        let sel = humanoid.select(&state, 0, &mut rng).unwrap();
        assert_eq!(sel.player.id, 5);
    }

    #[test]
    fn zero_stddev_board_matches_adp_order() {
        let state = state(10);
        let board = Board::perturbed(state.catalog(), &mut seeded_rng(5));
        let ids: Vec<u32> = board.players().iter().map(|p| p.id).collect();
        assert_eq!(ids, (1..=10).collect::<Vec<_>>());
    }

    #[test]
    fn perturbed_board_is_seed_deterministic() {
        let mut players: Vec<Arc<Player>> = Vec::new();
        for id in 1..=30 {
            let mut p = (*player(id, Position::RunningBack, 100.0, id as f64)).clone();
            p.stddev = 5.0;
            players.push(Arc::new(p));
        }
        let a = Board::perturbed(&players, &mut seeded_rng(9));
        let b = Board::perturbed(&players, &mut seeded_rng(9));
        let ids = |board: &Board| board.players().iter().map(|p| p.id).collect::<Vec<_>>();
        assert_eq!(ids(&a), ids(&b));
        assert_ne!(ids(&a), (1..=30).collect::<Vec<_>>());
    }
}
