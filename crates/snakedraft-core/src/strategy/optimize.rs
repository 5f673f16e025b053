// Optimize: Monte-Carlo lookahead over the best player at each position.

use std::sync::Arc;

use rand::Rng;
use rayon::prelude::*;
use serde::Serialize;
use tracing::debug;

use crate::draft::player::Player;
use crate::draft::position::Position;
use crate::draft::state::{DraftOrder, State};
use crate::draft::{run_draft, DraftError};
use crate::score::Scorer;

use super::{seeded_rng, DraftRng, RolloutPolicies, Selection, Strategy};

/// How one candidate fared across its rollouts.
#[derive(Debug, Clone, Serialize)]
pub struct Candidate {
    pub player: Arc<Player>,
    pub mean: f64,
    pub stddev: f64,
    pub trials: usize,
}

/// For each candidate, plays the rest of the draft out `num_trials` times
/// with that candidate taken now and every team run by a freshly drawn
/// rollout policy, then picks the candidate whose final team scored best on
/// average.
///
/// Candidates are the top `per_position` undrafted players by valuation at
/// each position. They are not filtered by eligibility: the lookahead
/// prices a roster imbalance on its own.
///
/// Rollouts run in parallel. Each one gets its own RNG seeded from the
/// caller's, and results are summed in a fixed order, so a seed gives the
/// same answer regardless of thread count.
pub struct Optimize {
    order: Arc<DraftOrder>,
    rollouts: Arc<dyn RolloutPolicies>,
    scorer: Arc<Scorer>,
    num_trials: usize,
    per_position: usize,
}

impl Optimize {
    pub fn new(
        order: Arc<DraftOrder>,
        rollouts: Arc<dyn RolloutPolicies>,
        scorer: Arc<Scorer>,
        num_trials: usize,
    ) -> Result<Self, DraftError> {
        if num_trials == 0 {
            return Err(DraftError::InvalidParameter {
                name: "num_trials",
                message: "must be at least 1".into(),
            });
        }
        Ok(Optimize {
            order,
            rollouts,
            scorer,
            num_trials,
            per_position: 1,
        })
    }

    /// Consider the top `n` players at each position instead of one.
    pub fn with_candidates_per_position(mut self, n: usize) -> Self {
        self.per_position = n.max(1);
        self
    }

    /// The players this policy would weigh at the current pick.
    pub fn candidate_players(&self, state: &State) -> Vec<Arc<Player>> {
        let mut taken = [0usize; Position::ALL.len()];
        let mut players = Vec::new();
        for player in state.by_value() {
            let slot = &mut taken[player.position.index()];
            if *slot < self.per_position {
                *slot += 1;
                players.push(Arc::clone(player));
                if taken.iter().all(|&n| n >= self.per_position) {
                    break;
                }
            }
        }
        players
    }

    /// Evaluate every candidate, best mean first. Ties keep valuation order.
    pub fn candidates(&self, state: &State, team: usize, rng: &mut DraftRng) -> Result<Vec<Candidate>, DraftError> {
        let players = self.candidate_players(state);
        if players.is_empty() {
            return Err(DraftError::PoolExhausted { pick: state.pick() });
        }

        let jobs: Vec<(usize, u64)> = (0..players.len())
            .flat_map(|c| (0..self.num_trials).map(move |_| c))
            .map(|c| (c, rng.gen::<u64>()))
            .collect();

        let scores: Vec<f64> = jobs
            .into_par_iter()
            .map(|(c, seed)| self.rollout(state, team, &players[c], seed))
            .collect::<Result<_, _>>()?;

        let mut candidates: Vec<Candidate> = players
            .into_iter()
            .zip(scores.chunks(self.num_trials))
            .map(|(player, trials)| {
                let (mean, stddev) = mean_stddev(trials);
                Candidate {
                    player,
                    mean,
                    stddev,
                    trials: trials.len(),
                }
            })
            .collect();
        candidates.sort_by(|a, b| b.mean.total_cmp(&a.mean));

        debug!(
            "pick {} team {}: {}",
            state.pick(),
            team,
            justification(&candidates)
        );
        Ok(candidates)
    }

    fn rollout(&self, state: &State, team: usize, player: &Arc<Player>, seed: u64) -> Result<f64, DraftError> {
        let mut rng = seeded_rng(seed);
        let mut branch = state.clone();
        branch.draft(team, player, "")?;
        branch.advance();
        let policies = self.rollouts.build(&mut rng);
        run_draft(&mut branch, &self.order, &policies, &mut rng)?;
        let roster = branch.team(team).ok_or(DraftError::UnknownTeam {
            pick: state.pick(),
            team,
            num_teams: branch.teams().len(),
        })?;
        Ok(self.scorer.score(roster))
    }
}

impl Strategy for Optimize {
    fn name(&self) -> &'static str {
        "optimize"
    }

    fn select(&self, state: &State, team: usize, rng: &mut DraftRng) -> Result<Selection, DraftError> {
        let candidates = self.candidates(state, team, rng)?;
        let justification = justification(&candidates);
        let best = candidates
            .into_iter()
            .next()
            .ok_or(DraftError::PoolExhausted { pick: state.pick() })?;
        Ok(Selection {
            player: best.player,
            justification,
        })
    }
}

/// "R03=1234 Q01=1200 ...", best first.
pub fn justification(candidates: &[Candidate]) -> String {
    candidates
        .iter()
        .map(|c| format!("{}={:.0}", c.player.tag(), c.mean))
        .collect::<Vec<_>>()
        .join(" ")
}

fn mean_stddev(samples: &[f64]) -> (f64, f64) {
    if samples.is_empty() {
        return (0.0, 0.0);
    }
    let n = samples.len() as f64;
    let mean = samples.iter().sum::<f64>() / n;
    if samples.len() < 2 {
        return (mean, 0.0);
    }
    let var = samples.iter().map(|s| (s - mean).powi(2)).sum::<f64>() / (n - 1.0);
    (mean, var.sqrt())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::draft::player::tests::player;
    use crate::draft::player::PlayerRecord;
    use crate::draft::position::Schema;
    use crate::draft::state::PoolOrder;
    use crate::rules::eligibility::PolicyLimits;
    use crate::rules::Rules;
    use crate::strategy::{Autopick, Humanoid};

    struct AllAutopick {
        rules: Arc<Rules>,
        teams: usize,
    }

    impl RolloutPolicies for AllAutopick {
        fn build(&self, _rng: &mut DraftRng) -> Vec<Box<dyn Strategy>> {
            (0..self.teams)
                .map(|_| Box::new(Autopick::new(Arc::clone(&self.rules), PoolOrder::Value)) as Box<dyn Strategy>)
                .collect()
        }
    }

    struct AllHumanoid {
        rules: Arc<Rules>,
        teams: usize,
    }

    impl RolloutPolicies for AllHumanoid {
        fn build(&self, _rng: &mut DraftRng) -> Vec<Box<dyn Strategy>> {
            (0..self.teams)
                .map(|_| {
                    Box::new(Humanoid::new(Arc::clone(&self.rules), 0.36).unwrap()) as Box<dyn Strategy>
                })
                .collect()
        }
    }

    fn schema() -> Schema {
        Schema::parse("QRWB", "").unwrap()
    }

    fn rules() -> Arc<Rules> {
        Arc::new(Rules::generate(
            &schema(),
            PolicyLimits::autopick_default(),
            PolicyLimits::humanoid_default(),
        ))
    }

    /// Two teams, four rounds. The lone elite QB is worth far more than
    /// anything else relative to replacement.
    fn state() -> (State, Arc<DraftOrder>) {
        let specs = [
            (1, Position::RunningBack, 210.0, 1.0),
            (2, Position::RunningBack, 205.0, 2.0),
            (3, Position::WideReceiver, 200.0, 3.0),
            (4, Position::WideReceiver, 195.0, 4.0),
            (5, Position::Quarterback, 208.0, 30.0),
            (6, Position::Quarterback, 40.0, 40.0),
            (7, Position::RunningBack, 150.0, 5.0),
            (8, Position::WideReceiver, 150.0, 6.0),
            (9, Position::RunningBack, 60.0, 50.0),
            (10, Position::WideReceiver, 60.0, 51.0),
        ];
        let records = specs
            .into_iter()
            .map(|(id, pos, value, adp)| PlayerRecord {
                player: (*player(id, pos, value, adp)).clone(),
                pick: 0,
            })
            .collect();
        let (state, order) = State::new(records, 2, &DraftOrder::snake(2, 4)).unwrap();
        (state, Arc::new(order))
    }

    #[test]
    fn one_candidate_per_position_in_value_order() {
        let (state, order) = state();
        let opt = Optimize::new(
            order,
            Arc::new(AllAutopick { rules: rules(), teams: 2 }),
            Arc::new(Scorer::new(schema(), false)),
            1,
        )
        .unwrap();
        let ids: Vec<u32> = opt.candidate_players(&state).iter().map(|p| p.id).collect();
        assert_eq!(ids, vec![1, 5, 3]);

        let two = Optimize::new(
            Arc::new(DraftOrder::snake(2, 4)),
            Arc::new(AllAutopick { rules: rules(), teams: 2 }),
            Arc::new(Scorer::new(schema(), false)),
            1,
        )
        .unwrap()
        .with_candidates_per_position(2);
        let ids: Vec<u32> = two.candidate_players(&state).iter().map(|p| p.id).collect();
        assert_eq!(ids, vec![1, 5, 2, 3, 4, 6]);
    }

    #[test]
    fn zero_trials_is_rejected() {
        let (_, order) = state();
        let err = Optimize::new(
            order,
            Arc::new(AllAutopick { rules: rules(), teams: 2 }),
            Arc::new(Scorer::new(schema(), false)),
            0,
        )
        .err()
        .unwrap();
        assert!(matches!(err, DraftError::InvalidParameter { name: "num_trials", .. }));
    }

    #[test]
    fn lookahead_takes_the_scarce_quarterback() {
        let (state, order) = state();
        let opt = Optimize::new(
            order,
            Arc::new(AllAutopick { rules: rules(), teams: 2 }),
            Arc::new(Scorer::new(schema(), false)),
            1,
        )
        .unwrap();
        // Taking the RB lets the rival's autopick grab the QB at pick 2.
        let candidates = opt.candidates(&state, 0, &mut seeded_rng(1)).unwrap();
        assert_eq!(candidates[0].player.id, 5);
        assert_eq!(candidates[0].mean, 208.0 + 205.0 + 195.0);
        assert_eq!(candidates[1].mean, 210.0 + 200.0 + 40.0);
        assert!(candidates.windows(2).all(|w| w[0].mean >= w[1].mean));
        assert!(candidates.iter().all(|c| c.trials == 1 && c.stddev == 0.0));

        let sel = opt.select(&state, 0, &mut seeded_rng(1)).unwrap();
        assert_eq!(sel.player.id, 5);
        assert!(sel.justification.starts_with("Q01="));
    }

    #[test]
    fn same_seed_same_answer() {
        let (state, order) = state();
        let opt = Optimize::new(
            order,
            Arc::new(AllHumanoid { rules: rules(), teams: 2 }),
            Arc::new(Scorer::new(schema(), true)),
            25,
        )
        .unwrap();
        let a = opt.candidates(&state, 0, &mut seeded_rng(42)).unwrap();
        let b = opt.candidates(&state, 0, &mut seeded_rng(42)).unwrap();
        let key = |cs: &[Candidate]| cs.iter().map(|c| (c.player.id, c.mean)).collect::<Vec<_>>();
        assert_eq!(key(&a), key(&b));
    }

    #[test]
    fn caller_state_is_untouched() {
        let (state, order) = state();
        let opt = Optimize::new(
            order,
            Arc::new(AllHumanoid { rules: rules(), teams: 2 }),
            Arc::new(Scorer::new(schema(), false)),
            5,
        )
        .unwrap();
        opt.select(&state, 0, &mut seeded_rng(3)).unwrap();
        assert_eq!(state.pick(), 1);
        assert_eq!(state.by_value().len(), 10);
        assert!(state.teams().iter().all(|t| t.is_empty()));
    }

    #[test]
    fn sample_stddev() {
        assert_eq!(mean_stddev(&[]), (0.0, 0.0));
        assert_eq!(mean_stddev(&[3.0]), (3.0, 0.0));
        let (mean, sd) = mean_stddev(&[2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0]);
        assert_eq!(mean, 5.0);
        assert!((sd - (32.0f64 / 7.0).sqrt()).abs() < 1e-12);
    }
}
