// Simulation setup and the two top-level runs: a full draft and a
// recommendation for the team on the clock.
//
// `Simulation` owns everything a run needs (initial state, order, rules,
// scorer, lineup). It is built once from config plus loaded files and can be
// run any number of times with different seeds.

use std::path::Path;
use std::sync::Arc;

use thiserror::Error;
use tracing::{debug, info};

use crate::config::{Config, ConfigError};
use crate::data::order::load_order;
use crate::data::players::load_players;
use crate::data::rules::load_rules;
use crate::data::LoadError;
use crate::draft::player::PlayerRecord;
use crate::draft::state::{DraftOrder, PickSlot, State};
use crate::draft::{run_draft, DraftError};
use crate::report::{DraftReport, Recommendation};
use crate::rules::Rules;
use crate::score::Scorer;
use crate::strategy::{seeded_rng, Lineup, Optimize, OptimizeSettings, RolloutPolicies};

#[derive(Debug, Error)]
pub enum SetupError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Load(#[from] LoadError),

    #[error(transparent)]
    Draft(#[from] DraftError),
}

/// A configured draft, ready to run.
pub struct Simulation {
    state: State,
    order: Arc<DraftOrder>,
    scorer: Arc<Scorer>,
    lineup: Arc<Lineup>,
    num_trials: usize,
    candidates_per_position: usize,
}

impl Simulation {
    /// Load the files named in `config` (relative to `base_dir`) and build.
    pub fn load(config: &Config, base_dir: &Path) -> Result<Self, SetupError> {
        let paths = &config.data_paths;
        let records = load_players(
            &base_dir.join(&paths.players),
            config.strategy.scoring.valuation,
        )?;
        let order = paths
            .order
            .as_ref()
            .map(|p| load_order(&base_dir.join(p)))
            .transpose()?;
        let rules = paths
            .rules
            .as_ref()
            .map(|p| load_rules(&base_dir.join(p)))
            .transpose()?;
        Simulation::build(config, records, order, rules)
    }

    /// Build from already-loaded inputs. Without an order, a snake order of
    /// one round per roster slot is used. Without a rule table, rules are
    /// computed per lookup; a loaded table falls back to computing any row
    /// it lacks.
    pub fn build(
        config: &Config,
        records: Vec<PlayerRecord>,
        order: Option<DraftOrder>,
        rules: Option<Rules>,
    ) -> Result<Self, SetupError> {
        config.validate()?;
        let schema = config.schema()?;
        let autopick = config.autopick_limits()?;
        let humanoid = config.humanoid_limits()?;
        let num_teams = config.num_teams();

        let order = order.unwrap_or_else(|| DraftOrder::snake(num_teams, schema.len()));
        let (state, order) = State::new(records, num_teams, &order)?;

        let rules = Arc::new(match rules {
            Some(table) => table.with_fallback(&schema, autopick, humanoid),
            None => Rules::on_demand(&schema, autopick, humanoid),
        });

        let scorer = Arc::new(
            Scorer::new(schema, config.strategy.scoring.bench).with_bench_weights(config.bench_weights()?),
        );

        let humanoid_cfg = &config.strategy.humanoid;
        let lineup = Lineup::parse(&config.league.strategies, Arc::clone(&rules), Arc::clone(state.catalog()))?
            .with_lambda(humanoid_cfg.lambda)?
            .with_autopick_pool(config.strategy.autopick.pool)
            .with_personal_boards(humanoid_cfg.personal_boards);

        info!(
            "league '{}': {} teams, {} picks, schema {}, strategies {}",
            config.league.name,
            num_teams,
            order.last_pick(),
            scorer.schema(),
            lineup
        );

        Ok(Simulation {
            state,
            order: Arc::new(order),
            scorer,
            lineup: Arc::new(lineup),
            num_trials: config.strategy.simulation.num_trials,
            candidates_per_position: config.strategy.simulation.candidates_per_position,
        })
    }

    pub fn state(&self) -> &State {
        &self.state
    }

    pub fn order(&self) -> &DraftOrder {
        &self.order
    }

    pub fn scorer(&self) -> &Scorer {
        &self.scorer
    }

    pub fn lineup(&self) -> &Lineup {
        &self.lineup
    }

    fn optimize_settings(&self) -> OptimizeSettings {
        OptimizeSettings {
            order: Arc::clone(&self.order),
            scorer: Arc::clone(&self.scorer),
            num_trials: self.num_trials,
            candidates_per_position: self.candidates_per_position,
        }
    }

    /// Run the whole draft from the initial state under the configured
    /// lineup.
    pub fn run(&self, seed: u64) -> Result<(State, DraftReport), DraftError> {
        let mut rng = seeded_rng(seed);
        let policies = self.lineup.policies(&self.optimize_settings(), &mut rng)?;
        let mut state = self.state.clone();
        run_draft(&mut state, &self.order, &policies, &mut rng)?;
        state.verify_partition()?;
        let report = DraftReport::new(&state, &self.lineup, &self.scorer, seed);
        info!("draft complete after pick {}", self.order.last_pick());
        Ok((state, report))
    }

    /// Rank the candidates for the team that owns the current pick.
    pub fn recommend(&self, seed: u64) -> Result<Recommendation, DraftError> {
        let pick = self.state.pick();
        let team = match self.order.get(pick) {
            Some(PickSlot::Team(team)) => team,
            _ => {
                return Err(DraftError::DraftOver {
                    last_pick: self.order.last_pick(),
                })
            }
        };
        let rollouts: Arc<dyn RolloutPolicies> = Arc::clone(&self.lineup) as Arc<dyn RolloutPolicies>;
        let optimize = Optimize::new(
            Arc::clone(&self.order),
            rollouts,
            Arc::clone(&self.scorer),
            self.num_trials,
        )?
        .with_candidates_per_position(self.candidates_per_position);

        debug!("recommending for team {} at pick {}", team, pick);
        let mut rng = seeded_rng(seed);
        let candidates = optimize.candidates(&self.state, team, &mut rng)?;
        Ok(Recommendation::new(&self.state, team, &candidates, seed))
    }
}
