// Snake draft simulator entry point.
//
// Startup sequence:
// 1. Initialize tracing (log to stderr, results go to stdout)
// 2. Load config, apply command-line overrides
// 3. Load player/order/rule files and build the simulation
// 4. Run the requested command
// 5. Print the result as text or JSON

use std::fs::File;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{bail, Context};
use clap::{Parser, Subcommand};
use serde::Serialize;
use tracing::info;

use snakedraft_core::config::{self, Config};
use snakedraft_core::data::players::{check_picks, load_players};
use snakedraft_core::data::rules::write_rules;
use snakedraft_core::draft::player::DraftedPlayer;
use snakedraft_core::draft::state::KEEPER_JUSTIFICATION;
use snakedraft_core::rules::Rules;
use snakedraft_core::simulation::Simulation;

#[derive(Parser)]
#[command(name = "snakedraft", about = "Fantasy football snake draft simulator")]
struct Args {
    /// Directory holding config/ and the data files it names.
    #[arg(long, default_value = ".")]
    base_dir: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a whole draft and score every team.
    Sim {
        #[command(flatten)]
        run: RunArgs,

        /// Count the bench when scoring.
        #[arg(long)]
        bench: Option<bool>,
    },
    /// Rank candidates for the team on the clock.
    Opt {
        #[command(flatten)]
        run: RunArgs,

        /// Player table to recommend from (keepers mark picks already made).
        #[arg(long)]
        players: Option<PathBuf>,
    },
    /// Generate the rule table for the configured schema.
    Rules {
        /// Output file; stdout when omitted.
        #[arg(long)]
        out: Option<PathBuf>,
    },
    /// Check the keeper picks in a player table.
    Check {
        /// Player table CSV.
        players: PathBuf,
    },
}

#[derive(clap::Args)]
struct RunArgs {
    /// RNG seed; 0 draws a fresh one.
    #[arg(long)]
    seed: Option<u64>,

    /// Rollouts per candidate.
    #[arg(long)]
    trials: Option<usize>,

    /// One strategy letter per team (A, H or O).
    #[arg(long)]
    strategies: Option<String>,

    /// Print JSON instead of text.
    #[arg(long)]
    json: bool,
}

impl RunArgs {
    fn apply(&self, config: &mut Config) {
        if let Some(seed) = self.seed {
            config.strategy.simulation.seed = seed;
        }
        if let Some(trials) = self.trials {
            config.strategy.simulation.num_trials = trials;
        }
        if let Some(strategies) = &self.strategies {
            config.league.strategies = strategies.clone();
        }
    }
}

fn main() -> anyhow::Result<()> {
    // 1. Initialize tracing
    init_tracing()?;
    let args = Args::parse();

    // 2. Load config
    let mut config = config::load_config(&args.base_dir).context("failed to load configuration")?;
    info!(
        "Config loaded: league={}, {} teams, schema {}",
        config.league.name,
        config.num_teams(),
        config.league.schema
    );

    match args.command {
        Commands::Sim { run, bench } => {
            run.apply(&mut config);
            if let Some(bench) = bench {
                config.strategy.scoring.bench = bench;
            }
            let sim = build(&config, &args.base_dir)?;
            let seed = resolve_seed(config.strategy.simulation.seed);

            // 4. Run the draft
            let (_, report) = sim.run(seed).context("draft failed")?;
            emit(&report, run.json)
        }
        Commands::Opt { run, players } => {
            run.apply(&mut config);
            if let Some(players) = players {
                config.data_paths.players = players.display().to_string();
            }
            let sim = build(&config, &args.base_dir)?;
            let seed = resolve_seed(config.strategy.simulation.seed);

            // 4. Rank candidates
            let rec = sim.recommend(seed).context("recommendation failed")?;
            if let Some(best) = rec.best() {
                info!("best pick for team {}: {} {}", rec.team, best.tag, best.name);
            }
            emit(&rec, run.json)
        }
        Commands::Rules { out } => {
            config.validate().context("invalid configuration")?;
            let schema = config.schema()?;
            let rules = Rules::generate(&schema, config.autopick_limits()?, config.humanoid_limits()?);
            info!("generated {} rule rows for schema {}", rules.len(), schema);
            match out {
                Some(path) => {
                    let file = File::create(&path)
                        .with_context(|| format!("failed to create {}", path.display()))?;
                    write_rules(&rules, file).context("failed to write rule table")?;
                }
                None => write_rules(&rules, io::stdout().lock()).context("failed to write rule table")?,
            }
            Ok(())
        }
        Commands::Check { players } => check(&players, &config),
    }
}

// 3. Load data and build the simulation
fn build(config: &Config, base_dir: &Path) -> anyhow::Result<Simulation> {
    Simulation::load(config, base_dir).context("failed to set up the draft")
}

fn resolve_seed(seed: u64) -> u64 {
    let seed = if seed == 0 { rand::random() } else { seed };
    info!("seed {}", seed);
    seed
}

// 5. Print results
fn emit<T: Serialize + std::fmt::Display>(value: &T, json: bool) -> anyhow::Result<()> {
    let mut out = io::stdout().lock();
    if json {
        let text = serde_json::to_string_pretty(value).context("failed to serialize result")?;
        writeln!(out, "{text}")?;
    } else {
        write!(out, "{value}")?;
    }
    Ok(())
}

fn check(path: &Path, config: &Config) -> anyhow::Result<()> {
    let records = load_players(path, config.strategy.scoring.valuation)
        .with_context(|| format!("failed to load {}", path.display()))?;
    let result = check_picks(&records);

    let mut out = io::stdout().lock();
    for record in &result.keepers {
        let drafted = DraftedPlayer {
            player: Arc::new(record.player.clone()),
            pick: record.pick,
            justification: KEEPER_JUSTIFICATION.to_string(),
        };
        writeln!(out, "{drafted}")?;
    }
    for problem in &result.problems {
        writeln!(out, "*** {problem}")?;
    }

    if !result.is_clean() {
        bail!("{} problem(s) in {}", result.problems.len(), path.display());
    }
    Ok(())
}

fn init_tracing() -> anyhow::Result<()> {
    use tracing_subscriber::fmt;
    use tracing_subscriber::EnvFilter;

    let subscriber = fmt::Subscriber::builder()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("snakedraft=info,snakedraft_core=info,warn")),
        )
        .with_writer(io::stderr)
        .with_ansi(false)
        .with_target(true)
        .with_thread_ids(true)
        .with_line_number(true)
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .context("failed to set tracing subscriber")?;

    Ok(())
}
