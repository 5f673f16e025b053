// Configuration loading and parsing (league.toml, strategy.toml).

use serde::Deserialize;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::data::players::ValuationSource;
use crate::draft::position::{Schema, SchemaError};
use crate::draft::state::PoolOrder;
use crate::rules::eligibility::PolicyLimits;
use crate::score::BenchWeights;
use crate::strategy::Manager;

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("config file not found: {path}")]
    FileNotFound { path: PathBuf },

    #[error("failed to parse config file {path}: {source}")]
    ParseError {
        path: PathBuf,
        source: toml::de::Error,
    },

    #[error("validation error for field `{field}`: {message}")]
    ValidationError { field: String, message: String },

    #[error("failed to initialize config from defaults: {message}")]
    DefaultsCopyError { message: String },
}

fn invalid(field: &str, message: impl Into<String>) -> ConfigError {
    ConfigError::ValidationError {
        field: field.into(),
        message: message.into(),
    }
}

// ---------------------------------------------------------------------------
// Top-level assembled Config
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct Config {
    pub league: LeagueConfig,
    pub rules: RulesConfig,
    pub strategy: StrategyConfig,
    pub data_paths: DataPaths,
}

// ---------------------------------------------------------------------------
// league.toml structs
// ---------------------------------------------------------------------------

/// Raw deserialization target for league.toml.
#[derive(Debug, Clone, Deserialize)]
struct LeagueFile {
    league: LeagueConfig,
    #[serde(default)]
    rules: RulesConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LeagueConfig {
    pub name: String,
    /// Roster-slot codes, e.g. "QRRWWWTXDKBBBBBBBB".
    pub schema: String,
    /// Positions the flex slot (`X`) accepts.
    #[serde(default = "default_flex")]
    pub flex: String,
    /// One letter per team: A (autopick), H (humanoid), O (optimize).
    pub strategies: String,
}

fn default_flex() -> String {
    "RTW".into()
}

#[derive(Debug, Clone, Deserialize)]
pub struct RulesConfig {
    #[serde(default = "LimitsConfig::autopick")]
    pub autopick: LimitsConfig,
    #[serde(default = "LimitsConfig::humanoid")]
    pub humanoid: LimitsConfig,
}

impl Default for RulesConfig {
    fn default() -> Self {
        RulesConfig {
            autopick: LimitsConfig::autopick(),
            humanoid: LimitsConfig::humanoid(),
        }
    }
}

/// Letter strings for one eligibility policy. Empty `min`/`max` mean no
/// constraint.
#[derive(Debug, Clone, Deserialize)]
pub struct LimitsConfig {
    pub priority: String,
    #[serde(default)]
    pub min: String,
    #[serde(default)]
    pub max: String,
}

impl LimitsConfig {
    fn autopick() -> Self {
        LimitsConfig {
            priority: "DKQRTWX".into(),
            min: String::new(),
            max: String::new(),
        }
    }

    fn humanoid() -> Self {
        LimitsConfig {
            priority: "QRWX".into(),
            min: String::new(),
            max: String::new(),
        }
    }

    pub fn limits(&self) -> Result<PolicyLimits, SchemaError> {
        PolicyLimits::parse(&self.priority, &self.min, &self.max)
    }
}

// ---------------------------------------------------------------------------
// strategy.toml structs
// ---------------------------------------------------------------------------

/// Raw deserialization target for the entire strategy.toml file.
#[derive(Debug, Clone, Deserialize)]
struct StrategyFile {
    simulation: SimulationConfig,
    humanoid: HumanoidConfig,
    autopick: AutopickConfig,
    scoring: ScoringConfig,
    data_paths: DataPaths,
}

/// The public strategy config assembled from the strategy.toml sections.
#[derive(Debug, Clone)]
pub struct StrategyConfig {
    pub simulation: SimulationConfig,
    pub humanoid: HumanoidConfig,
    pub autopick: AutopickConfig,
    pub scoring: ScoringConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SimulationConfig {
    /// RNG seed; 0 draws a fresh one per run.
    #[serde(default)]
    pub seed: u64,
    pub num_trials: usize,
    #[serde(default = "default_candidates")]
    pub candidates_per_position: usize,
}

fn default_candidates() -> usize {
    1
}

#[derive(Debug, Clone, Deserialize)]
pub struct HumanoidConfig {
    pub lambda: f64,
    #[serde(default = "default_true")]
    pub personal_boards: bool,
}

fn default_true() -> bool {
    true
}

#[derive(Debug, Clone, Deserialize)]
pub struct AutopickConfig {
    pub pool: PoolOrder,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ScoringConfig {
    pub bench: bool,
    #[serde(default)]
    pub valuation: ValuationSource,
    /// Overrides keyed by slot letter (D K Q R T W X).
    #[serde(default)]
    pub bench_weights: HashMap<String, f64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DataPaths {
    pub players: String,
    /// Draft order CSV. Without one, a snake order is generated from the
    /// team count and roster size.
    #[serde(default)]
    pub order: Option<String>,
    /// Precomputed rule table CSV. Without one, rules are generated.
    #[serde(default)]
    pub rules: Option<String>,
}

// ---------------------------------------------------------------------------
// Derived values
// ---------------------------------------------------------------------------

impl Config {
    pub fn schema(&self) -> Result<Schema, ConfigError> {
        Schema::parse(&self.league.schema, &self.league.flex)
            .map_err(|e| invalid("league.schema", e.to_string()))
    }

    pub fn autopick_limits(&self) -> Result<PolicyLimits, ConfigError> {
        self.rules
            .autopick
            .limits()
            .map_err(|e| invalid("rules.autopick", e.to_string()))
    }

    pub fn humanoid_limits(&self) -> Result<PolicyLimits, ConfigError> {
        self.rules
            .humanoid
            .limits()
            .map_err(|e| invalid("rules.humanoid", e.to_string()))
    }

    pub fn bench_weights(&self) -> Result<BenchWeights, ConfigError> {
        BenchWeights::from_map(&self.strategy.scoring.bench_weights)
            .map_err(|e| invalid("scoring.bench_weights", e.to_string()))
    }

    /// Number of teams, one per strategy letter.
    pub fn num_teams(&self) -> usize {
        self.league.strategies.chars().filter(|c| !c.is_whitespace()).count()
    }

    /// Re-run validation, e.g. after command-line overrides.
    pub fn validate(&self) -> Result<(), ConfigError> {
        validate(self)
    }
}

// ---------------------------------------------------------------------------
// Loading logic
// ---------------------------------------------------------------------------

/// Load and validate configuration from `config/league.toml` and
/// `config/strategy.toml`, relative to the given `base_dir`.
///
/// This is the lower-level loading primitive that does not auto-copy defaults.
/// Prefer `load_config()` which handles default initialization automatically.
pub fn load_config_from(base_dir: &Path) -> Result<Config, ConfigError> {
    let config_dir = base_dir.join("config");

    // --- league.toml (required) ---
    let league_path = config_dir.join("league.toml");
    let league_text = read_file(&league_path)?;
    let league_file: LeagueFile =
        toml::from_str(&league_text).map_err(|e| ConfigError::ParseError {
            path: league_path.clone(),
            source: e,
        })?;

    // --- strategy.toml (required) ---
    let strategy_path = config_dir.join("strategy.toml");
    let strategy_text = read_file(&strategy_path)?;
    let strategy_file: StrategyFile =
        toml::from_str(&strategy_text).map_err(|e| ConfigError::ParseError {
            path: strategy_path.clone(),
            source: e,
        })?;

    let config = Config {
        league: league_file.league,
        rules: league_file.rules,
        strategy: StrategyConfig {
            simulation: strategy_file.simulation,
            humanoid: strategy_file.humanoid,
            autopick: strategy_file.autopick,
            scoring: strategy_file.scoring,
        },
        data_paths: strategy_file.data_paths,
    };

    validate(&config)?;

    Ok(config)
}

/// Ensure all config files exist by copying missing ones from `defaults/`.
/// Returns the list of files that were copied. Skips `.example` files.
pub fn ensure_config_files(base_dir: &Path) -> Result<Vec<PathBuf>, ConfigError> {
    let defaults_dir = base_dir.join("defaults");
    let config_dir = base_dir.join("config");

    if !defaults_dir.exists() {
        if !config_dir.exists() {
            return Err(ConfigError::DefaultsCopyError {
                message: format!(
                    "neither defaults/ nor config/ directory found in {}; \
                     run from the project root or pass --base-dir",
                    base_dir.display()
                ),
            });
        }
        return Ok(vec![]);
    }

    std::fs::create_dir_all(&config_dir).map_err(|e| ConfigError::DefaultsCopyError {
        message: format!("failed to create config directory: {e}"),
    })?;

    let mut copied = Vec::new();

    let entries = std::fs::read_dir(&defaults_dir).map_err(|e| ConfigError::DefaultsCopyError {
        message: format!("failed to read defaults directory: {e}"),
    })?;

    for entry in entries {
        let entry = entry.map_err(|e| ConfigError::DefaultsCopyError {
            message: format!("failed to read defaults entry: {e}"),
        })?;
        let path = entry.path();

        if !path.is_file() {
            continue;
        }
        let Some(file_name) = path.file_name() else {
            continue;
        };
        if file_name.to_str().is_some_and(|n| n.ends_with(".example")) {
            continue;
        }
        let target = config_dir.join(file_name);

        match std::fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&target)
        {
            Ok(mut dest) => {
                let content = std::fs::read(&path).map_err(|e| ConfigError::DefaultsCopyError {
                    message: format!("failed to read {}: {e}", path.display()),
                })?;
                std::io::Write::write_all(&mut dest, &content).map_err(|e| {
                    ConfigError::DefaultsCopyError {
                        message: format!("failed to write {}: {e}", target.display()),
                    }
                })?;
                copied.push(target);
            }
            Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists => {}
            Err(e) => {
                return Err(ConfigError::DefaultsCopyError {
                    message: format!("failed to create {}: {e}", target.display()),
                });
            }
        }
    }

    Ok(copied)
}

/// Copy missing defaults into `base_dir/config/`, then load from there.
pub fn load_config(base_dir: &Path) -> Result<Config, ConfigError> {
    ensure_config_files(base_dir)?;
    load_config_from(base_dir)
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn read_file(path: &Path) -> Result<String, ConfigError> {
    std::fs::read_to_string(path).map_err(|_| ConfigError::FileNotFound {
        path: path.to_path_buf(),
    })
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

fn validate(config: &Config) -> Result<(), ConfigError> {
    // League validations
    config.schema()?;
    if config.num_teams() == 0 {
        return Err(invalid("league.strategies", "must name at least one team"));
    }
    if let Some(c) = config
        .league
        .strategies
        .chars()
        .find(|c| !c.is_whitespace() && Manager::from_letter(*c).is_none())
    {
        return Err(invalid(
            "league.strategies",
            format!("unknown strategy letter '{c}' (expected A, H or O)"),
        ));
    }
    config.autopick_limits()?;
    config.humanoid_limits()?;

    // Strategy validations
    let sim = &config.strategy.simulation;
    if sim.num_trials == 0 {
        return Err(invalid("simulation.num_trials", "must be > 0"));
    }
    if sim.candidates_per_position == 0 {
        return Err(invalid("simulation.candidates_per_position", "must be > 0"));
    }

    let lambda = config.strategy.humanoid.lambda;
    if !(lambda.is_finite() && lambda > 0.0) {
        return Err(invalid("humanoid.lambda", format!("must be > 0, got {lambda}")));
    }

    config.bench_weights()?;
    for (code, weight) in &config.strategy.scoring.bench_weights {
        if !(0.0..=1.0).contains(weight) {
            return Err(invalid(
                &format!("scoring.bench_weights.{code}"),
                format!("must be between 0.0 and 1.0 inclusive, got {weight}"),
            ));
        }
    }

    if config.data_paths.players.trim().is_empty() {
        return Err(invalid("data_paths.players", "must not be empty"));
    }

    Ok(())
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    /// The workspace root, where `defaults/` lives.
    fn project_root() -> PathBuf {
        Path::new(env!("CARGO_MANIFEST_DIR")).join("../..")
    }

    /// A scratch base dir with defaults/ copied in and no config/.
    fn scratch(name: &str) -> PathBuf {
        let tmp = std::env::temp_dir().join(name);
        let _ = fs::remove_dir_all(&tmp);
        fs::create_dir_all(tmp.join("defaults")).unwrap();
        let root = project_root();
        for file in ["league.toml", "strategy.toml"] {
            fs::copy(root.join("defaults").join(file), tmp.join("defaults").join(file)).unwrap();
        }
        tmp
    }

    fn write_config(base: &Path, league: &str, strategy: &str) {
        let dir = base.join("config");
        fs::create_dir_all(&dir).unwrap();
        fs::write(dir.join("league.toml"), league).unwrap();
        fs::write(dir.join("strategy.toml"), strategy).unwrap();
    }

    const STRATEGY: &str = r#"
[simulation]
seed = 7
num_trials = 20

[humanoid]
lambda = 0.36

[autopick]
pool = "value"

[scoring]
bench = true

[data_paths]
players = "data/players.csv"
"#;

    #[test]
    fn load_default_config() {
        let base = scratch("snakedraft_config_defaults");
        let copied = ensure_config_files(&base).unwrap();
        assert_eq!(copied.len(), 2);

        let config = load_config_from(&base).expect("defaults should load");
        assert_eq!(config.league.schema, "QRRWWWTXDKBBBBBBBB");
        assert_eq!(config.league.flex, "RTW");
        assert_eq!(config.num_teams(), 12);
        assert_eq!(config.rules.autopick.priority, "DKQRTWX");
        assert_eq!(config.rules.humanoid.priority, "QRWX");
        assert!((config.strategy.humanoid.lambda - 0.36).abs() < f64::EPSILON);
        assert!(config.strategy.humanoid.personal_boards);
        assert_eq!(config.strategy.autopick.pool, PoolOrder::Value);
        assert_eq!(config.strategy.scoring.valuation, ValuationSource::Value);
        assert!(config.strategy.scoring.bench);
        assert_eq!(config.schema().unwrap().len(), 18);
        assert!(config.data_paths.rules.is_none());

        // A second call copies nothing.
        assert!(ensure_config_files(&base).unwrap().is_empty());
    }

    #[test]
    fn load_config_copies_then_loads() {
        let base = scratch("snakedraft_config_autocopy");
        let config = load_config(&base).unwrap();
        assert!(base.join("config/league.toml").exists());
        assert!(config.strategy.simulation.num_trials > 0);
    }

    #[test]
    fn rules_section_is_optional() {
        let base = std::env::temp_dir().join("snakedraft_config_no_rules");
        let _ = fs::remove_dir_all(&base);
        write_config(
            &base,
            "[league]\nname = \"x\"\nschema = \"QRWB\"\nstrategies = \"AH\"\n",
            STRATEGY,
        );
        let config = load_config_from(&base).unwrap();
        assert_eq!(config.league.flex, "RTW");
        assert_eq!(config.rules.autopick.priority, "DKQRTWX");
        assert_eq!(config.strategy.simulation.candidates_per_position, 1);
        assert_eq!(config.strategy.simulation.seed, 7);
    }

    #[test]
    fn missing_file_is_reported() {
        let base = std::env::temp_dir().join("snakedraft_config_missing");
        let _ = fs::remove_dir_all(&base);
        fs::create_dir_all(&base).unwrap();
        let err = load_config_from(&base).unwrap_err();
        assert!(matches!(err, ConfigError::FileNotFound { .. }));
        assert!(matches!(
            ensure_config_files(&base),
            Err(ConfigError::DefaultsCopyError { .. })
        ));
    }

    #[test]
    fn malformed_toml_is_a_parse_error() {
        let base = std::env::temp_dir().join("snakedraft_config_parse");
        let _ = fs::remove_dir_all(&base);
        write_config(&base, "[league\nname = ", STRATEGY);
        let err = load_config_from(&base).unwrap_err();
        match err {
            ConfigError::ParseError { path, .. } => assert!(path.ends_with("league.toml")),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn bad_values_name_the_field() {
        let cases: &[(&str, &str, &str)] = &[
            ("schema = \"QRZB\"", "AH", "league.schema"),
            ("schema = \"QRWB\"", "AHZ", "league.strategies"),
            ("schema = \"QRWB\"", "", "league.strategies"),
        ];
        for (i, (schema, strategies, field)) in cases.iter().enumerate() {
            let base = std::env::temp_dir().join(format!("snakedraft_config_bad_{i}"));
            let _ = fs::remove_dir_all(&base);
            let league = format!("[league]\nname = \"x\"\n{schema}\nstrategies = \"{strategies}\"\n");
            write_config(&base, &league, STRATEGY);
            match load_config_from(&base).unwrap_err() {
                ConfigError::ValidationError { field: f, .. } => assert_eq!(&f, field),
                other => panic!("unexpected error: {other}"),
            }
        }

        let base = std::env::temp_dir().join("snakedraft_config_bad_lambda");
        let _ = fs::remove_dir_all(&base);
        write_config(
            &base,
            "[league]\nname = \"x\"\nschema = \"QRWB\"\nstrategies = \"AH\"\n",
            &STRATEGY.replace("lambda = 0.36", "lambda = 0.0"),
        );
        match load_config_from(&base).unwrap_err() {
            ConfigError::ValidationError { field, .. } => assert_eq!(field, "humanoid.lambda"),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn bench_weight_out_of_range_is_rejected() {
        let base = std::env::temp_dir().join("snakedraft_config_bad_weight");
        let _ = fs::remove_dir_all(&base);
        let strategy = STRATEGY.replace("bench = true", "bench = true\nbench_weights = { K = 1.5 }");
        write_config(
            &base,
            "[league]\nname = \"x\"\nschema = \"QRWB\"\nstrategies = \"AH\"\n",
            &strategy,
        );
        match load_config_from(&base).unwrap_err() {
            ConfigError::ValidationError { field, .. } => assert_eq!(field, "scoring.bench_weights.K"),
            other => panic!("unexpected error: {other}"),
        }
    }
}
