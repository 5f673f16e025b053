// Player table loading and keeper-pick checks.

use std::collections::{BTreeMap, HashSet};
use std::fmt;
use std::io::Read;
use std::path::Path;

use serde::Deserialize;
use tracing::info;

use super::{open, row_number, LoadError};
use crate::draft::player::{Player, PlayerRecord};
use crate::draft::position::Position;

/// Which column feeds `Player::value`, the number the model sorts and
/// scores by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ValuationSource {
    #[default]
    Value,
    Points,
}

// ---------------------------------------------------------------------------
// Raw CSV row (private)
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct RawPlayer {
    pick: usize,
    id: u32,
    name: String,
    position: String,
    team: String,
    value: f64,
    points: f64,
    rank: u32,
    position_rank: u32,
    adp: f64,
    stddev: f64,
    #[serde(default)]
    ceiling: Option<f64>,
    #[serde(default)]
    bye: Option<u32>,
}

// ---------------------------------------------------------------------------
// Loaders
// ---------------------------------------------------------------------------

fn players_from_reader<R: Read>(
    rdr: R,
    path: &str,
    valuation: ValuationSource,
) -> Result<Vec<PlayerRecord>, LoadError> {
    let mut reader = csv::Reader::from_reader(rdr);
    let mut records = Vec::new();
    let mut ids = HashSet::new();

    for (i, result) in reader.deserialize::<RawPlayer>().enumerate() {
        let row = row_number(i);
        let raw = result.map_err(|e| LoadError::Csv {
            path: path.to_string(),
            source: e,
        })?;
        let invalid = |message: String| LoadError::Invalid {
            path: path.to_string(),
            row,
            message,
        };

        let Some(position) = Position::from_str_pos(&raw.position) else {
            return Err(invalid(format!("unknown position '{}'", raw.position)));
        };
        for (field, v) in [
            ("value", raw.value),
            ("points", raw.points),
            ("adp", raw.adp),
            ("stddev", raw.stddev),
        ] {
            if !v.is_finite() {
                return Err(invalid(format!("{field} is not a finite number")));
            }
        }
        if raw.stddev < 0.0 {
            return Err(invalid(format!("stddev must be >= 0, got {}", raw.stddev)));
        }
        if !ids.insert(raw.id) {
            return Err(invalid(format!("duplicate player id {}", raw.id)));
        }

        let value = match valuation {
            ValuationSource::Value => raw.value,
            ValuationSource::Points => raw.points,
        };
        records.push(PlayerRecord {
            player: Player {
                id: raw.id,
                name: raw.name.trim().to_string(),
                team: raw.team.trim().to_string(),
                position,
                value,
                points: raw.points,
                rank: raw.rank,
                position_rank: raw.position_rank,
                adp: raw.adp,
                stddev: raw.stddev,
                ceiling: raw.ceiling,
                bye: raw.bye,
            },
            pick: raw.pick,
        });
    }
    Ok(records)
}

/// Load the player table. Rows with a non-zero `pick` are keepers.
pub fn load_players(path: &Path, valuation: ValuationSource) -> Result<Vec<PlayerRecord>, LoadError> {
    let label = path.display().to_string();
    let records = players_from_reader(open(path)?, &label, valuation)?;
    if records.is_empty() {
        return Err(LoadError::Validation(format!("{label} has no players")));
    }
    let keepers = records.iter().filter(|r| r.pick != 0).count();
    info!("loaded {} players ({} keepers) from {}", records.len(), keepers, label);
    Ok(records)
}

// ---------------------------------------------------------------------------
// Keeper pick check
// ---------------------------------------------------------------------------

/// Something wrong with the keeper picks in a player table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PickProblem {
    Duplicate { pick: usize, first: String, second: String },
    Missing { pick: usize },
}

impl fmt::Display for PickProblem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PickProblem::Duplicate { pick, first, second } => {
                write!(f, "Pick {pick} has multiple players: {first}, {second}")
            }
            PickProblem::Missing { pick } => write!(f, "Pick {pick} is missing"),
        }
    }
}

/// Keepers in pick order plus any problems found.
#[derive(Debug, Clone)]
pub struct PickCheck<'a> {
    pub keepers: Vec<&'a PlayerRecord>,
    pub problems: Vec<PickProblem>,
}

impl PickCheck<'_> {
    pub fn is_clean(&self) -> bool {
        self.problems.is_empty()
    }
}

/// Check that keeper picks are unique and that every pick from 1 up to the
/// highest keeper pick is taken.
pub fn check_picks(records: &[PlayerRecord]) -> PickCheck<'_> {
    let mut by_pick: BTreeMap<usize, &PlayerRecord> = BTreeMap::new();
    let mut problems = Vec::new();

    for record in records.iter().filter(|r| r.pick != 0) {
        if let Some(first) = by_pick.insert(record.pick, record) {
            problems.push(PickProblem::Duplicate {
                pick: record.pick,
                first: first.player.name.clone(),
                second: record.player.name.clone(),
            });
        }
    }

    let max_pick = by_pick.keys().next_back().copied().unwrap_or(0);
    for pick in 1..=max_pick {
        if !by_pick.contains_key(&pick) {
            problems.push(PickProblem::Missing { pick });
        }
    }

    PickCheck {
        keepers: by_pick.into_values().collect(),
        problems,
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    const HEADER: &str = "pick,id,name,position,team,value,points,rank,position_rank,adp,stddev,ceiling,bye";

    fn load(body: &str) -> Result<Vec<PlayerRecord>, LoadError> {
        let csv_data = format!("{HEADER}\n{body}");
        players_from_reader(csv_data.as_bytes(), "players.csv", ValuationSource::Value)
    }

    #[test]
    fn players_csv_parses_all_columns() {
        let records = load(
            "\
0,101,Justin Jefferson,WR,MIN,312.5,290.1,1,1,1.4,0.8,350.0,6
3,102, Josh Allen ,QB,BUF,300.0,380.2,5,1,20.3,4.1,,
0,103,San Francisco,DST,SF,110.0,140.0,150,1,130.0,9.5,,",
        )
        .unwrap();
        assert_eq!(records.len(), 3);
        let jj = &records[0].player;
        assert_eq!(jj.position, Position::WideReceiver);
        assert_eq!(jj.ceiling, Some(350.0));
        assert_eq!(jj.bye, Some(6));
        assert_eq!(records[0].pick, 0);

        assert_eq!(records[1].pick, 3);
        assert_eq!(records[1].player.name, "Josh Allen");
        assert_eq!(records[1].player.ceiling, None);
        assert_eq!(records[1].player.bye, None);
        assert_eq!(records[2].player.position, Position::Defense);
    }

    #[test]
    fn optional_columns_may_be_absent() {
        let csv_data = "\
pick,id,name,position,team,value,points,rank,position_rank,adp,stddev
0,1,Some Kicker,K,KC,120,130,180,2,160,12";
        let records = players_from_reader(csv_data.as_bytes(), "p.csv", ValuationSource::Value).unwrap();
        assert_eq!(records[0].player.position, Position::Kicker);
        assert_eq!(records[0].player.bye, None);
    }

    #[test]
    fn points_valuation_replaces_value() {
        let csv_data = format!("{HEADER}\n0,1,A,RB,ATL,200,250,1,1,3,1,,");
        let records = players_from_reader(csv_data.as_bytes(), "p.csv", ValuationSource::Points).unwrap();
        assert_eq!(records[0].player.value, 250.0);
        assert_eq!(records[0].player.points, 250.0);
    }

    #[test]
    fn unknown_position_is_fatal_with_row() {
        let err = load("0,1,A,RB,ATL,200,250,1,1,3,1,,\n0,2,B,LB,ATL,200,250,1,1,3,1,,").unwrap_err();
        match err {
            LoadError::Invalid { row, message, .. } => {
                assert_eq!(row, 3);
                assert!(message.contains("LB"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn malformed_number_is_fatal() {
        let err = load("0,1,A,RB,ATL,lots,250,1,1,3,1,,").unwrap_err();
        assert!(matches!(err, LoadError::Csv { .. }));
    }

    #[test]
    fn negative_stddev_and_duplicate_ids_are_rejected() {
        assert!(matches!(
            load("0,1,A,RB,ATL,200,250,1,1,3,-1,,"),
            Err(LoadError::Invalid { .. })
        ));
        assert!(matches!(
            load("0,1,A,RB,ATL,200,250,1,1,3,1,,\n0,1,B,WR,ATL,200,250,1,1,3,1,,"),
            Err(LoadError::Invalid { row: 3, .. })
        ));
    }

    #[test]
    fn empty_table_loads_as_empty() {
        assert!(load("").unwrap().is_empty());
    }

    #[test]
    fn pick_check_reports_duplicates_and_gaps() {
        let records = load(
            "\
1,1,A,RB,ATL,200,250,1,1,3,1,,
3,2,B,WR,ATL,190,250,2,1,4,1,,
3,3,C,WR,ATL,180,250,3,2,5,1,,
0,4,D,TE,ATL,170,250,4,1,6,1,,",
        )
        .unwrap();
        let check = check_picks(&records);
        assert!(!check.is_clean());
        assert_eq!(
            check.problems,
            vec![
                PickProblem::Duplicate {
                    pick: 3,
                    first: "B".into(),
                    second: "C".into()
                },
                PickProblem::Missing { pick: 2 },
            ]
        );
        assert_eq!(check.problems[1].to_string(), "Pick 2 is missing");
        let picks: Vec<usize> = check.keepers.iter().map(|r| r.pick).collect();
        assert_eq!(picks, vec![1, 3]);
    }

    #[test]
    fn no_keepers_is_clean() {
        let records = load("0,1,A,RB,ATL,200,250,1,1,3,1,,").unwrap();
        let check = check_picks(&records);
        assert!(check.is_clean());
        assert!(check.keepers.is_empty());
    }
}
