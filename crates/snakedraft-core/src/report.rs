// Serializable results: a finished draft and a next-pick recommendation.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::draft::player::DraftedPlayer;
use crate::draft::position::Position;
use crate::draft::state::State;
use crate::score::Scorer;
use crate::strategy::{Candidate, Lineup};

// ---------------------------------------------------------------------------
// Draft report
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize)]
pub struct TeamReport {
    pub index: usize,
    /// Strategy letter that ran this team.
    pub manager: char,
    pub score: f64,
    /// Roster in pick order.
    pub players: Vec<DraftedPlayer>,
}

#[derive(Debug, Clone, Serialize)]
pub struct DraftReport {
    pub generated_at: DateTime<Utc>,
    pub seed: u64,
    pub strategies: String,
    pub teams: Vec<TeamReport>,
}

impl DraftReport {
    /// Summarize a finished (or partially run) draft.
    pub fn new(state: &State, lineup: &Lineup, scorer: &Scorer, seed: u64) -> Self {
        let teams = state
            .teams()
            .iter()
            .enumerate()
            .map(|(index, team)| TeamReport {
                index,
                manager: lineup
                    .managers()
                    .get(index)
                    .map(|m| m.letter())
                    .unwrap_or('?'),
                score: scorer.score(team),
                players: team.players_by_pick().into_iter().cloned().collect(),
            })
            .collect();
        DraftReport {
            generated_at: Utc::now(),
            seed,
            strategies: lineup.to_string(),
            teams,
        }
    }
}

impl fmt::Display for DraftReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "# seed {} strategies {}", self.seed, self.strategies)?;
        for team in &self.teams {
            writeln!(f)?;
            writeln!(f, "Team {} [{}] score {:.2}", team.index, team.manager, team.score)?;
            for player in &team.players {
                writeln!(f, "{player}")?;
            }
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Recommendation
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize)]
pub struct CandidateReport {
    pub id: u32,
    pub name: String,
    pub tag: String,
    pub position: Position,
    pub value: f64,
    pub adp: f64,
    pub mean: f64,
    pub stddev: f64,
    pub trials: usize,
}

impl From<&Candidate> for CandidateReport {
    fn from(c: &Candidate) -> Self {
        CandidateReport {
            id: c.player.id,
            name: c.player.name.clone(),
            tag: c.player.tag(),
            position: c.player.position,
            value: c.player.value,
            adp: c.player.adp,
            mean: c.mean,
            stddev: c.stddev,
            trials: c.trials,
        }
    }
}

/// Ranked candidates for the team on the clock, best first.
#[derive(Debug, Clone, Serialize)]
pub struct Recommendation {
    pub generated_at: DateTime<Utc>,
    pub seed: u64,
    pub pick: usize,
    pub team: usize,
    /// The team's roster before this pick, as a position-string.
    pub roster: String,
    pub candidates: Vec<CandidateReport>,
}

impl Recommendation {
    pub fn new(state: &State, team: usize, candidates: &[Candidate], seed: u64) -> Self {
        Recommendation {
            generated_at: Utc::now(),
            seed,
            pick: state.pick(),
            team,
            roster: state
                .team(team)
                .map(|t| t.position_string().to_string())
                .unwrap_or_default(),
            candidates: candidates.iter().map(CandidateReport::from).collect(),
        }
    }

    pub fn best(&self) -> Option<&CandidateReport> {
        self.candidates.first()
    }
}

impl fmt::Display for Recommendation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "# seed {} pick {} team {} roster '{}'",
            self.seed, self.pick, self.team, self.roster
        )?;
        for (rank, c) in self.candidates.iter().enumerate() {
            writeln!(
                f,
                "{:2}. {} {:<30} value {:7.2} adp {:5.1}  mean {:8.2} sd {:7.2} (n={})",
                rank + 1,
                c.tag,
                c.name,
                c.value,
                c.adp,
                c.mean,
                c.stddev,
                c.trials
            )?;
        }
        Ok(())
    }
}
