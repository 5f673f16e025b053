// Eligibility rule tables for the autopick and humanoid policies.

pub mod eligibility;

use std::collections::HashMap;
use std::fmt;

use tracing::{debug, warn};

use crate::draft::position::{Position, PositionSet, Schema};
use eligibility::{allowed_positions, PolicyLimits};

/// The two named eligibility policies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RuleKind {
    /// Strict: every starter, kicker and defense included, before the bench.
    Autopick,
    /// Looser: kicker and defense wait, as most people draft.
    Humanoid,
}

impl RuleKind {
    pub fn name(self) -> &'static str {
        match self {
            RuleKind::Autopick => "autopick",
            RuleKind::Humanoid => "humanoid",
        }
    }
}

impl fmt::Display for RuleKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// One row of a rule table: a position-string and what each policy allows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuleRow {
    pub roster: String,
    pub autopick: PositionSet,
    pub humanoid: PositionSet,
}

/// Schema and limits needed to compute a rule the table does not hold.
#[derive(Debug, Clone)]
struct RuleSource {
    schema: Schema,
    autopick: PolicyLimits,
    humanoid: PolicyLimits,
}

impl RuleSource {
    fn allowed(&self, kind: RuleKind, roster: &[Position]) -> PositionSet {
        let limits = match kind {
            RuleKind::Autopick => &self.autopick,
            RuleKind::Humanoid => &self.humanoid,
        };
        allowed_positions(&self.schema, limits, roster)
    }
}

/// Lookup from a team's position-string to the positions each policy allows
/// next.
///
/// A table can be loaded from rows, generated for every reachable roster, or
/// left empty and computed per lookup; the answers are the same. A
/// position-string with no row and no way to compute one allows nothing,
/// which sends the policies to their first-in-pool fallback.
#[derive(Debug, Clone, Default)]
pub struct Rules {
    autopick: HashMap<String, PositionSet>,
    humanoid: HashMap<String, PositionSet>,
    source: Option<RuleSource>,
}

impl Rules {
    /// Precompute both tables for every position-string shorter than the
    /// schema.
    pub fn generate(schema: &Schema, autopick: PolicyLimits, humanoid: PolicyLimits) -> Self {
        let source = RuleSource {
            schema: schema.clone(),
            autopick,
            humanoid,
        };
        let mut rules = Rules::default();
        let mut roster = Vec::with_capacity(schema.len());
        for size in 0..schema.len() {
            for_each_roster(size, 0, &mut roster, &mut |r: &[Position]| {
                let key: String = r.iter().map(|p| p.letter()).collect();
                rules.autopick.insert(key.clone(), source.allowed(RuleKind::Autopick, r));
                rules.humanoid.insert(key, source.allowed(RuleKind::Humanoid, r));
            });
        }
        debug!("generated {} rule rows for schema {}", rules.autopick.len(), schema);
        rules.source = Some(source);
        rules
    }

    /// No precomputed rows; every lookup is computed.
    pub fn on_demand(schema: &Schema, autopick: PolicyLimits, humanoid: PolicyLimits) -> Self {
        Rules {
            source: Some(RuleSource {
                schema: schema.clone(),
                autopick,
                humanoid,
            }),
            ..Rules::default()
        }
    }

    /// Build a table from loaded rows. Keys are normalized to sorted order.
    pub fn from_rows(rows: impl IntoIterator<Item = RuleRow>) -> Self {
        let mut rules = Rules::default();
        for row in rows {
            let key = sorted_key(&row.roster);
            if rules.autopick.contains_key(&key) {
                warn!("duplicate rule row for roster '{}', using latest", key);
            }
            rules.autopick.insert(key.clone(), row.autopick);
            rules.humanoid.insert(key, row.humanoid);
        }
        rules
    }

    /// Compute rows missing from a loaded table instead of allowing nothing.
    pub fn with_fallback(mut self, schema: &Schema, autopick: PolicyLimits, humanoid: PolicyLimits) -> Self {
        self.source = Some(RuleSource {
            schema: schema.clone(),
            autopick,
            humanoid,
        });
        self
    }

    /// Positions `kind` allows for a team holding `roster` (a sorted
    /// position-string as kept by `Team`).
    pub fn allowed(&self, kind: RuleKind, roster: &str) -> PositionSet {
        let table = match kind {
            RuleKind::Autopick => &self.autopick,
            RuleKind::Humanoid => &self.humanoid,
        };
        if let Some(set) = table.get(roster) {
            return *set;
        }
        match &self.source {
            Some(source) => {
                let positions: Vec<Position> =
                    roster.chars().filter_map(Position::from_letter).collect();
                source.allowed(kind, &positions)
            }
            None => PositionSet::empty(),
        }
    }

    /// Number of precomputed rows.
    pub fn len(&self) -> usize {
        self.autopick.len()
    }

    pub fn is_empty(&self) -> bool {
        self.autopick.is_empty()
    }

    /// All precomputed rows, shortest roster first, then alphabetical.
    pub fn rows(&self) -> Vec<RuleRow> {
        let mut rows: Vec<RuleRow> = self
            .autopick
            .iter()
            .map(|(roster, &autopick)| RuleRow {
                roster: roster.clone(),
                autopick,
                humanoid: self.humanoid.get(roster).copied().unwrap_or_default(),
            })
            .collect();
        rows.sort_by(|a, b| a.roster.len().cmp(&b.roster.len()).then_with(|| a.roster.cmp(&b.roster)));
        rows
    }
}

fn sorted_key(roster: &str) -> String {
    let mut letters: Vec<char> = roster.chars().filter(|c| !c.is_whitespace()).collect();
    letters.sort_unstable();
    letters.into_iter().collect()
}

/// Visit every multiset of `size` positions in letter order, each as a sorted
/// roster.
fn for_each_roster(size: usize, start: usize, roster: &mut Vec<Position>, visit: &mut impl FnMut(&[Position])) {
    if roster.len() == size {
        visit(roster);
        return;
    }
    for i in start..Position::ALL.len() {
        roster.push(Position::ALL[i]);
        for_each_roster(size, i, roster, visit);
        roster.pop();
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
