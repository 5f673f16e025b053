// Roster eligibility: which positions a team may legally draft next.

use crate::draft::position::{
    parse_position_letters, parse_slots, Position, PositionCounts, PositionSet, Schema,
    SchemaError, Slot,
};

/// The knobs that distinguish one eligibility policy from another.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PolicyLimits {
    /// Slot codes whose starters must be filled before any open pick.
    pub priority: Vec<Slot>,
    /// Per-position floor across the whole roster. Empty means none.
    pub min: PositionCounts,
    /// Per-position ceiling across the whole roster. Empty means none; when
    /// present, a position missing from it may not be drafted at all.
    pub max: PositionCounts,
}

impl PolicyLimits {
    /// Parse letter strings, e.g. `("DKQRTWX", "", "")`.
    pub fn parse(priority: &str, min: &str, max: &str) -> Result<Self, SchemaError> {
        Ok(PolicyLimits {
            priority: parse_slots(priority)?,
            min: min.parse()?,
            max: max.parse()?,
        })
    }

    /// Fill every starter, kicker and defense included, before anything else.
    pub fn autopick_default() -> Self {
        PolicyLimits {
            priority: Position::ALL
                .into_iter()
                .map(Slot::Starter)
                .chain([Slot::Flex])
                .collect(),
            min: PositionCounts::default(),
            max: PositionCounts::default(),
        }
    }

    /// Like autopick, but kicker and defense carry no priority.
    pub fn humanoid_default() -> Self {
        PolicyLimits {
            priority: vec![
                Slot::Starter(Position::Quarterback),
                Slot::Starter(Position::RunningBack),
                Slot::Starter(Position::WideReceiver),
                Slot::Flex,
            ],
            min: PositionCounts::default(),
            max: PositionCounts::default(),
        }
    }
}

/// Positions a team holding `roster` may draft next.
///
/// Rules, first match wins:
/// 1. If the open starter slots would use up the rest of the roster, only
///    those starters are allowed.
/// 2. If a priority slot is still open, only open starters are allowed.
/// 3. If the unmet minimums would use up the rest of the roster, only
///    positions below their minimum are allowed.
/// 4. Otherwise any position under its maximum.
pub fn allowed_positions(schema: &Schema, limits: &PolicyLimits, roster: &[Position]) -> PositionSet {
    let open = schema.open_slots(roster);
    let starters = open.open_positions(schema.flex_eligible());

    if roster.len() + open.remaining() >= schema.len() {
        return starters;
    }

    if limits.priority.iter().any(|&slot| open.is_open(slot)) {
        return starters;
    }

    if !limits.min.is_empty() {
        let mut need = limits.min;
        for &pos in roster {
            need.take(pos);
        }
        if roster.len() + need.total() >= schema.len() {
            return need.nonzero();
        }
    }

    if limits.max.is_empty() {
        return PositionSet::all();
    }
    let mut left = limits.max;
    for &pos in roster {
        left.take(pos);
    }
    left.nonzero()
}

/// [`allowed_positions`] keyed by a position-string such as "QRRW".
pub fn allowed_for_string(
    schema: &Schema,
    limits: &PolicyLimits,
    roster: &str,
) -> Result<PositionSet, SchemaError> {
    let roster = parse_position_letters(roster)?;
    Ok(allowed_positions(schema, limits, &roster))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
