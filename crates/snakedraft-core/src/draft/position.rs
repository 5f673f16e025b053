// Positions, roster slot codes, and the roster-slot schema.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

// ---------------------------------------------------------------------------
// Error type
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SchemaError {
    #[error("unknown position letter '{0}'")]
    UnknownPosition(char),

    #[error("unknown slot code '{0}'")]
    UnknownSlot(char),

    #[error("unrecognized position '{0}'")]
    UnrecognizedPosition(String),

    #[error("roster schema is empty")]
    Empty,

    #[error("schema has a flex slot but no flex-eligible positions")]
    FlexWithoutPositions,
}

// ---------------------------------------------------------------------------
// Position
// ---------------------------------------------------------------------------

/// Football positions. Variant order is letter order (D < K < Q < R < T < W),
/// which is the order every allowed-position set is reported in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Position {
    Defense,
    Kicker,
    Quarterback,
    RunningBack,
    TightEnd,
    WideReceiver,
}

impl Position {
    pub const ALL: [Position; 6] = [
        Position::Defense,
        Position::Kicker,
        Position::Quarterback,
        Position::RunningBack,
        Position::TightEnd,
        Position::WideReceiver,
    ];

    /// Single-letter code used in position-strings and rule tables.
    pub fn letter(self) -> char {
        match self {
            Position::Defense => 'D',
            Position::Kicker => 'K',
            Position::Quarterback => 'Q',
            Position::RunningBack => 'R',
            Position::TightEnd => 'T',
            Position::WideReceiver => 'W',
        }
    }

    pub fn from_letter(c: char) -> Option<Self> {
        match c.to_ascii_uppercase() {
            'D' => Some(Position::Defense),
            'K' => Some(Position::Kicker),
            'Q' => Some(Position::Quarterback),
            'R' => Some(Position::RunningBack),
            'T' => Some(Position::TightEnd),
            'W' => Some(Position::WideReceiver),
            _ => None,
        }
    }

    /// Parse a projection-file position string ("QB", "RB", "WR", "TE", "K",
    /// "DST", "DEF"). Only the first letter is significant.
    pub fn from_str_pos(s: &str) -> Option<Self> {
        s.trim().chars().next().and_then(Position::from_letter)
    }

    /// Display abbreviation.
    pub fn display_str(self) -> &'static str {
        match self {
            Position::Defense => "DST",
            Position::Kicker => "K",
            Position::Quarterback => "QB",
            Position::RunningBack => "RB",
            Position::TightEnd => "TE",
            Position::WideReceiver => "WR",
        }
    }

    pub fn index(self) -> usize {
        self as usize
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.display_str())
    }
}

// ---------------------------------------------------------------------------
// PositionSet
// ---------------------------------------------------------------------------

/// A set of positions, always iterated and displayed in letter order.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct PositionSet(u8);

impl PositionSet {
    pub const fn empty() -> Self {
        PositionSet(0)
    }

    pub fn all() -> Self {
        Position::ALL.iter().copied().collect()
    }

    pub fn insert(&mut self, pos: Position) {
        self.0 |= 1 << pos.index();
    }

    pub fn contains(&self, pos: Position) -> bool {
        self.0 & (1 << pos.index()) != 0
    }

    pub fn is_empty(&self) -> bool {
        self.0 == 0
    }

    pub fn len(&self) -> usize {
        self.0.count_ones() as usize
    }

    pub fn is_subset(&self, other: &PositionSet) -> bool {
        self.0 & !other.0 == 0
    }

    pub fn iter(&self) -> impl Iterator<Item = Position> {
        let set = *self;
        Position::ALL.into_iter().filter(move |p| set.contains(*p))
    }
}

impl FromIterator<Position> for PositionSet {
    fn from_iter<I: IntoIterator<Item = Position>>(iter: I) -> Self {
        let mut set = PositionSet::empty();
        for pos in iter {
            set.insert(pos);
        }
        set
    }
}

impl FromStr for PositionSet {
    type Err = SchemaError;

    /// Parse a letter string such as "DKQ". Whitespace is ignored.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.chars()
            .filter(|c| !c.is_whitespace())
            .map(|c| Position::from_letter(c).ok_or(SchemaError::UnknownPosition(c)))
            .collect()
    }
}

impl fmt::Display for PositionSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for pos in self.iter() {
            write!(f, "{}", pos.letter())?;
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// PositionCounts
// ---------------------------------------------------------------------------

/// A multiset of positions, e.g. a position minimum "QRRWW".
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PositionCounts([usize; 6]);

impl PositionCounts {
    pub fn from_positions<'a, I: IntoIterator<Item = &'a Position>>(positions: I) -> Self {
        let mut counts = PositionCounts::default();
        for pos in positions {
            counts.0[pos.index()] += 1;
        }
        counts
    }

    pub fn get(&self, pos: Position) -> usize {
        self.0[pos.index()]
    }

    pub fn total(&self) -> usize {
        self.0.iter().sum()
    }

    pub fn is_empty(&self) -> bool {
        self.total() == 0
    }

    /// Take one off `pos` if any is left. Returns whether something was taken.
    pub fn take(&mut self, pos: Position) -> bool {
        let slot = &mut self.0[pos.index()];
        if *slot > 0 {
            *slot -= 1;
            true
        } else {
            false
        }
    }

    /// Positions with a non-zero count.
    pub fn nonzero(&self) -> PositionSet {
        Position::ALL.into_iter().filter(|p| self.get(*p) > 0).collect()
    }
}

impl FromStr for PositionCounts {
    type Err = SchemaError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let positions = parse_position_letters(s)?;
        Ok(PositionCounts::from_positions(&positions))
    }
}

/// Parse a string of position letters, preserving order and duplicates.
pub fn parse_position_letters(s: &str) -> Result<Vec<Position>, SchemaError> {
    s.chars()
        .filter(|c| !c.is_whitespace())
        .map(|c| Position::from_letter(c).ok_or(SchemaError::UnknownPosition(c)))
        .collect()
}

// ---------------------------------------------------------------------------
// Slot codes and schema
// ---------------------------------------------------------------------------

/// A roster slot code: a named starter position, the flex slot (`X`), or the
/// bench (`B`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Slot {
    Starter(Position),
    Flex,
    Bench,
}

impl Slot {
    pub fn from_letter(c: char) -> Option<Self> {
        match c.to_ascii_uppercase() {
            'X' => Some(Slot::Flex),
            'B' => Some(Slot::Bench),
            other => Position::from_letter(other).map(Slot::Starter),
        }
    }

    pub fn letter(self) -> char {
        match self {
            Slot::Starter(pos) => pos.letter(),
            Slot::Flex => 'X',
            Slot::Bench => 'B',
        }
    }
}

/// Parse a string of slot codes such as "DKQRTWX".
pub fn parse_slots(s: &str) -> Result<Vec<Slot>, SchemaError> {
    s.chars()
        .filter(|c| !c.is_whitespace())
        .map(|c| Slot::from_letter(c).ok_or(SchemaError::UnknownSlot(c)))
        .collect()
}

/// Unfilled starter slots: one counter per named position plus the flex.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct OpenSlots {
    starters: PositionCounts,
    flex: usize,
}

impl OpenSlots {
    /// Place `pos` into its own slot, or into the flex slot when its own is
    /// exhausted and `pos` is flex-eligible. Returns whether a slot was taken.
    pub fn consume(&mut self, pos: Position, flex_eligible: PositionSet) -> bool {
        self.place(pos, flex_eligible).is_some()
    }

    /// Like [`OpenSlots::consume`], returning the slot that was taken.
    pub fn place(&mut self, pos: Position, flex_eligible: PositionSet) -> Option<Slot> {
        if self.starters.take(pos) {
            return Some(Slot::Starter(pos));
        }
        if flex_eligible.contains(pos) && self.flex > 0 {
            self.flex -= 1;
            return Some(Slot::Flex);
        }
        None
    }

    pub fn remaining(&self) -> usize {
        self.starters.total() + self.flex
    }

    pub fn is_open(&self, slot: Slot) -> bool {
        match slot {
            Slot::Starter(pos) => self.starters.get(pos) > 0,
            Slot::Flex => self.flex > 0,
            Slot::Bench => false,
        }
    }

    /// Positions that still have somewhere to start: an open slot of their
    /// own, or an open flex slot if flex-eligible.
    pub fn open_positions(&self, flex_eligible: PositionSet) -> PositionSet {
        Position::ALL
            .into_iter()
            .filter(|&p| self.starters.get(p) > 0 || (self.flex > 0 && flex_eligible.contains(p)))
            .collect()
    }
}

/// The roster-slot schema: slot codes in configured order plus the set of
/// positions the flex slot accepts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Schema {
    slots: Vec<Slot>,
    flex: PositionSet,
}

impl Schema {
    /// Parse a schema string ("QRRWWWTXDKBBBBBBBB") and flex set ("RTW").
    pub fn parse(schema: &str, flex: &str) -> Result<Self, SchemaError> {
        let slots = parse_slots(schema)?;
        if slots.is_empty() {
            return Err(SchemaError::Empty);
        }
        let flex: PositionSet = flex.parse()?;
        if flex.is_empty() && slots.contains(&Slot::Flex) {
            return Err(SchemaError::FlexWithoutPositions);
        }
        Ok(Schema { slots, flex })
    }

    pub fn slots(&self) -> &[Slot] {
        &self.slots
    }

    /// Total roster size (starters + flex + bench).
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn flex_eligible(&self) -> PositionSet {
        self.flex
    }

    /// All starter and flex slots, none filled.
    pub fn starter_slots(&self) -> OpenSlots {
        let mut open = OpenSlots::default();
        for slot in &self.slots {
            match slot {
                Slot::Starter(pos) => open.starters.0[pos.index()] += 1,
                Slot::Flex => open.flex += 1,
                Slot::Bench => {}
            }
        }
        open
    }

    /// Starter slots left after placing `roster` (any order).
    pub fn open_slots(&self, roster: &[Position]) -> OpenSlots {
        let mut open = self.starter_slots();
        for &pos in roster {
            open.consume(pos, self.flex);
        }
        open
    }
}

impl fmt::Display for Schema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for slot in &self.slots {
            write!(f, "{}", slot.letter())?;
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn position_from_projection_strings() {
        assert_eq!(Position::from_str_pos("QB"), Some(Position::Quarterback));
        assert_eq!(Position::from_str_pos("RB"), Some(Position::RunningBack));
        assert_eq!(Position::from_str_pos("WR"), Some(Position::WideReceiver));
        assert_eq!(Position::from_str_pos("TE"), Some(Position::TightEnd));
        assert_eq!(Position::from_str_pos("K"), Some(Position::Kicker));
        assert_eq!(Position::from_str_pos("DST"), Some(Position::Defense));
        assert_eq!(Position::from_str_pos(" dst "), Some(Position::Defense));
        assert_eq!(Position::from_str_pos("LB"), None);
        assert_eq!(Position::from_str_pos(""), None);
    }

    #[test]
    fn position_set_displays_in_letter_order() {
        let set: PositionSet = [Position::WideReceiver, Position::Defense, Position::Quarterback]
            .into_iter()
            .collect();
        assert_eq!(set.to_string(), "DQW");
        assert_eq!(set.len(), 3);
        assert_eq!(PositionSet::all().to_string(), "DKQRTW");
    }

    #[test]
    fn position_set_parse_rejects_unknown_letters() {
        assert_eq!("KD".parse::<PositionSet>().unwrap().to_string(), "DK");
        assert_eq!("DZ".parse::<PositionSet>(), Err(SchemaError::UnknownPosition('Z')));
    }

    #[test]
    fn counts_take_stops_at_zero() {
        let mut counts: PositionCounts = "QRR".parse().unwrap();
        assert_eq!(counts.total(), 3);
        assert!(counts.take(Position::RunningBack));
        assert!(counts.take(Position::RunningBack));
        assert!(!counts.take(Position::RunningBack));
        assert_eq!(counts.nonzero().to_string(), "Q");
    }

    #[test]
    fn schema_parse_and_len() {
        let schema = Schema::parse("QRRWWWTXDKBBBBBBBB", "RTW").unwrap();
        assert_eq!(schema.len(), 18);
        assert_eq!(schema.to_string(), "QRRWWWTXDKBBBBBBBB");
        assert_eq!(schema.starter_slots().remaining(), 10);
    }

    #[test]
    fn schema_rejects_bad_input() {
        assert_eq!(Schema::parse("", "RTW"), Err(SchemaError::Empty));
        assert_eq!(Schema::parse("QRZ", "RTW"), Err(SchemaError::UnknownSlot('Z')));
        assert_eq!(Schema::parse("QRX", ""), Err(SchemaError::FlexWithoutPositions));
    }

    #[test]
    fn flex_absorbs_overflow_of_eligible_positions_only() {
        let schema = Schema::parse("QRRWWWTXDKBBBBBBBB", "RTW").unwrap();
        let roster = parse_position_letters("RRR").unwrap();
        let open = schema.open_slots(&roster);
        assert!(!open.is_open(Slot::Starter(Position::RunningBack)));
        assert!(!open.is_open(Slot::Flex));
        assert_eq!(open.remaining(), 7);

        let roster = parse_position_letters("QQ").unwrap();
        let open = schema.open_slots(&roster);
        assert!(open.is_open(Slot::Flex));
        assert_eq!(open.remaining(), 9);
    }
}
