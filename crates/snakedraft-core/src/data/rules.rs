// Rule table CSV: `roster,autopick,humanoid`, one row per position-string.

use std::io::{Read, Write};
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::info;

use super::{open, row_number, LoadError};
use crate::draft::position::PositionSet;
use crate::rules::{RuleRow, Rules};

#[derive(Debug, Deserialize, Serialize)]
struct RawRule {
    roster: String,
    autopick: String,
    humanoid: String,
}

fn rules_from_reader<R: Read>(rdr: R, path: &str) -> Result<Rules, LoadError> {
    let mut reader = csv::Reader::from_reader(rdr);
    let mut rows = Vec::new();
    for (i, result) in reader.deserialize::<RawRule>().enumerate() {
        let raw = result.map_err(|e| LoadError::Csv {
            path: path.to_string(),
            source: e,
        })?;
        let parse = |s: &str| {
            s.parse::<PositionSet>().map_err(|e| LoadError::Schema {
                path: path.to_string(),
                row: row_number(i),
                source: e,
            })
        };
        // Validate the roster letters as well as the sets.
        parse(&raw.roster)?;
        rows.push(RuleRow {
            autopick: parse(&raw.autopick)?,
            humanoid: parse(&raw.humanoid)?,
            roster: raw.roster,
        });
    }
    Ok(Rules::from_rows(rows))
}

/// Load a precomputed rule table.
pub fn load_rules(path: &Path) -> Result<Rules, LoadError> {
    let label = path.display().to_string();
    let rules = rules_from_reader(open(path)?, &label)?;
    info!("loaded {} rule rows from {}", rules.len(), label);
    Ok(rules)
}

/// Write every row of `rules`, shortest roster first.
pub fn write_rules<W: Write>(rules: &Rules, out: W) -> Result<(), csv::Error> {
    let mut writer = csv::Writer::from_writer(out);
    for row in rules.rows() {
        writer.serialize(RawRule {
            roster: row.roster,
            autopick: row.autopick.to_string(),
            humanoid: row.humanoid.to_string(),
        })?;
    }
    writer.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::draft::position::Schema;
    use crate::rules::eligibility::PolicyLimits;
    use crate::rules::RuleKind;

    #[test]
    fn written_table_loads_back_with_same_answers() {
        let schema = Schema::parse("QRWTB", "").unwrap();
        let generated = Rules::generate(&schema, PolicyLimits::autopick_default(), PolicyLimits::humanoid_default());
        let mut buf = Vec::new();
        write_rules(&generated, &mut buf).unwrap();

        let text = String::from_utf8(buf.clone()).unwrap();
        assert!(text.starts_with("roster,autopick,humanoid\n,QRTW,QRTW\n"));

        let loaded = rules_from_reader(buf.as_slice(), "rules.csv").unwrap();
        assert_eq!(loaded.len(), generated.len());
        for row in generated.rows() {
            assert_eq!(loaded.allowed(RuleKind::Autopick, &row.roster), row.autopick);
            assert_eq!(loaded.allowed(RuleKind::Humanoid, &row.roster), row.humanoid);
        }
    }

    #[test]
    fn bad_letters_are_rejected_with_row() {
        let csv_data = "roster,autopick,humanoid\nQ,RW,RW\nQR,Z,W";
        let err = rules_from_reader(csv_data.as_bytes(), "rules.csv").unwrap_err();
        assert!(matches!(err, LoadError::Schema { row: 3, .. }));
    }
}
