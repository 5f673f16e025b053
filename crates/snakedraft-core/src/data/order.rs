// Draft order loading: one row per pick, `pick,label,team`.

use std::io::Read;
use std::path::Path;

use serde::Deserialize;
use tracing::info;

use super::{open, row_number, LoadError};
use crate::draft::state::DraftOrder;

#[derive(Debug, Deserialize)]
#[allow(dead_code)]
struct RawPick {
    pick: usize,
    /// Free-form label such as "1.01"; carried for humans only.
    #[serde(default)]
    label: String,
    team: usize,
}

fn order_from_reader<R: Read>(rdr: R, path: &str) -> Result<DraftOrder, LoadError> {
    let mut reader = csv::Reader::from_reader(rdr);
    let mut teams = Vec::new();
    for (i, result) in reader.deserialize::<RawPick>().enumerate() {
        let raw = result.map_err(|e| LoadError::Csv {
            path: path.to_string(),
            source: e,
        })?;
        let want = teams.len() + 1;
        if raw.pick != want {
            return Err(LoadError::Invalid {
                path: path.to_string(),
                row: row_number(i),
                message: format!("got pick {}, want {}", raw.pick, want),
            });
        }
        teams.push(raw.team);
    }
    Ok(DraftOrder::from_teams(teams))
}

/// Load a draft order. Picks must run 1, 2, 3, ... with no gaps.
pub fn load_order(path: &Path) -> Result<DraftOrder, LoadError> {
    let label = path.display().to_string();
    let order = order_from_reader(open(path)?, &label)?;
    if order.last_pick() == 0 {
        return Err(LoadError::Validation(format!("{label} has no picks")));
    }
    info!("loaded {} picks from {}", order.last_pick(), label);
    Ok(order)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::draft::state::PickSlot;

    #[test]
    fn sequential_picks_load() {
        let csv_data = "\
pick,label,team
1,1.01,0
2,1.02,1
3,2.01,1
4,2.02,0";
        let order = order_from_reader(csv_data.as_bytes(), "order.csv").unwrap();
        assert_eq!(order.last_pick(), 4);
        assert_eq!(order.get(3), Some(PickSlot::Team(1)));
        assert_eq!(order, DraftOrder::snake(2, 2));
    }

    #[test]
    fn out_of_sequence_pick_is_rejected() {
        let csv_data = "pick,label,team\n1,a,0\n3,b,1";
        let err = order_from_reader(csv_data.as_bytes(), "order.csv").unwrap_err();
        match err {
            LoadError::Invalid { row, message, .. } => {
                assert_eq!(row, 3);
                assert_eq!(message, "got pick 3, want 2");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn non_numeric_team_is_rejected() {
        let csv_data = "pick,label,team\n1,a,zero";
        assert!(matches!(
            order_from_reader(csv_data.as_bytes(), "order.csv"),
            Err(LoadError::Csv { .. })
        ));
    }
}
