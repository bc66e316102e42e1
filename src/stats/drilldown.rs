//! Drill-down on selected aggregate rows
//!
//! A click on the primary chart yields the aggregate rows under the
//! cursor. Each row is split back into one bar per release status, and
//! the rows are summed per month for the line overlay.

use crate::hierarchy::NodeId;
use crate::stats::aggregate::AggregateRow;
use crate::stats::release::ReleaseStatus;
use indexmap::IndexMap;
use serde::Serialize;

/// One release-status slice of an aggregate row
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DrilldownBar {
    pub bucket_id: NodeId,
    pub bucket_name: String,
    pub pub_time_label: String,
    pub pub_count: u64,
    pub release_status: ReleaseStatus,
    pub release_status_label: String,
}

/// Total publications for one month label
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MonthTotal {
    pub pub_time_label: String,
    pub pub_count: u64,
}

/// Secondary chart data
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Drilldown {
    pub bars: Vec<DrilldownBar>,
    pub line: Vec<MonthTotal>,
}

/// Reshape the selected rows; no data is fetched.
pub fn drill_down(rows: &[AggregateRow]) -> Drilldown {
    let mut bars = Vec::with_capacity(rows.len() * ReleaseStatus::ALL.len());
    let mut totals: IndexMap<&str, u64> = IndexMap::new();

    for row in rows {
        for status in ReleaseStatus::ALL {
            bars.push(DrilldownBar {
                bucket_id: row.bucket_id.clone(),
                bucket_name: row.bucket_name.clone(),
                pub_time_label: row.pub_time_label.clone(),
                pub_count: row.count(status),
                release_status: status,
                release_status_label: status.label().to_string(),
            });
        }
        *totals.entry(row.pub_time_label.as_str()).or_insert(0) += row.total_count;
    }

    let line = totals
        .into_iter()
        .map(|(label, pub_count)| MonthTotal {
            pub_time_label: label.to_string(),
            pub_count,
        })
        .collect();

    Drilldown { bars, line }
}

/// Pick the rows a chart click would hit: all rows of one bucket, all
/// rows of one month, or the single cell where both are given.
pub fn select_rows(
    rows: &[AggregateRow],
    bucket: Option<&NodeId>,
    label: Option<&str>,
) -> Vec<AggregateRow> {
    rows.iter()
        .filter(|row| bucket.map_or(true, |id| &row.bucket_id == id))
        .filter(|row| label.map_or(true, |l| row.pub_time_label == l))
        .cloned()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(id: &str, label: &str, counts: (u64, u64, u64)) -> AggregateRow {
        AggregateRow {
            bucket_id: NodeId::new(id),
            bucket_name: format!("Bucket {}", id),
            pub_time_label: label.to_string(),
            add_count: counts.0,
            revise_count: counts.1,
            abolish_count: counts.2,
            total_count: counts.0 + counts.1 + counts.2,
        }
    }

    #[test]
    fn test_expands_every_status() {
        let drill = drill_down(&[row("1", "2023.1", (2, 0, 1))]);
        assert_eq!(drill.bars.len(), 3);
        let counts: Vec<(ReleaseStatus, u64)> = drill
            .bars
            .iter()
            .map(|b| (b.release_status, b.pub_count))
            .collect();
        assert_eq!(
            counts,
            vec![
                (ReleaseStatus::Added, 2),
                (ReleaseStatus::Revised, 0),
                (ReleaseStatus::Abolished, 1)
            ]
        );
        assert_eq!(drill.bars[1].release_status_label, "revised");
    }

    #[test]
    fn test_line_groups_by_label() {
        let rows = vec![
            row("1", "2023.2", (1, 1, 0)),
            row("2", "2023.1", (0, 0, 4)),
            row("3", "2023.2", (3, 0, 0)),
        ];
        let drill = drill_down(&rows);
        assert_eq!(
            drill.line,
            vec![
                MonthTotal { pub_time_label: "2023.2".to_string(), pub_count: 5 },
                MonthTotal { pub_time_label: "2023.1".to_string(), pub_count: 4 },
            ]
        );
    }

    #[test]
    fn test_empty_selection() {
        assert_eq!(drill_down(&[]), Drilldown::default());
    }

    #[test]
    fn test_select_rows() {
        let rows = vec![
            row("1", "2023.1", (1, 0, 0)),
            row("1", "2023.2", (0, 1, 0)),
            row("2", "2023.1", (0, 0, 1)),
        ];
        let one = NodeId::new("1");
        assert_eq!(select_rows(&rows, Some(&one), None).len(), 2);
        assert_eq!(select_rows(&rows, None, Some("2023.1")).len(), 2);
        assert_eq!(select_rows(&rows, Some(&one), Some("2023.2")).len(), 1);
        assert!(select_rows(&rows, Some(&NodeId::new("9")), None).is_empty());
    }
}
