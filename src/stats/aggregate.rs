//! Bucketed publication counts
//!
//! Records are assigned to every statistical bucket whose path prefixes
//! the record's path along the chosen [`Dimension`], then counted per
//! month label and release status.

use crate::hierarchy::{reduce_start_paths, HierarchyNode, NodeId};
use crate::stats::record::HistoryRecord;
use crate::stats::release::ReleaseStatus;
use crate::stats::timeline::{month_label, Timeline};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use tracing::debug;

/// A statistical bucket: one selected (or root) hierarchy node
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Bucket {
    pub id: NodeId,
    pub name: String,
    pub path: String,
}

impl Bucket {
    /// Whether `path` lies in this bucket's subtree. An empty bucket path
    /// contains nothing.
    pub fn contains_path(&self, path: &str) -> bool {
        !self.path.is_empty() && path.starts_with(self.path.as_str())
    }
}

impl From<&HierarchyNode> for Bucket {
    fn from(node: &HierarchyNode) -> Self {
        Self {
            id: node.id.clone(),
            name: node.name.clone(),
            path: node.path.clone(),
        }
    }
}

/// Which path of a record is matched against bucket paths
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Dimension {
    /// The flow or rule path of the record itself
    Entity,
    /// The path of the organization the record belongs to
    Organization,
}

impl Dimension {
    pub fn path_of<'a>(&self, record: &'a HistoryRecord) -> Option<&'a str> {
        match self {
            Dimension::Entity => record.path.as_deref(),
            Dimension::Organization => record.org.as_ref().map(|org| org.path.as_str()),
        }
    }
}

/// Counts for one (bucket, month) cell
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AggregateRow {
    pub bucket_id: NodeId,
    pub bucket_name: String,
    pub pub_time_label: String,
    pub add_count: u64,
    pub revise_count: u64,
    pub abolish_count: u64,
    pub total_count: u64,
}

impl AggregateRow {
    pub fn count(&self, status: ReleaseStatus) -> u64 {
        match status {
            ReleaseStatus::Added => self.add_count,
            ReleaseStatus::Revised => self.revise_count,
            ReleaseStatus::Abolished => self.abolish_count,
        }
    }
}

#[derive(Debug, Default, Clone, Copy)]
struct StatusCounts {
    added: u64,
    revised: u64,
    abolished: u64,
}

impl StatusCounts {
    fn bump(&mut self, status: ReleaseStatus) {
        match status {
            ReleaseStatus::Added => self.added += 1,
            ReleaseStatus::Revised => self.revised += 1,
            ReleaseStatus::Abolished => self.abolished += 1,
        }
    }
}

/// Buckets for a selection.
///
/// An empty selection falls back to the root nodes. The chosen nodes are
/// reduced to their topmost members by path; one bucket is kept per
/// distinct path, in node order.
pub fn statistical_buckets(
    nodes: &[HierarchyNode],
    selected: &[NodeId],
    root: &NodeId,
) -> Vec<Bucket> {
    let chosen: Vec<&HierarchyNode> = if selected.is_empty() {
        nodes.iter().filter(|n| n.is_root(root)).collect()
    } else {
        let wanted: HashSet<&NodeId> = selected.iter().collect();
        nodes.iter().filter(|n| wanted.contains(&n.id)).collect()
    };

    let reduced: HashSet<String> = reduce_start_paths(chosen.iter().map(|n| n.path.as_str()))
        .into_iter()
        .collect();

    let mut by_path: IndexMap<&str, Bucket> = IndexMap::new();
    for node in chosen {
        if reduced.contains(&node.path) && !by_path.contains_key(node.path.as_str()) {
            by_path.insert(node.path.as_str(), Bucket::from(node));
        }
    }
    by_path.into_values().collect()
}

/// Count records per bucket, month label and release status.
///
/// The output is dense: every bucket gets a row for every timeline label,
/// zero-filled when nothing matched. Labels seen in records but outside
/// the timeline follow the timeline labels of their bucket. Records
/// lacking a path, timestamp or known status are skipped.
pub fn aggregate(
    buckets: &[Bucket],
    records: &[HistoryRecord],
    dimension: Dimension,
    timeline: &Timeline,
) -> Vec<AggregateRow> {
    let mut cells: Vec<IndexMap<String, StatusCounts>> = buckets
        .iter()
        .map(|_| {
            timeline
                .labels()
                .iter()
                .map(|label| (label.clone(), StatusCounts::default()))
                .collect()
        })
        .collect();

    let mut skipped = 0usize;
    for record in records {
        let (Some(path), Some(ts), Some(status)) =
            (dimension.path_of(record), record.published_at, record.status)
        else {
            skipped += 1;
            continue;
        };
        let label = month_label(&ts);
        for (bucket, months) in buckets.iter().zip(cells.iter_mut()) {
            if bucket.contains_path(path) {
                months.entry(label.clone()).or_default().bump(status);
            }
        }
    }
    if skipped > 0 {
        debug!(
            "Skipped {} of {} records with missing {:?} fields",
            skipped,
            records.len(),
            dimension
        );
    }

    let mut rows = Vec::with_capacity(buckets.len() * timeline.len());
    for (bucket, months) in buckets.iter().zip(cells) {
        for (label, counts) in months {
            rows.push(AggregateRow {
                bucket_id: bucket.id.clone(),
                bucket_name: bucket.name.clone(),
                pub_time_label: label,
                add_count: counts.added,
                revise_count: counts.revised,
                abolish_count: counts.abolished,
                total_count: counts.added + counts.revised + counts.abolished,
            });
        }
    }
    rows
}
