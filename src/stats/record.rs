//! History records

use crate::hierarchy::{HierarchyNode, NodeId};
use crate::stats::release::ReleaseStatus;
use chrono::NaiveDateTime;
use serde::Serialize;
use std::collections::HashMap;

/// Organization a record is attached to
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OrgRef {
    pub id: NodeId,
    pub name: String,
    pub path: String,
}

impl From<&HierarchyNode> for OrgRef {
    fn from(node: &HierarchyNode) -> Self {
        Self {
            id: node.id.clone(),
            name: node.name.clone(),
            path: node.path.clone(),
        }
    }
}

/// One published version of a flow or rule.
///
/// Every field is optional: rows with missing or mistyped columns still
/// load, and aggregation treats the gaps as absent values.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct HistoryRecord {
    pub key: Option<NodeId>,
    pub entity_id: Option<NodeId>,
    pub entity_name: Option<String>,
    pub path: Option<String>,
    pub org_id: Option<NodeId>,
    pub org: Option<OrgRef>,
    pub published_at: Option<NaiveDateTime>,
    pub status: Option<ReleaseStatus>,
    pub confidentiality: Option<i64>,
}

/// Attach each record's organization node, looked up by `org_id`.
/// Records without a matching organization keep `org = None`.
pub fn attach_orgs(records: &mut [HistoryRecord], orgs: &[HierarchyNode]) {
    let by_id: HashMap<&NodeId, &HierarchyNode> = orgs.iter().map(|o| (&o.id, o)).collect();
    for record in records.iter_mut() {
        record.org = record
            .org_id
            .as_ref()
            .and_then(|id| by_id.get(id))
            .map(|node| OrgRef::from(*node));
    }
}

/// Distinct organization ids referenced by the records, in first-seen order
pub fn related_org_ids(records: &[HistoryRecord]) -> Vec<NodeId> {
    let mut seen = std::collections::HashSet::new();
    records
        .iter()
        .filter_map(|r| r.org_id.clone())
        .filter(|id| seen.insert(id.clone()))
        .collect()
}
