//! Translation of a dashboard selection into filter expressions

use super::Filter;
use crate::hierarchy::NodeId;
use crate::schema::{HistorySchema, NodeSchema};
use crate::stats::release::ReleaseStatus;
use crate::stats::timeline::{format_timestamp, TimeRange};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// How a start path selects rows
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PathMatch {
    /// Only the node itself
    Exact,
    /// The node and all its descendants
    #[default]
    Subtree,
}

/// Restrictions that apply regardless of the hierarchy selection
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FilterCriteria {
    pub time_range: Option<TimeRange>,
    pub release_status: Option<ReleaseStatus>,
    pub confidentiality: Option<i64>,
}

/// Everything a search needs from the user
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchCriteria {
    /// Selected flow or rule nodes; empty means all roots
    pub entities: Vec<NodeId>,
    /// Match the selected entity nodes' descendants as well
    pub include_descendants: bool,
    /// Selected organizations; empty means no organization restriction
    pub orgs: Vec<NodeId>,
    /// Match sub-organizations of the selected organizations
    pub include_sub_orgs: bool,
    #[serde(flatten)]
    pub filters: FilterCriteria,
}

impl Default for SearchCriteria {
    fn default() -> Self {
        Self {
            entities: Vec::new(),
            include_descendants: false,
            orgs: Vec::new(),
            include_sub_orgs: true,
            filters: FilterCriteria::default(),
        }
    }
}

impl SearchCriteria {
    /// Path mode for the entity dimension. Without a selection the root
    /// paths are used, which only make sense with their subtrees.
    pub fn entity_path_match(&self) -> PathMatch {
        if self.include_descendants || self.entities.is_empty() {
            PathMatch::Subtree
        } else {
            PathMatch::Exact
        }
    }

    pub fn org_path_match(&self) -> PathMatch {
        if self.include_sub_orgs {
            PathMatch::Subtree
        } else {
            PathMatch::Exact
        }
    }
}

/// Disjunction with one clause per start path
pub fn path_filter(field: &str, paths: &[String], mode: PathMatch) -> Filter {
    Filter::Or(
        paths
            .iter()
            .map(|path| match mode {
                PathMatch::Exact => Filter::eq(field, path.as_str()),
                PathMatch::Subtree => Filter::starts_with(field, path.as_str()),
            })
            .collect(),
    )
}

/// Filter for history rows.
///
/// Clauses, in order: confidentiality, release status, organization
/// membership, start paths, then the inclusive time window. Absent
/// criteria add nothing.
pub fn history_filter(
    schema: &HistorySchema,
    paths: &[String],
    mode: PathMatch,
    org_ids: Option<&[NodeId]>,
    criteria: &FilterCriteria,
) -> Filter {
    let mut clauses = Vec::new();

    if let Some(level) = criteria.confidentiality {
        clauses.push(Filter::eq(&schema.confidentiality_field, level));
    }
    if let Some(status) = criteria.release_status {
        clauses.push(Filter::eq(&schema.status_field, status.code()));
    }
    if let Some(ids) = org_ids {
        clauses.push(Filter::is_in(
            &schema.org_field,
            ids.iter().map(NodeId::to_json).collect(),
        ));
    }
    clauses.push(path_filter(&schema.path_field, paths, mode));
    if let Some(range) = &criteria.time_range {
        clauses.push(Filter::gte(
            &schema.pub_time_field,
            format_timestamp(&range.start),
        ));
        clauses.push(Filter::lte(
            &schema.pub_time_field,
            format_timestamp(&range.end),
        ));
    }

    Filter::And(clauses)
}

/// Filter for organizations under the selected organization paths
pub fn org_filter(schema: &NodeSchema, paths: &[String], mode: PathMatch) -> Filter {
    path_filter(&schema.path_field, paths, mode)
}

/// Filter for the organizations referenced by fetched records.
/// `None` when there are no ids, meaning "no restriction".
pub fn related_orgs_filter(schema: &NodeSchema, ids: &[NodeId]) -> Option<Filter> {
    if ids.is_empty() {
        return None;
    }
    let values: Vec<Value> = ids.iter().map(NodeId::to_json).collect();
    Some(Filter::is_in(&schema.id_field, values))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stats::timeline::parse_timestamp;
    use serde_json::json;

    fn paths(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_path_modes() {
        let p = paths(&["001"]);
        assert_eq!(
            path_filter("T_PATH", &p, PathMatch::Exact).to_json(),
            json!({"_or": [{"T_PATH": {"_eq": "001"}}]})
        );
        assert_eq!(
            path_filter("T_PATH", &p, PathMatch::Subtree).to_json(),
            json!({"_or": [{"T_PATH": {"_starts_with": "001"}}]})
        );
    }

    #[test]
    fn test_minimal_history_filter() {
        let filter = history_filter(
            &HistorySchema::flows(),
            &paths(&["001", "002"]),
            PathMatch::Subtree,
            None,
            &FilterCriteria::default(),
        );
        assert_eq!(
            filter.to_json(),
            json!({"_and": [{"_or": [
                {"T_PATH": {"_starts_with": "001"}},
                {"T_PATH": {"_starts_with": "002"}}
            ]}]})
        );
    }

    #[test]
    fn test_full_history_filter() {
        let range = TimeRange::new(
            parse_timestamp("2023-01-01").unwrap(),
            parse_timestamp("2023-06-30T23:59:59").unwrap(),
        )
        .unwrap();
        let criteria = FilterCriteria {
            time_range: Some(range),
            release_status: Some(ReleaseStatus::Abolished),
            confidentiality: Some(1),
        };
        let orgs = vec![NodeId::new("10"), NodeId::new("11")];
        let filter = history_filter(
            &HistorySchema::rules(),
            &paths(&["003"]),
            PathMatch::Exact,
            Some(&orgs),
            &criteria,
        );
        assert_eq!(
            filter.to_json(),
            json!({"_and": [
                {"CONFIDENTIALITY_LEVEL": {"_eq": 1}},
                {"release_status": {"_eq": 2}},
                {"ORG_ID": {"_in": [10, 11]}},
                {"_or": [{"T_PATH": {"_eq": "003"}}]},
                {"PUB_TIME": {"_gte": "2023-01-01T00:00:00"}},
                {"PUB_TIME": {"_lte": "2023-06-30T23:59:59"}}
            ]})
        );
    }

    #[test]
    fn test_related_orgs_filter() {
        let schema = NodeSchema::orgs();
        assert!(related_orgs_filter(&schema, &[]).is_none());
        let filter = related_orgs_filter(&schema, &[NodeId::new("5")]).unwrap();
        assert_eq!(filter.to_json(), json!({"ORG_ID": {"_in": [5]}}));
    }

    #[test]
    fn test_path_match_defaults() {
        let mut criteria = SearchCriteria::default();
        assert_eq!(criteria.entity_path_match(), PathMatch::Subtree);
        assert_eq!(criteria.org_path_match(), PathMatch::Subtree);

        criteria.entities.push(NodeId::new("1"));
        assert_eq!(criteria.entity_path_match(), PathMatch::Exact);
        criteria.include_descendants = true;
        assert_eq!(criteria.entity_path_match(), PathMatch::Subtree);

        criteria.include_sub_orgs = false;
        assert_eq!(criteria.org_path_match(), PathMatch::Exact);
    }
}
