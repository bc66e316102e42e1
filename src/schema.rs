//! Collection schema descriptors
//!
//! Flow, rule and organization tables share a shape but not their column
//! names. A descriptor names the columns once and reads raw rows into the
//! typed records the rest of the crate works with.

use crate::hierarchy::{HierarchyNode, NodeId};
use crate::stats::record::HistoryRecord;
use crate::stats::release::ReleaseStatus;
use crate::stats::timeline::parse_timestamp;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A raw CMS item
pub type Row = Map<String, Value>;

fn field_string(row: &Row, field: &str) -> Option<String> {
    match row.get(field)? {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn field_i64(row: &Row, field: &str) -> Option<i64> {
    match row.get(field)? {
        Value::Number(n) => n.as_i64().or_else(|| n.as_f64().map(|f| f as i64)),
        Value::String(s) => s.trim().parse().ok(),
        Value::Bool(b) => Some(i64::from(*b)),
        _ => None,
    }
}

fn field_id(row: &Row, field: &str) -> Option<NodeId> {
    row.get(field).and_then(NodeId::from_json)
}

/// Columns of a hierarchy table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeSchema {
    pub collection: String,
    pub id_field: String,
    pub parent_field: String,
    pub name_field: String,
    pub path_field: String,
    pub sort_field: String,
    /// Parent id carried by top-level nodes
    #[serde(default = "default_root_id")]
    pub root_id: NodeId,
}

fn default_root_id() -> NodeId {
    NodeId::new("0")
}

impl NodeSchema {
    /// Process architecture (`jecn_flow_structure`)
    pub fn flows() -> Self {
        Self {
            collection: "jecn_flow_structure".to_string(),
            id_field: "FLOW_ID".to_string(),
            parent_field: "PRE_FLOW_ID".to_string(),
            name_field: "FLOW_NAME".to_string(),
            path_field: "T_PATH".to_string(),
            sort_field: "SORT_ID".to_string(),
            root_id: default_root_id(),
        }
    }

    /// Rule directories (`jecn_rule_t`)
    pub fn rules() -> Self {
        Self {
            collection: "jecn_rule_t".to_string(),
            id_field: "ID".to_string(),
            parent_field: "PER_ID".to_string(),
            name_field: "RULE_NAME".to_string(),
            ..Self::flows()
        }
    }

    /// Organizations (`jecn_flow_org`)
    pub fn orgs() -> Self {
        Self {
            collection: "jecn_flow_org".to_string(),
            id_field: "ORG_ID".to_string(),
            parent_field: "PER_ORG_ID".to_string(),
            name_field: "ORG_NAME".to_string(),
            ..Self::flows()
        }
    }

    /// Read a node; rows without an id are rejected, other gaps default
    pub fn read_node(&self, row: &Row) -> Option<HierarchyNode> {
        Some(HierarchyNode {
            id: field_id(row, &self.id_field)?,
            parent_id: field_id(row, &self.parent_field),
            name: field_string(row, &self.name_field).unwrap_or_default(),
            path: field_string(row, &self.path_field).unwrap_or_default(),
            sort: field_i64(row, &self.sort_field).unwrap_or(0),
        })
    }

    pub fn read_nodes(&self, rows: &[Row]) -> Vec<HierarchyNode> {
        rows.iter().filter_map(|row| self.read_node(row)).collect()
    }
}

/// Columns of a version-history table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistorySchema {
    pub collection: String,
    pub primary_key: String,
    pub entity_id_field: String,
    pub name_field: String,
    pub path_field: String,
    pub org_field: String,
    pub pub_time_field: String,
    pub status_field: String,
    pub confidentiality_field: String,
    pub sort_field: String,
}

impl HistorySchema {
    /// Flow history (`jecn_flow_structure_h`)
    pub fn flows() -> Self {
        Self {
            collection: "jecn_flow_structure_h".to_string(),
            primary_key: "GUID".to_string(),
            entity_id_field: "FLOW_ID".to_string(),
            name_field: "FLOW_NAME".to_string(),
            path_field: "T_PATH".to_string(),
            org_field: "ORG_ID".to_string(),
            pub_time_field: "PUB_TIME".to_string(),
            status_field: "release_status".to_string(),
            confidentiality_field: "CONFIDENTIALITY_LEVEL".to_string(),
            sort_field: "SORT_ID".to_string(),
        }
    }

    /// Rule history (`jecn_rule_history`)
    pub fn rules() -> Self {
        Self {
            collection: "jecn_rule_history".to_string(),
            entity_id_field: "ID".to_string(),
            name_field: "RULE_NAME".to_string(),
            ..Self::flows()
        }
    }

    /// Read a record; never fails, unreadable fields become `None`
    pub fn read_record(&self, row: &Row) -> HistoryRecord {
        HistoryRecord {
            key: field_id(row, &self.primary_key),
            entity_id: field_id(row, &self.entity_id_field),
            entity_name: field_string(row, &self.name_field),
            path: field_string(row, &self.path_field).filter(|p| !p.is_empty()),
            org_id: field_id(row, &self.org_field),
            org: None,
            published_at: field_string(row, &self.pub_time_field)
                .as_deref()
                .and_then(parse_timestamp),
            status: field_i64(row, &self.status_field).and_then(ReleaseStatus::from_code),
            confidentiality: field_i64(row, &self.confidentiality_field),
        }
    }

    pub fn read_records(&self, rows: &[Row]) -> Vec<HistoryRecord> {
        rows.iter().map(|row| self.read_record(row)).collect()
    }
}
