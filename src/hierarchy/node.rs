//! Hierarchy node and identifier types

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

/// Identifier of a hierarchy node or history entity.
///
/// CMS tables mix numeric and string keys, so identifiers are kept in
/// their canonical string form. `1`, `1.0` and `"1"` all become `"1"`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, PartialOrd, Ord)]
#[serde(transparent)]
pub struct NodeId(String);

impl NodeId {
    pub fn new(id: impl Into<String>) -> Self {
        NodeId(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Read an identifier from a JSON value. Nulls, empty strings and
    /// non-scalar values yield `None`.
    pub fn from_json(value: &Value) -> Option<Self> {
        match value {
            Value::String(s) if !s.trim().is_empty() => Some(NodeId(s.trim().to_string())),
            Value::Number(n) => {
                if let Some(i) = n.as_i64() {
                    Some(NodeId(i.to_string()))
                } else if let Some(u) = n.as_u64() {
                    Some(NodeId(u.to_string()))
                } else {
                    let f = n.as_f64()?;
                    if f.fract() == 0.0 && f.is_finite() {
                        Some(NodeId(format!("{}", f as i64)))
                    } else {
                        Some(NodeId(n.to_string()))
                    }
                }
            }
            _ => None,
        }
    }

    /// JSON form used in filter expressions: integers go out as numbers
    /// so the CMS compares them against integer columns.
    pub fn to_json(&self) -> Value {
        match self.0.parse::<i64>() {
            Ok(i) => Value::from(i),
            Err(_) => Value::String(self.0.clone()),
        }
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for NodeId {
    fn from(id: &str) -> Self {
        NodeId(id.to_string())
    }
}

impl From<String> for NodeId {
    fn from(id: String) -> Self {
        NodeId(id)
    }
}

impl From<i64> for NodeId {
    fn from(id: i64) -> Self {
        NodeId(id.to_string())
    }
}

/// A node of a flow, rule or organization hierarchy
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HierarchyNode {
    pub id: NodeId,
    /// `None` when the row carries no parent reference; such nodes are roots
    pub parent_id: Option<NodeId>,
    pub name: String,
    /// Materialized path; every ancestor's path is a prefix of it
    pub path: String,
    pub sort: i64,
}

impl HierarchyNode {
    pub fn new(
        id: impl Into<NodeId>,
        parent_id: impl Into<NodeId>,
        name: impl Into<String>,
        path: impl Into<String>,
        sort: i64,
    ) -> Self {
        Self {
            id: id.into(),
            parent_id: Some(parent_id.into()),
            name: name.into(),
            path: path.into(),
            sort,
        }
    }

    /// Whether this node hangs directly off the given root key
    pub fn is_root(&self, root: &NodeId) -> bool {
        self.parent_id.as_ref().map_or(true, |parent| parent == root)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_node_id_from_json() {
        assert_eq!(NodeId::from_json(&json!(12)), Some(NodeId::new("12")));
        assert_eq!(NodeId::from_json(&json!(12.0)), Some(NodeId::new("12")));
        assert_eq!(NodeId::from_json(&json!("a-guid")), Some(NodeId::new("a-guid")));
        assert_eq!(NodeId::from_json(&json!("")), None);
        assert_eq!(NodeId::from_json(&json!(null)), None);
        assert_eq!(NodeId::from_json(&json!([1])), None);
    }

    #[test]
    fn test_node_id_to_json() {
        assert_eq!(NodeId::new("42").to_json(), json!(42));
        assert_eq!(NodeId::new("x42").to_json(), json!("x42"));
    }

    #[test]
    fn test_is_root() {
        let root = NodeId::new("0");
        let top = HierarchyNode::new("1", "0", "Top", "001", 1);
        let child = HierarchyNode::new("2", "1", "Child", "001002", 1);
        let mut loose = child.clone();
        loose.parent_id = None;

        assert!(top.is_root(&root));
        assert!(!child.is_root(&root));
        assert!(loose.is_root(&root));
    }
}
