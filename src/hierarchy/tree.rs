//! Flat list to tree conversion

use super::node::{HierarchyNode, NodeId};
use serde::Serialize;
use std::collections::{HashMap, HashSet};
use thiserror::Error;

/// Hierarchy errors
#[derive(Error, Debug, PartialEq)]
pub enum HierarchyError {
    /// A node was reached twice while walking down from the roots
    #[error("Cyclic hierarchy at node {id}")]
    Cycle { id: NodeId },
}

pub type HierarchyResult<T> = Result<T, HierarchyError>;

/// A node with its direct children, as consumed by tree pickers
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TreeNode {
    pub key: NodeId,
    pub title: String,
    pub path: String,
    #[serde(rename = "sortId")]
    pub sort: i64,
    pub children: Vec<TreeNode>,
}

impl TreeNode {
    fn leaf(node: &HierarchyNode) -> Self {
        Self {
            key: node.id.clone(),
            title: node.name.clone(),
            path: node.path.clone(),
            sort: node.sort,
            children: Vec::new(),
        }
    }

    /// Number of nodes in this subtree, including itself
    pub fn count(&self) -> usize {
        1 + self.children.iter().map(TreeNode::count).sum::<usize>()
    }

    /// Depth-first walk yielding `(depth, node)` pairs
    pub fn walk(&self) -> Vec<(usize, &TreeNode)> {
        let mut out = Vec::new();
        let mut stack = vec![(0usize, self)];
        while let Some((depth, node)) = stack.pop() {
            out.push((depth, node));
            for child in node.children.iter().rev() {
                stack.push((depth + 1, child));
            }
        }
        out
    }
}

/// Keep the first node for every identifier.
///
/// History tables hold one row per published version of a node; the tree
/// picker only wants one entry per node.
pub fn dedup_by_id(nodes: Vec<HierarchyNode>) -> Vec<HierarchyNode> {
    let mut seen = HashSet::new();
    nodes
        .into_iter()
        .filter(|node| seen.insert(node.id.clone()))
        .collect()
}

/// Build a forest from a flat node list.
///
/// Roots are nodes whose parent is `root` (or missing). Every node's
/// children are sorted by `sort`, ties keep input order. Nodes whose
/// parent cannot be reached from a root are dropped.
pub fn build_tree(nodes: &[HierarchyNode], root: &NodeId) -> HierarchyResult<Vec<TreeNode>> {
    if nodes.is_empty() {
        return Ok(Vec::new());
    }

    let mut roots = Vec::new();
    let mut children_of: HashMap<&NodeId, Vec<usize>> = HashMap::new();
    for (idx, node) in nodes.iter().enumerate() {
        if node.is_root(root) {
            roots.push(idx);
        }
        if let Some(parent) = &node.parent_id {
            children_of.entry(parent).or_default().push(idx);
        }
    }
    roots.sort_by_key(|&idx| nodes[idx].sort);
    for children in children_of.values_mut() {
        children.sort_by_key(|&idx| nodes[idx].sort);
    }

    // Walk down from the roots. Keys are looked up by id, so duplicated
    // ids or a node keyed like the root can lead back to a visited node.
    let mut visited = vec![false; nodes.len()];
    let mut order = Vec::with_capacity(nodes.len());
    let mut stack: Vec<usize> = roots.iter().rev().copied().collect();
    while let Some(idx) = stack.pop() {
        if visited[idx] {
            return Err(HierarchyError::Cycle {
                id: nodes[idx].id.clone(),
            });
        }
        visited[idx] = true;
        order.push(idx);
        if let Some(children) = children_of.get(&nodes[idx].id) {
            stack.extend(children.iter().rev());
        }
    }

    // Children always come after their parent in `order`
    let mut built: HashMap<usize, TreeNode> = HashMap::with_capacity(order.len());
    for &idx in order.iter().rev() {
        let mut tree = TreeNode::leaf(&nodes[idx]);
        if let Some(children) = children_of.get(&nodes[idx].id) {
            tree.children = children
                .iter()
                .filter_map(|child| built.remove(child))
                .collect();
        }
        built.insert(idx, tree);
    }

    Ok(roots.iter().filter_map(|idx| built.remove(idx)).collect())
}
