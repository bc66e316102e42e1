//! Hierarchy handling
//!
//! Flat node lists (each node pointing at its parent) are turned into
//! trees for tree pickers, and node selections are collapsed to the
//! minimal set of materialized-path prefixes used for filtering.

pub mod node;
pub mod paths;
pub mod tree;

pub use node::{HierarchyNode, NodeId};
pub use paths::{is_covered, reduce_start_paths};
pub use tree::{build_tree, dedup_by_id, HierarchyError, HierarchyResult, TreeNode};
