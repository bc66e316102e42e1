//! Pubstat
//!
//! Publication statistics over the version history of materialized-path
//! hierarchies (process architectures, rule directories, organizations)
//! kept in a Directus CMS.
//!
//! The crate is the pure, synchronous core. Fetching is done by
//! `pubstat-sdk`, which feeds rows through the pieces defined here:
//!
//! - [`hierarchy`]: flat node lists to trees, start-path reduction
//! - [`filter`]: Directus filter expressions and their local evaluation
//! - [`schema`]: field-name descriptors that read raw CMS rows
//! - [`stats`]: month timelines, per-bucket aggregation, drill-down
//! - [`config`]: YAML configuration with environment overrides
//!
//! ## Example Usage
//!
//! ```rust
//! use pubstat::hierarchy::reduce_start_paths;
//!
//! let paths = reduce_start_paths(["001", "001002", "002"]);
//! assert_eq!(paths, vec!["001".to_string(), "002".to_string()]);
//! ```

#![warn(clippy::all)]

pub mod config;
pub mod filter;
pub mod hierarchy;
pub mod schema;
pub mod stats;

pub use config::{Config, ConfigError, ConfigResult, Profile, ServerSettings};
pub use filter::{Filter, FilterCriteria, PathMatch, Predicate, SearchCriteria};
pub use hierarchy::{
    build_tree, dedup_by_id, reduce_start_paths, HierarchyError, HierarchyNode, HierarchyResult,
    NodeId, TreeNode,
};
pub use schema::{HistorySchema, NodeSchema, Row};
pub use stats::{
    aggregate, drill_down, select_rows, statistical_buckets, AggregateRow, Bucket, Dimension,
    Drilldown, DrilldownBar, HistoryRecord, MonthTotal, OrgRef, ReleaseStatus, TimeError,
    TimeRange, Timeline,
};

/// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Get version string
pub fn version() -> &'static str {
    VERSION
}
