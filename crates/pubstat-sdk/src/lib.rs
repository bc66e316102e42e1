//! Pubstat SDK: CMS access and dashboard sessions
//!
//! Provides two client implementations:
//!
//! - **`RemoteClient`**: talks to a Directus instance over HTTP. For
//!   production use.
//!
//! - **`EmbeddedClient`**: in-process collections, no network. Ideal for
//!   tests, demos and offline runs over exported data.
//!
//! Both implement the `CmsClient` trait, and a [`Dashboard`] drives either
//! of them through load, search and drill-down.
//!
//! # Quick Start
//!
//! ```rust
//! use pubstat_sdk::{CmsClient, Dashboard, DashboardProfile, EmbeddedClient, SearchCriteria};
//! use serde_json::json;
//!
//! #[tokio::main]
//! async fn main() {
//!     let client = EmbeddedClient::new();
//!     client.insert("jecn_flow_structure", vec![
//!         json!({"FLOW_ID": 1, "PRE_FLOW_ID": 0, "FLOW_NAME": "Sales", "T_PATH": "001", "SORT_ID": 1}),
//!     ]).await;
//!     client.insert("jecn_flow_org", vec![]).await;
//!     client.insert("jecn_flow_structure_h", vec![]).await;
//!     client.login("admin@example.com", "secret").await.unwrap();
//!
//!     let mut dashboard = Dashboard::new(client, DashboardProfile::flows());
//!     dashboard.load().await.unwrap();
//!     let results = dashboard.search(&SearchCriteria::default()).await.unwrap();
//!     println!("{} rows by entity", results.by_entity.len());
//! }
//! ```

pub mod client;
pub mod dashboard;
pub mod embedded;
pub mod error;
pub mod models;
pub mod remote;

// ============================================================
// Core SDK types
// ============================================================

pub use client::CmsClient;
pub use dashboard::{
    Dashboard, DashboardError, DashboardProfile, DashboardResult, DashboardState, SearchResults,
    DEFAULT_WINDOW_MONTHS,
};
pub use embedded::EmbeddedClient;
pub use error::{SdkError, SdkResult};
pub use models::{ErrorResponse, ItemsResponse, LoginResponse, Query};
pub use remote::RemoteClient;

// ============================================================
// Core types (re-exported from pubstat)
// ============================================================

pub use pubstat::{
    AggregateRow, Bucket, Config, Dimension, Drilldown, DrilldownBar, Filter, FilterCriteria,
    HierarchyNode, HistoryRecord, HistorySchema, MonthTotal, NodeId, NodeSchema, PathMatch,
    Profile, ReleaseStatus, Row, SearchCriteria, ServerSettings, TimeRange, Timeline, TreeNode,
    VERSION,
};
