//! Publication statistics
//!
//! Month timelines, history records, per-bucket aggregation and the
//! drill-down reshaping that feeds the secondary chart.

pub mod aggregate;
pub mod drilldown;
pub mod record;
pub mod release;
pub mod timeline;

pub use aggregate::{aggregate, statistical_buckets, AggregateRow, Bucket, Dimension};
pub use drilldown::{drill_down, select_rows, Drilldown, DrilldownBar, MonthTotal};
pub use record::{attach_orgs, related_org_ids, HistoryRecord, OrgRef};
pub use release::ReleaseStatus;
pub use timeline::{month_label, parse_timestamp, TimeError, TimeRange, Timeline};
