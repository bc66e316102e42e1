//! Dashboard session
//!
//! One reporting session over an injected [`CmsClient`]:
//!
//! ```text
//! Idle --load--> Ready --search--> Loading --> Results --drill_down--> Drilldown
//! ```
//!
//! Hierarchies are fetched once by [`Dashboard::load`] and cached. Every
//! search replaces the previous result set; a failed search restores the
//! previous state and reports the error.

use chrono::Utc;
use serde::Serialize;
use thiserror::Error;
use tracing::{debug, info, warn};

use pubstat::filter::{history_filter, org_filter, related_orgs_filter};
use pubstat::stats::{attach_orgs, related_org_ids};
use pubstat::{
    aggregate, build_tree, dedup_by_id, drill_down, select_rows, statistical_buckets,
    AggregateRow, Bucket, Config, Dimension, Drilldown, Filter, HierarchyError, HierarchyNode,
    HistoryRecord, HistorySchema, NodeId, NodeSchema, SearchCriteria, TimeRange, Timeline,
    TreeNode,
};

use crate::client::CmsClient;
use crate::error::SdkError;
use crate::models::Query;

/// Months covered when a search sets no time range
pub const DEFAULT_WINDOW_MONTHS: u32 = 12;

/// Dashboard errors
#[derive(Error, Debug)]
pub enum DashboardError {
    #[error(transparent)]
    Sdk(#[from] SdkError),

    #[error(transparent)]
    Hierarchy(#[from] HierarchyError),

    #[error("Hierarchies not loaded: call load first")]
    NotLoaded,

    #[error("No search results to drill into")]
    NoResults,
}

pub type DashboardResult<T> = Result<T, DashboardError>;

/// Session state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DashboardState {
    Idle,
    Ready,
    Loading,
    Results,
    Drilldown,
}

/// The three collections a dashboard reads
#[derive(Debug, Clone, PartialEq)]
pub struct DashboardProfile {
    pub entities: NodeSchema,
    pub history: HistorySchema,
    pub orgs: NodeSchema,
}

impl DashboardProfile {
    pub fn flows() -> Self {
        Self {
            entities: NodeSchema::flows(),
            history: HistorySchema::flows(),
            orgs: NodeSchema::orgs(),
        }
    }

    pub fn rules() -> Self {
        Self {
            entities: NodeSchema::rules(),
            history: HistorySchema::rules(),
            orgs: NodeSchema::orgs(),
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self {
            entities: config.entity_schema(),
            history: config.history_schema(),
            orgs: config.org_schema(),
        }
    }
}

impl Default for DashboardProfile {
    fn default() -> Self {
        Self::flows()
    }
}

/// Outcome of one search
#[derive(Debug, Clone, Serialize)]
pub struct SearchResults {
    pub records: Vec<HistoryRecord>,
    pub timeline: Timeline,
    pub entity_buckets: Vec<Bucket>,
    pub org_buckets: Vec<Bucket>,
    pub by_entity: Vec<AggregateRow>,
    pub by_org: Vec<AggregateRow>,
}

impl SearchResults {
    pub fn rows(&self, dimension: Dimension) -> &[AggregateRow] {
        match dimension {
            Dimension::Entity => &self.by_entity,
            Dimension::Organization => &self.by_org,
        }
    }
}

/// A reporting session
pub struct Dashboard<C: CmsClient> {
    client: C,
    profile: DashboardProfile,
    state: DashboardState,
    entities: Vec<HierarchyNode>,
    orgs: Vec<HierarchyNode>,
    results: Option<SearchResults>,
    drilldown: Option<Drilldown>,
}

impl<C: CmsClient> Dashboard<C> {
    pub fn new(client: C, profile: DashboardProfile) -> Self {
        Self {
            client,
            profile,
            state: DashboardState::Idle,
            entities: Vec::new(),
            orgs: Vec::new(),
            results: None,
            drilldown: None,
        }
    }

    pub fn client(&self) -> &C {
        &self.client
    }

    pub fn profile(&self) -> &DashboardProfile {
        &self.profile
    }

    pub fn state(&self) -> DashboardState {
        self.state
    }

    pub fn entities(&self) -> &[HierarchyNode] {
        &self.entities
    }

    pub fn orgs(&self) -> &[HierarchyNode] {
        &self.orgs
    }

    pub fn results(&self) -> Option<&SearchResults> {
        self.results.as_ref()
    }

    pub fn current_drilldown(&self) -> Option<&Drilldown> {
        self.drilldown.as_ref()
    }

    /// Fetch and cache both hierarchies. The client must be logged in.
    pub async fn load(&mut self) -> DashboardResult<()> {
        if !self.client.is_authenticated().await {
            return Err(SdkError::NotAuthenticated.into());
        }

        let entities = self.fetch_nodes(&self.profile.entities, None).await?;
        let orgs = self.fetch_nodes(&self.profile.orgs, None).await?;
        info!(
            "Loaded {} entity nodes and {} organizations",
            entities.len(),
            orgs.len()
        );

        self.entities = entities;
        self.orgs = orgs;
        if self.state == DashboardState::Idle {
            self.state = DashboardState::Ready;
        }
        Ok(())
    }

    /// Tree of the entity hierarchy
    pub fn entity_tree(&self) -> DashboardResult<Vec<TreeNode>> {
        Ok(build_tree(&self.entities, &self.profile.entities.root_id)?)
    }

    /// Tree of the organization hierarchy
    pub fn org_tree(&self) -> DashboardResult<Vec<TreeNode>> {
        Ok(build_tree(&self.orgs, &self.profile.orgs.root_id)?)
    }

    /// Run a search and aggregate by entity and by organization
    pub async fn search(&mut self, criteria: &SearchCriteria) -> DashboardResult<&SearchResults> {
        self.run(criteria, None).await
    }

    /// Like [`Dashboard::search`], restricted to history rows with the given primary keys
    pub async fn search_by_keys(
        &mut self,
        keys: &[NodeId],
        criteria: &SearchCriteria,
    ) -> DashboardResult<&SearchResults> {
        self.run(criteria, Some(keys)).await
    }

    /// Drill into the rows of one bucket and/or month label
    pub fn drill_down(
        &mut self,
        dimension: Dimension,
        bucket: Option<&NodeId>,
        label: Option<&str>,
    ) -> DashboardResult<&Drilldown> {
        let results = self.results.as_ref().ok_or(DashboardError::NoResults)?;
        let rows = select_rows(results.rows(dimension), bucket, label);
        debug!("Drilling into {} {:?} rows", rows.len(), dimension);

        self.state = DashboardState::Drilldown;
        Ok(&*self.drilldown.insert(drill_down(&rows)))
    }

    async fn run(
        &mut self,
        criteria: &SearchCriteria,
        keys: Option<&[NodeId]>,
    ) -> DashboardResult<&SearchResults> {
        if self.state == DashboardState::Idle {
            return Err(DashboardError::NotLoaded);
        }

        let previous = self.state;
        self.state = DashboardState::Loading;
        match self.collect(criteria, keys).await {
            Ok(results) => {
                info!(
                    "Search matched {} records over {} months",
                    results.records.len(),
                    results.timeline.len()
                );
                self.drilldown = None;
                self.state = DashboardState::Results;
                Ok(&*self.results.insert(results))
            }
            Err(e) => {
                warn!("Search failed: {}", e);
                self.state = previous;
                Err(e)
            }
        }
    }

    async fn collect(
        &self,
        criteria: &SearchCriteria,
        keys: Option<&[NodeId]>,
    ) -> DashboardResult<SearchResults> {
        let history = &self.profile.history;
        let entity_buckets = statistical_buckets(
            &self.entities,
            &criteria.entities,
            &self.profile.entities.root_id,
        );
        let org_buckets =
            statistical_buckets(&self.orgs, &criteria.orgs, &self.profile.orgs.root_id);
        let entity_paths: Vec<String> = entity_buckets.iter().map(|b| b.path.clone()).collect();

        let (mut records, orgs) = if criteria.orgs.is_empty() {
            let filter = history_filter(
                history,
                &entity_paths,
                criteria.entity_path_match(),
                None,
                &criteria.filters,
            );
            let records = self.fetch_history(filter, keys).await?;
            let related = related_org_ids(&records);
            let orgs = match related_orgs_filter(&self.profile.orgs, &related) {
                Some(filter) => self.fetch_nodes(&self.profile.orgs, Some(filter)).await?,
                None => Vec::new(),
            };
            (records, orgs)
        } else {
            let org_paths: Vec<String> = org_buckets.iter().map(|b| b.path.clone()).collect();
            let filter = org_filter(&self.profile.orgs, &org_paths, criteria.org_path_match());
            let orgs = self.fetch_nodes(&self.profile.orgs, Some(filter)).await?;
            let org_ids: Vec<NodeId> = orgs.iter().map(|o| o.id.clone()).collect();
            let filter = history_filter(
                history,
                &entity_paths,
                criteria.entity_path_match(),
                Some(&org_ids),
                &criteria.filters,
            );
            (self.fetch_history(filter, keys).await?, orgs)
        };
        attach_orgs(&mut records, &orgs);

        let range = criteria.filters.time_range.unwrap_or_else(|| {
            TimeRange::last_months(Utc::now().naive_utc(), DEFAULT_WINDOW_MONTHS)
        });
        let timeline = Timeline::from_range(&range);
        let by_entity = aggregate(&entity_buckets, &records, Dimension::Entity, &timeline);
        let by_org = aggregate(&org_buckets, &records, Dimension::Organization, &timeline);

        Ok(SearchResults {
            records,
            timeline,
            entity_buckets,
            org_buckets,
            by_entity,
            by_org,
        })
    }

    async fn fetch_nodes(
        &self,
        schema: &NodeSchema,
        filter: Option<Filter>,
    ) -> DashboardResult<Vec<HierarchyNode>> {
        let mut query = Query::all_sorted(&schema.sort_field);
        query.filter = filter;
        let rows = self.client.read_by_query(&schema.collection, &query).await?;
        Ok(dedup_by_id(schema.read_nodes(&rows)))
    }

    async fn fetch_history(
        &self,
        filter: Filter,
        keys: Option<&[NodeId]>,
    ) -> DashboardResult<Vec<HistoryRecord>> {
        let history = &self.profile.history;
        let query = Query::all_sorted(&history.sort_field).with_filter(filter);
        let rows = match keys {
            Some(keys) => {
                self.client
                    .read_many(&history.collection, &history.primary_key, keys, &query)
                    .await?
            }
            None => self.client.read_by_query(&history.collection, &query).await?,
        };
        Ok(history.read_records(&rows))
    }
}
