//! CmsClient trait: the unified interface for embedded and remote modes

use async_trait::async_trait;
use pubstat::{Filter, NodeId, Row};

use crate::error::SdkResult;
use crate::models::Query;

/// Read access to CMS collections.
///
/// Implemented by:
/// - `RemoteClient`: a Directus instance over HTTP
/// - `EmbeddedClient`: in-memory collections (tests, demos)
#[async_trait]
pub trait CmsClient: Send + Sync {
    /// Exchange credentials for a session; required before any read
    async fn login(&self, email: &str, password: &str) -> SdkResult<()>;

    /// Whether a session is established
    async fn is_authenticated(&self) -> bool;

    /// Rows of `collection` matching the query
    async fn read_by_query(&self, collection: &str, query: &Query) -> SdkResult<Vec<Row>>;

    /// Rows whose primary key is in `keys`, further restricted by the query filter
    async fn read_many(
        &self,
        collection: &str,
        primary_key: &str,
        keys: &[NodeId],
        query: &Query,
    ) -> SdkResult<Vec<Row>> {
        let by_key = Filter::is_in(primary_key, keys.iter().map(NodeId::to_json).collect());
        let filter = match &query.filter {
            Some(extra) => by_key.and(extra.clone()),
            None => by_key,
        };
        let query = query.clone().with_filter(filter);
        self.read_by_query(collection, &query).await
    }
}
