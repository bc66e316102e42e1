//! EmbeddedClient: in-process CMS stand-in
//!
//! Keeps collections in memory and evaluates filters, sorting and limits
//! locally, with the same login gate as the remote client.

use async_trait::async_trait;
use serde_json::Value;
use std::cmp::Ordering;
use std::collections::HashMap;
use tokio::sync::RwLock;
use tracing::debug;

use pubstat::Row;

use crate::client::CmsClient;
use crate::error::{SdkError, SdkResult};
use crate::models::Query;

/// In-memory client.
///
/// No network. Ideal for examples, tests and offline demos.
pub struct EmbeddedClient {
    collections: RwLock<HashMap<String, Vec<Row>>>,
    credentials: Option<(String, String)>,
    authenticated: RwLock<bool>,
}

impl EmbeddedClient {
    /// Create an EmbeddedClient that accepts any credentials
    pub fn new() -> Self {
        Self {
            collections: RwLock::new(HashMap::new()),
            credentials: None,
            authenticated: RwLock::new(false),
        }
    }

    /// Only accept this email and password at login
    pub fn with_credentials(mut self, email: &str, password: &str) -> Self {
        self.credentials = Some((email.to_string(), password.to_string()));
        self
    }

    /// Replace a collection's rows. Non-object values are ignored.
    pub async fn insert(&self, collection: &str, rows: Vec<Value>) {
        let rows: Vec<Row> = rows
            .into_iter()
            .filter_map(|v| match v {
                Value::Object(map) => Some(map),
                _ => None,
            })
            .collect();
        debug!("Loaded {} rows into {}", rows.len(), collection);
        self.collections
            .write()
            .await
            .insert(collection.to_string(), rows);
    }

    /// Number of rows stored in a collection
    pub async fn row_count(&self, collection: &str) -> usize {
        self.collections
            .read()
            .await
            .get(collection)
            .map_or(0, Vec::len)
    }
}

impl Default for EmbeddedClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CmsClient for EmbeddedClient {
    async fn login(&self, email: &str, password: &str) -> SdkResult<()> {
        if let Some((expected_email, expected_password)) = &self.credentials {
            if email != expected_email || password != expected_password {
                return Err(SdkError::ApiError {
                    status: 401,
                    message: "Invalid user credentials.".to_string(),
                });
            }
        }
        *self.authenticated.write().await = true;
        Ok(())
    }

    async fn is_authenticated(&self) -> bool {
        *self.authenticated.read().await
    }

    async fn read_by_query(&self, collection: &str, query: &Query) -> SdkResult<Vec<Row>> {
        if !self.is_authenticated().await {
            return Err(SdkError::NotAuthenticated);
        }

        let collections = self.collections.read().await;
        let rows = collections
            .get(collection)
            .ok_or_else(|| SdkError::UnknownCollection(collection.to_string()))?;

        let mut result: Vec<Row> = rows
            .iter()
            .filter(|row| query.filter.as_ref().map_or(true, |f| f.matches(row)))
            .cloned()
            .collect();

        if !query.sort.is_empty() {
            result.sort_by(|a, b| compare_rows(a, b, &query.sort));
        }
        if query.limit >= 0 {
            result.truncate(query.limit as usize);
        }

        debug!("{} of {} rows from {}", result.len(), rows.len(), collection);
        Ok(result)
    }
}

fn compare_rows(a: &Row, b: &Row, sort: &[String]) -> Ordering {
    for key in sort {
        let (field, descending) = match key.strip_prefix('-') {
            Some(field) => (field, true),
            None => (key.as_str(), false),
        };
        let ordering = compare_sort_values(
            a.get(field).unwrap_or(&Value::Null),
            b.get(field).unwrap_or(&Value::Null),
        );
        let ordering = if descending { ordering.reverse() } else { ordering };
        if ordering != Ordering::Equal {
            return ordering;
        }
    }
    Ordering::Equal
}

/// Nulls first, then numbers, then strings
fn compare_sort_values(a: &Value, b: &Value) -> Ordering {
    match (a, b) {
        (Value::Null, Value::Null) => Ordering::Equal,
        (Value::Null, _) => Ordering::Less,
        (_, Value::Null) => Ordering::Greater,
        (Value::Number(x), Value::Number(y)) => {
            let (x, y) = (x.as_f64().unwrap_or(0.0), y.as_f64().unwrap_or(0.0));
            x.partial_cmp(&y).unwrap_or(Ordering::Equal)
        }
        (Value::Number(_), _) => Ordering::Less,
        (_, Value::Number(_)) => Ordering::Greater,
        (Value::String(x), Value::String(y)) => x.cmp(y),
        _ => Ordering::Equal,
    }
}
