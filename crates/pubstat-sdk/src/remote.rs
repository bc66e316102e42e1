//! RemoteClient: network client for a Directus instance
//!
//! Talks to the Directus REST API: `/auth/login` for the session and
//! `/items/{collection}` for reads.

use async_trait::async_trait;
use reqwest::{Client, Response, Url};
use std::time::Duration;
use tokio::sync::RwLock;
use tracing::{debug, info};

use pubstat::{Row, ServerSettings};

use crate::client::CmsClient;
use crate::error::{SdkError, SdkResult};
use crate::models::{ErrorResponse, ItemsResponse, LoginResponse, Query};

/// Network client for a Directus instance.
///
/// Created unauthenticated; every read fails with
/// [`SdkError::NotAuthenticated`] until [`CmsClient::login`] succeeds.
pub struct RemoteClient {
    base_url: String,
    http_client: Client,
    access_token: RwLock<Option<String>>,
}

impl RemoteClient {
    /// Create a RemoteClient for the given base URL.
    ///
    /// # Example
    /// ```no_run
    /// # use pubstat_sdk::RemoteClient;
    /// let client = RemoteClient::new("http://localhost:8055");
    /// ```
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            http_client: Client::new(),
            access_token: RwLock::new(None),
        }
    }

    /// Create a RemoteClient whose requests give up after `timeout`
    pub fn with_timeout(base_url: &str, timeout: Duration) -> SdkResult<Self> {
        let http_client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            http_client,
            access_token: RwLock::new(None),
        })
    }

    /// Create a RemoteClient from configured server settings
    pub fn from_settings(settings: &ServerSettings) -> SdkResult<Self> {
        Self::with_timeout(&settings.url, Duration::from_secs(settings.timeout_secs))
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// URL of an items read, query parameters included
    pub fn items_url(&self, collection: &str, query: &Query) -> SdkResult<Url> {
        let raw = format!("{}/items/{}", self.base_url, collection);
        Url::parse_with_params(&raw, query.to_params())
            .map_err(|e| SdkError::ConnectionError(format!("invalid url {}: {}", raw, e)))
    }

    async fn bearer(&self) -> SdkResult<String> {
        self.access_token
            .read()
            .await
            .clone()
            .ok_or(SdkError::NotAuthenticated)
    }

    async fn api_error(response: Response) -> SdkError {
        let status = response.status().as_u16();
        let body: ErrorResponse = response.json().await.unwrap_or_default();
        SdkError::ApiError {
            status,
            message: body.message().unwrap_or("Unknown error").to_string(),
        }
    }
}

#[async_trait]
impl CmsClient for RemoteClient {
    async fn login(&self, email: &str, password: &str) -> SdkResult<()> {
        let url = format!("{}/auth/login", self.base_url);
        let body = serde_json::json!({ "email": email, "password": password });

        let response = self.http_client.post(&url).json(&body).send().await?;
        if !response.status().is_success() {
            return Err(Self::api_error(response).await);
        }

        let login: LoginResponse = response.json().await?;
        *self.access_token.write().await = Some(login.data.access_token);
        info!("Authenticated against {}", self.base_url);
        Ok(())
    }

    async fn is_authenticated(&self) -> bool {
        self.access_token.read().await.is_some()
    }

    async fn read_by_query(&self, collection: &str, query: &Query) -> SdkResult<Vec<Row>> {
        let token = self.bearer().await?;
        let url = self.items_url(collection, query)?;
        debug!("GET {}", url);

        let response = self.http_client.get(url).bearer_auth(token).send().await?;
        if !response.status().is_success() {
            return Err(Self::api_error(response).await);
        }

        let items: ItemsResponse = response.json().await?;
        debug!("{} rows from {}", items.data.len(), collection);
        Ok(items.data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pubstat::Filter;

    #[test]
    fn test_items_url() {
        let client = RemoteClient::new("http://cms.local:8055/");
        assert_eq!(client.base_url(), "http://cms.local:8055");

        let query = Query::all_sorted("SORT_ID").with_filter(Filter::starts_with("T_PATH", "001"));
        let url = client.items_url("jecn_flow_org", &query).unwrap();
        assert_eq!(url.path(), "/items/jecn_flow_org");

        let pairs: Vec<(String, String)> = url
            .query_pairs()
            .map(|(k, v)| (k.into_owned(), v.into_owned()))
            .collect();
        assert_eq!(pairs[0], ("limit".to_string(), "-1".to_string()));
        assert_eq!(pairs[1], ("sort".to_string(), "SORT_ID".to_string()));
        assert_eq!(
            pairs[2],
            ("filter".to_string(), r#"{"T_PATH":{"_starts_with":"001"}}"#.to_string())
        );
    }

    #[tokio::test]
    async fn test_reads_require_login() {
        let client = RemoteClient::new("http://127.0.0.1:9");
        assert!(!client.is_authenticated().await);
        let err = client
            .read_by_query("jecn_flow_org", &Query::default())
            .await
            .unwrap_err();
        assert!(matches!(err, SdkError::NotAuthenticated));
    }
}
