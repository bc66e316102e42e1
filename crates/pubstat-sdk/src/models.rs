//! Request and response models shared by both client modes

use pubstat::{Filter, Row};
use serde::{Deserialize, Serialize};

/// Item query: limit, sort and filter
///
/// `limit = -1` asks for every row. A sort field prefixed with `-` sorts
/// descending.
#[derive(Debug, Clone, PartialEq)]
pub struct Query {
    pub limit: i64,
    pub sort: Vec<String>,
    pub filter: Option<Filter>,
}

impl Query {
    /// All rows sorted by `sort_field`
    pub fn all_sorted(sort_field: &str) -> Self {
        Self {
            limit: -1,
            sort: vec![sort_field.to_string()],
            filter: None,
        }
    }

    pub fn with_filter(mut self, filter: Filter) -> Self {
        self.filter = Some(filter);
        self
    }

    pub fn with_limit(mut self, limit: i64) -> Self {
        self.limit = limit;
        self
    }

    /// Query-string pairs in the shape the items endpoint expects
    pub fn to_params(&self) -> Vec<(String, String)> {
        let mut params = vec![("limit".to_string(), self.limit.to_string())];
        if !self.sort.is_empty() {
            params.push(("sort".to_string(), self.sort.join(",")));
        }
        if let Some(filter) = &self.filter {
            params.push(("filter".to_string(), filter.to_json().to_string()));
        }
        params
    }
}

impl Default for Query {
    fn default() -> Self {
        Self {
            limit: -1,
            sort: Vec::new(),
            filter: None,
        }
    }
}

/// Envelope of an items response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ItemsResponse {
    #[serde(default)]
    pub data: Vec<Row>,
}

/// Envelope of a login response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginResponse {
    pub data: LoginData,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginData {
    pub access_token: String,
    #[serde(default)]
    pub refresh_token: Option<String>,
    /// Token lifetime in milliseconds
    #[serde(default)]
    pub expires: Option<u64>,
}

/// Envelope of an error response
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ErrorResponse {
    #[serde(default)]
    pub errors: Vec<ErrorMessage>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorMessage {
    pub message: String,
}

impl ErrorResponse {
    /// First error message, if any
    pub fn message(&self) -> Option<&str> {
        self.errors.first().map(|e| e.message.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_params() {
        let query = Query::all_sorted("SORT_ID").with_filter(Filter::eq("PRE_FLOW_ID", 0));
        let params = query.to_params();
        assert_eq!(params[0], ("limit".to_string(), "-1".to_string()));
        assert_eq!(params[1], ("sort".to_string(), "SORT_ID".to_string()));
        assert_eq!(params[2].0, "filter");
        let filter: serde_json::Value = serde_json::from_str(&params[2].1).unwrap();
        assert_eq!(filter, json!({"PRE_FLOW_ID": {"_eq": 0}}));
    }

    #[test]
    fn test_no_sort_no_filter() {
        let params = Query::default().with_limit(5).to_params();
        assert_eq!(params, vec![("limit".to_string(), "5".to_string())]);
    }

    #[test]
    fn test_envelopes() {
        let items: ItemsResponse =
            serde_json::from_value(json!({"data": [{"FLOW_ID": 1}]})).unwrap();
        assert_eq!(items.data.len(), 1);

        let login: LoginResponse = serde_json::from_value(
            json!({"data": {"access_token": "abc", "refresh_token": "def", "expires": 900000}}),
        )
        .unwrap();
        assert_eq!(login.data.access_token, "abc");

        let error: ErrorResponse =
            serde_json::from_value(json!({"errors": [{"message": "Invalid user credentials."}]}))
                .unwrap();
        assert_eq!(error.message(), Some("Invalid user credentials."));
    }
}
