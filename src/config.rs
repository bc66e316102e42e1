//! Configuration
//!
//! Loaded from YAML with serde defaults for everything, then overridden
//! from `PUBSTAT_URL`, `PUBSTAT_EMAIL` and `PUBSTAT_PASSWORD`.
//!
//! ```yaml
//! server:
//!   url: https://cms.example.com
//!   email: reporter@example.com
//! profile: rules
//! orgs:
//!   collection: my_orgs
//!   id_field: ORG_ID
//!   parent_field: PARENT_ID
//!   name_field: ORG_NAME
//!   path_field: T_PATH
//!   sort_field: SORT_ID
//! ```

use crate::schema::{HistorySchema, NodeSchema};
use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;
use tracing::{debug, info};

pub const ENV_URL: &str = "PUBSTAT_URL";
pub const ENV_EMAIL: &str = "PUBSTAT_EMAIL";
pub const ENV_PASSWORD: &str = "PUBSTAT_PASSWORD";

/// Configuration errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

pub type ConfigResult<T> = Result<T, ConfigError>;

/// CMS connection settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerSettings {
    /// Base URL of the Directus instance
    pub url: String,
    pub email: Option<String>,
    #[serde(skip_serializing)]
    pub password: Option<String>,
    /// Per-request timeout in seconds
    pub timeout_secs: u64,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            url: "http://localhost:8055".to_string(),
            email: None,
            password: None,
            timeout_secs: 30,
        }
    }
}

/// Which entity family the dashboard reports on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Profile {
    #[default]
    Flows,
    Rules,
}

impl std::str::FromStr for Profile {
    type Err = ConfigError;

    fn from_str(s: &str) -> ConfigResult<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "flows" | "flow" => Ok(Profile::Flows),
            "rules" | "rule" => Ok(Profile::Rules),
            other => Err(ConfigError::Invalid(format!("unknown profile: {}", other))),
        }
    }
}

/// Top-level configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub server: ServerSettings,
    pub profile: Profile,
    /// Entity hierarchy table; defaults follow the profile
    pub entities: Option<NodeSchema>,
    /// History table; defaults follow the profile
    pub history: Option<HistorySchema>,
    pub orgs: Option<NodeSchema>,
}

impl Config {
    /// Parse YAML text
    pub fn from_yaml(text: &str) -> ConfigResult<Self> {
        let config: Config = serde_yaml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Read and parse a YAML file
    pub fn load(path: impl AsRef<Path>) -> ConfigResult<Self> {
        let path = path.as_ref();
        info!("Loading configuration from {:?}", path);
        let text = std::fs::read_to_string(path)?;
        Self::from_yaml(&text)
    }

    /// Apply environment overrides
    pub fn with_env(self) -> Self {
        self.with_overrides(|key| std::env::var(key).ok())
    }

    /// Apply overrides from any key lookup (the environment in production)
    pub fn with_overrides<F>(mut self, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(url) = lookup(ENV_URL) {
            debug!("{} overrides server url", ENV_URL);
            self.server.url = url;
        }
        if let Some(email) = lookup(ENV_EMAIL) {
            self.server.email = Some(email);
        }
        if let Some(password) = lookup(ENV_PASSWORD) {
            self.server.password = Some(password);
        }
        self
    }

    pub fn validate(&self) -> ConfigResult<()> {
        let url = self.server.url.trim();
        if !(url.starts_with("http://") || url.starts_with("https://")) {
            return Err(ConfigError::Invalid(format!(
                "server url must be http(s): {}",
                self.server.url
            )));
        }
        if self.server.timeout_secs == 0 {
            return Err(ConfigError::Invalid("timeout_secs must be positive".to_string()));
        }
        Ok(())
    }

    pub fn entity_schema(&self) -> NodeSchema {
        self.entities.clone().unwrap_or_else(|| match self.profile {
            Profile::Flows => NodeSchema::flows(),
            Profile::Rules => NodeSchema::rules(),
        })
    }

    pub fn history_schema(&self) -> HistorySchema {
        self.history.clone().unwrap_or_else(|| match self.profile {
            Profile::Flows => HistorySchema::flows(),
            Profile::Rules => HistorySchema::rules(),
        })
    }

    pub fn org_schema(&self) -> NodeSchema {
        self.orgs.clone().unwrap_or_else(NodeSchema::orgs)
    }

    /// Email and password, when both are configured
    pub fn credentials(&self) -> Option<(&str, &str)> {
        match (&self.server.email, &self.server.password) {
            (Some(email), Some(password)) => Some((email.as_str(), password.as_str())),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.server.url, "http://localhost:8055");
        assert_eq!(config.profile, Profile::Flows);
        assert_eq!(config.entity_schema(), NodeSchema::flows());
        assert_eq!(config.history_schema(), HistorySchema::flows());
        assert!(config.credentials().is_none());
    }

    #[test]
    fn test_partial_yaml() {
        let config = Config::from_yaml("server:\n  url: https://cms.example.com\nprofile: rules\n")
            .unwrap();
        assert_eq!(config.server.url, "https://cms.example.com");
        assert_eq!(config.server.timeout_secs, 30);
        assert_eq!(config.entity_schema().collection, "jecn_rule_t");
        assert_eq!(config.history_schema().collection, "jecn_rule_history");
        assert_eq!(config.org_schema().collection, "jecn_flow_org");
    }

    #[test]
    fn test_schema_override() {
        let yaml = r#"
orgs:
  collection: departments
  id_field: DEPT_ID
  parent_field: PARENT
  name_field: TITLE
  path_field: PATH
  sort_field: POS
"#;
        let config = Config::from_yaml(yaml).unwrap();
        let orgs = config.org_schema();
        assert_eq!(orgs.collection, "departments");
        assert_eq!(orgs.root_id.as_str(), "0");
    }

    #[test]
    fn test_invalid_url() {
        let err = Config::from_yaml("server:\n  url: ftp://nope\n").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn test_overrides() {
        let env: HashMap<&str, &str> = [
            (ENV_URL, "https://other.example.com"),
            (ENV_EMAIL, "a@example.com"),
            (ENV_PASSWORD, "secret"),
        ]
        .into_iter()
        .collect();
        let config = Config::default().with_overrides(|k| env.get(k).map(|v| v.to_string()));
        assert_eq!(config.server.url, "https://other.example.com");
        assert_eq!(config.credentials(), Some(("a@example.com", "secret")));
    }

    #[test]
    fn test_load_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "server:\n  url: http://127.0.0.1:9999\n  timeout_secs: 5").unwrap();
        let config = Config::load(file.path()).unwrap();
        assert_eq!(config.server.timeout_secs, 5);

        assert!(matches!(
            Config::load("/nonexistent/pubstat.yaml"),
            Err(ConfigError::Io(_))
        ));
    }

    #[test]
    fn test_profile_parse() {
        assert_eq!("Rules".parse::<Profile>().unwrap(), Profile::Rules);
        assert!("docs".parse::<Profile>().is_err());
    }
}
