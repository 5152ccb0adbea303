//! Settings structures for the users search adapter

use super::credentials::Credentials;
use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// Index searched when none is configured
pub const DEFAULT_INDEX: &str = "users";

/// Document type searched when none is configured
pub const DEFAULT_DOC_TYPE: &str = "user";

/// Main settings structure matching settings.yml
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub cluster: ClusterSettings,
    pub aws: AwsSettings,
    pub outgoing: OutgoingSettings,
}

impl Settings {
    /// Load settings from a YAML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml_str(&content)
    }

    /// Parse settings from YAML text
    pub fn from_yaml_str(content: &str) -> Result<Self> {
        let settings: Settings = serde_yaml::from_str(content)?;
        Ok(settings)
    }

    /// Apply USERS_SEARCH_* overrides read through `lookup`.
    ///
    /// `USERS_SEARCH_ENDPOINTS` is comma separated; blank entries are
    /// dropped and a value with no entries at all is ignored.
    pub fn merge_from<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(val) = lookup("USERS_SEARCH_ENDPOINTS") {
            let endpoints: Vec<String> = val
                .split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
                .collect();
            if !endpoints.is_empty() {
                self.cluster.endpoints = endpoints;
            }
        }
        if let Some(val) = lookup("USERS_SEARCH_INDEX") {
            self.cluster.index = val;
        }
        if let Some(val) = lookup("USERS_SEARCH_TYPE") {
            self.cluster.doc_type = val;
        }
        if let Some(val) = lookup("USERS_SEARCH_CREDENTIALS") {
            self.aws.credentials_path = Some(PathBuf::from(val));
        }
    }

    /// Check the settings are usable before any client is built
    pub fn validate(&self) -> Result<()> {
        if self.cluster.endpoints.is_empty() {
            return Err(Error::config("cluster.endpoints must list at least one node"));
        }
        if self.cluster.index.trim().is_empty() {
            return Err(Error::config("cluster.index must not be empty"));
        }
        Ok(())
    }
}

/// Cluster addressing: which nodes to talk to and what every query is scoped to
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ClusterSettings {
    /// Node addresses, tried in round-robin order
    pub endpoints: Vec<String>,
    /// Index every query is bound to
    pub index: String,
    /// Document type every query is bound to; empty for typeless search
    #[serde(alias = "type")]
    pub doc_type: String,
}

impl Default for ClusterSettings {
    fn default() -> Self {
        Self {
            endpoints: vec!["http://localhost:9200".to_string()],
            index: DEFAULT_INDEX.to_string(),
            doc_type: DEFAULT_DOC_TYPE.to_string(),
        }
    }
}

/// Where request-signing credentials come from
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AwsSettings {
    /// Credentials file in the SDK's JSON format
    pub credentials_path: Option<PathBuf>,
    /// Region override; falls back to the credentials' own region
    pub region: Option<String>,
    /// Read AWS_* variables when no credentials file is set
    pub env_credentials: bool,
}

impl Default for AwsSettings {
    fn default() -> Self {
        Self {
            credentials_path: None,
            region: None,
            env_credentials: true,
        }
    }
}

impl AwsSettings {
    /// Resolve credentials from the configured file, or from the standard
    /// AWS environment variables when no file is configured and
    /// `env_credentials` is on.
    ///
    /// A configured file that is missing or unreadable is an error.
    pub fn load_credentials(&self) -> Result<Option<Credentials>> {
        match self.credentials_path {
            Some(ref path) => Credentials::from_file(path).map(Some),
            None if self.env_credentials => Ok(Credentials::from_env()),
            None => Ok(None),
        }
    }

    /// Effective signing region for the given credentials
    pub fn region_for(&self, credentials: &Credentials) -> Option<String> {
        self.region
            .clone()
            .or_else(|| credentials.region.clone())
            .filter(|r| !r.is_empty())
    }
}

/// Outgoing request settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OutgoingSettings {
    /// Pool max idle connections per node
    pub pool_maxsize: usize,
    /// Verify SSL certificates
    pub verify_ssl: bool,
    /// Proxy settings
    pub proxies: ProxySettings,
    /// Extra headers to send
    pub extra_headers: HashMap<String, String>,
}

impl Default for OutgoingSettings {
    fn default() -> Self {
        Self {
            pool_maxsize: 20,
            verify_ssl: true,
            proxies: ProxySettings::default(),
            extra_headers: HashMap::new(),
        }
    }
}

/// Proxy settings
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ProxySettings {
    pub http: Option<String>,
    pub https: Option<String>,
    pub all: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_settings() {
        let settings = Settings::default();
        assert_eq!(settings.cluster.index, "users");
        assert_eq!(settings.cluster.doc_type, "user");
        assert_eq!(settings.cluster.endpoints.len(), 1);
        assert!(settings.aws.credentials_path.is_none());
        assert!(settings.validate().is_ok());
    }

    #[test]
    fn test_parse_yaml() {
        let yaml = r#"
cluster:
  endpoints:
    - https://search-users.eu-west-1.es.amazonaws.com
    - https://search-users-b.eu-west-1.es.amazonaws.com
  index: people
  type: person
aws:
  credentials_path: /etc/users-search/config.json
  region: eu-west-1
"#;
        let settings = Settings::from_yaml_str(yaml).unwrap();
        assert_eq!(settings.cluster.endpoints.len(), 2);
        assert_eq!(settings.cluster.index, "people");
        assert_eq!(settings.cluster.doc_type, "person");
        assert_eq!(settings.aws.region.as_deref(), Some("eu-west-1"));
        // Sections left out keep their defaults
        assert!(settings.outgoing.verify_ssl);
        assert_eq!(settings.outgoing.pool_maxsize, 20);
    }

    #[test]
    fn test_empty_endpoints_rejected() {
        let settings = Settings::from_yaml_str("cluster:\n  endpoints: []\n").unwrap();
        assert!(matches!(settings.validate(), Err(Error::Config(_))));
    }

    #[test]
    fn test_invalid_yaml_rejected() {
        let result = Settings::from_yaml_str("cluster: [unclosed");
        assert!(matches!(result, Err(Error::Yaml(_))));
    }

    #[test]
    fn test_missing_settings_file() {
        let result = Settings::from_file("/nonexistent/users-search/settings.yml");
        assert!(matches!(result, Err(Error::Io(_))));
    }

    #[test]
    fn test_missing_credentials_file_is_fatal() {
        let aws = AwsSettings {
            credentials_path: Some(PathBuf::from("/nonexistent/config.json")),
            ..Default::default()
        };
        assert!(matches!(aws.load_credentials(), Err(Error::Io(_))));
    }

    #[test]
    fn test_env_credentials_disabled() {
        let aws = AwsSettings {
            env_credentials: false,
            ..Default::default()
        };
        assert!(aws.load_credentials().unwrap().is_none());
        assert!(AwsSettings::default().env_credentials);
    }

    #[test]
    fn test_merge_endpoints_split() {
        let mut settings = Settings::default();
        settings.merge_from(|key| match key {
            "USERS_SEARCH_ENDPOINTS" => Some(" http://a:9200 ,, http://b:9200,".to_string()),
            _ => None,
        });
        assert_eq!(
            settings.cluster.endpoints,
            vec!["http://a:9200".to_string(), "http://b:9200".to_string()]
        );
    }

    #[test]
    fn test_merge_blank_endpoints_ignored() {
        let mut settings = Settings::default();
        settings.merge_from(|key| match key {
            "USERS_SEARCH_ENDPOINTS" => Some(" , ,".to_string()),
            _ => None,
        });
        assert_eq!(settings.cluster.endpoints, ClusterSettings::default().endpoints);
    }

    #[test]
    fn test_merge_overrides() {
        let mut settings = Settings::default();
        settings.merge_from(|key| match key {
            "USERS_SEARCH_INDEX" => Some("people".to_string()),
            "USERS_SEARCH_TYPE" => Some(String::new()),
            "USERS_SEARCH_CREDENTIALS" => Some("/etc/users-search/config.json".to_string()),
            _ => None,
        });
        assert_eq!(settings.cluster.index, "people");
        assert_eq!(settings.cluster.doc_type, "");
        assert_eq!(
            settings.aws.credentials_path,
            Some(PathBuf::from("/etc/users-search/config.json"))
        );

        let mut untouched = Settings::default();
        untouched.merge_from(|_| None);
        assert_eq!(untouched.cluster.index, "users");
        assert_eq!(untouched.cluster.doc_type, "user");
        assert!(untouched.aws.credentials_path.is_none());
    }

    #[test]
    fn test_region_override() {
        let credentials = Credentials {
            access_key_id: "AKID".to_string(),
            secret_access_key: "secret".to_string(),
            session_token: None,
            region: Some("us-east-1".to_string()),
        };

        let aws = AwsSettings::default();
        assert_eq!(aws.region_for(&credentials).as_deref(), Some("us-east-1"));

        let aws = AwsSettings {
            region: Some("eu-west-1".to_string()),
            ..Default::default()
        };
        assert_eq!(aws.region_for(&credentials).as_deref(), Some("eu-west-1"));
    }
}
