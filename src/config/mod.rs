use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;
use std::time::Duration;

/// Credentials and routing for one bucket
#[derive(Clone, Serialize, Deserialize)]
pub struct Profile {
    /// Operator name used for signing
    pub operator: String,

    /// Operator password (only its md5 is ever sent)
    pub password: String,

    /// Bucket all paths are scoped under
    pub bucket: String,

    /// Route name (v0, v1, v2, v3) or a base URL; defaults to v0
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub endpoint: Option<String>,
}

impl std::fmt::Debug for Profile {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Profile")
            .field("operator", &self.operator)
            .field("password", &"<redacted>")
            .field("bucket", &self.bucket)
            .field("endpoint", &self.endpoint)
            .finish()
    }
}

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Named profiles
    #[serde(default)]
    pub profiles: HashMap<String, Profile>,

    /// Profile used when none is requested
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_profile: Option<String>,

    /// Request timeout in seconds
    #[serde(default = "default_request_timeout")]
    pub request_timeout: u64,
}

fn default_request_timeout() -> u64 {
    300
}

impl Config {
    /// Create a new empty configuration
    pub fn new() -> Self {
        Self {
            profiles: HashMap::new(),
            default_profile: None,
            request_timeout: default_request_timeout(),
        }
    }

    /// Get a profile by name, or the default profile if not specified
    pub fn get_profile(&self, name: Option<&str>) -> Option<&Profile> {
        if let Some(name) = name {
            self.profiles.get(name)
        } else if let Some(default) = &self.default_profile {
            self.profiles.get(default)
        } else {
            self.profiles.values().next()
        }
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new()
    }
}

/// Load configuration from a YAML file
pub fn load_from_yaml<P: AsRef<Path>>(path: P) -> Result<Config> {
    let content = std::fs::read_to_string(path.as_ref())
        .context(format!("Failed to read config file: {:?}", path.as_ref()))?;

    let config: Config = serde_yaml::from_str(&content)
        .context("Failed to parse YAML configuration")?;

    Ok(config)
}

/// Load configuration from environment variables
///
/// - UPYUN_OPERATOR, UPYUN_PASSWORD, UPYUN_BUCKET (required)
/// - UPYUN_ENDPOINT (optional route name or URL)
/// - UPYUN_TIMEOUT (optional, seconds)
///
/// A `.env` file in the working directory is read first if present.
pub fn load_from_env() -> Result<Config> {
    let _ = dotenvy::dotenv();

    let operator = std::env::var("UPYUN_OPERATOR")
        .context("UPYUN_OPERATOR environment variable not set")?;
    let password = std::env::var("UPYUN_PASSWORD")
        .context("UPYUN_PASSWORD environment variable not set")?;
    let bucket = std::env::var("UPYUN_BUCKET")
        .context("UPYUN_BUCKET environment variable not set")?;
    let endpoint = std::env::var("UPYUN_ENDPOINT").ok().filter(|s| !s.is_empty());

    let mut config = Config::new();
    config.profiles.insert(
        "default".to_string(),
        Profile {
            operator,
            password,
            bucket,
            endpoint,
        },
    );
    config.default_profile = Some("default".to_string());

    if let Ok(timeout) = std::env::var("UPYUN_TIMEOUT") {
        if let Ok(val) = timeout.parse() {
            config.request_timeout = val;
        }
    }

    Ok(config)
}

/// Load configuration from file or environment
///
/// # Arguments
/// * `config_path` - Optional path to YAML config file
/// * `profile_name` - Optional profile name to use (only relevant for YAML configs)
pub fn load_config(config_path: Option<&str>, profile_name: Option<&str>) -> Result<Config> {
    if let Some(path) = config_path {
        let mut config = load_from_yaml(path)?;

        if let Some(name) = profile_name {
            if !config.profiles.contains_key(name) {
                anyhow::bail!("Profile '{}' not found in config file", name);
            }
            config.default_profile = Some(name.to_string());
        }

        Ok(config)
    } else {
        load_from_env()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_yaml() {
        let yaml = r#"
profiles:
  production:
    operator: test
    password: test1234
    bucket: jackson-test-space
    endpoint: v1
  staging:
    operator: stage
    password: secret
    bucket: staging-space
    endpoint: http://127.0.0.1:9000

default_profile: production
request_timeout: 60
"#;

        let config: Config = serde_yaml::from_str(yaml).unwrap();

        assert_eq!(config.profiles.len(), 2);
        let profile = config.get_profile(None).unwrap();
        assert_eq!(profile.operator, "test");
        assert_eq!(profile.bucket, "jackson-test-space");
        assert_eq!(profile.endpoint.as_deref(), Some("v1"));

        let staging = config.get_profile(Some("staging")).unwrap();
        assert_eq!(staging.endpoint.as_deref(), Some("http://127.0.0.1:9000"));

        assert_eq!(config.timeout(), Duration::from_secs(60));
    }

    #[test]
    fn test_default_values() {
        let yaml = r#"
profiles:
  minimal:
    operator: op
    password: pw
    bucket: b
"#;

        let config: Config = serde_yaml::from_str(yaml).unwrap();
        let profile = config.get_profile(Some("minimal")).unwrap();

        assert_eq!(profile.endpoint, None);
        assert_eq!(config.request_timeout, 300);
        assert!(config.default_profile.is_none());
        // Single profile is picked without a default
        assert_eq!(config.get_profile(None).unwrap().operator, "op");
    }

    #[test]
    fn test_profile_debug_redacts_password() {
        let profile = Profile {
            operator: "op".to_string(),
            password: "hunter2".to_string(),
            bucket: "b".to_string(),
            endpoint: None,
        };
        assert!(!format!("{:?}", profile).contains("hunter2"));
    }
}
