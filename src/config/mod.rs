//! Configuration loading and management

use anyhow::Result;
use serde::{Deserialize, Serialize};

fn default_timeout_secs() -> u64 {
    30
}

fn default_user_agent() -> String {
    concat!("folio-rs/", env!("CARGO_PKG_VERSION")).to_string()
}

fn default_event_capacity() -> usize {
    1024
}

/// Configuration for the API client
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Base URL of the backend, e.g. "https://api.example.org/api/v1/"
    pub base_url: String,

    /// Per-request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// User-Agent header sent with every request
    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    /// Buffer capacity of the invalidation event bus
    #[serde(default = "default_event_capacity")]
    pub event_capacity: usize,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:3000/".to_string(),
            timeout_secs: default_timeout_secs(),
            user_agent: default_user_agent(),
            event_capacity: default_event_capacity(),
        }
    }
}

impl ClientConfig {
    /// Load configuration from a YAML file
    pub fn from_yaml_file(path: &str) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Self = serde_yaml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a YAML string
    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        let config: Self = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Apply the `FOLIO_BASE_URL` environment override, when set
    pub fn with_env_overrides(mut self) -> Self {
        if let Ok(base_url) = std::env::var("FOLIO_BASE_URL") {
            self.base_url = base_url;
        }
        self
    }

    fn validate(&self) -> Result<()> {
        if self.base_url.is_empty() {
            anyhow::bail!("base_url must not be empty");
        }
        if self.timeout_secs == 0 {
            anyhow::bail!("timeout_secs must be at least 1");
        }
        if self.event_capacity == 0 {
            anyhow::bail!("event_capacity must be at least 1");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ClientConfig::default();
        assert_eq!(config.timeout_secs, 30);
        assert_eq!(config.event_capacity, 1024);
        assert!(config.user_agent.starts_with("folio-rs/"));
    }

    #[test]
    fn test_from_yaml_str_minimal() {
        let config = ClientConfig::from_yaml_str("base_url: https://api.example.org/\n").unwrap();
        assert_eq!(config.base_url, "https://api.example.org/");
        assert_eq!(config.timeout_secs, 30);
    }

    #[test]
    fn test_from_yaml_str_full() {
        let yaml = r#"
base_url: https://api.example.org/api/v1/
timeout_secs: 5
user_agent: custom-agent/1.0
event_capacity: 64
"#;
        let config = ClientConfig::from_yaml_str(yaml).unwrap();
        assert_eq!(config.timeout_secs, 5);
        assert_eq!(config.user_agent, "custom-agent/1.0");
        assert_eq!(config.event_capacity, 64);
    }

    #[test]
    fn test_rejects_empty_base_url() {
        assert!(ClientConfig::from_yaml_str("base_url: \"\"\n").is_err());
    }

    #[test]
    fn test_rejects_zero_timeout() {
        let yaml = "base_url: http://x/\ntimeout_secs: 0\n";
        assert!(ClientConfig::from_yaml_str(yaml).is_err());
    }

    #[test]
    fn test_env_override_replaces_base_url() {
        // set_var is unsafe under concurrent env access; this is the
        // only test touching FOLIO_BASE_URL.
        unsafe { std::env::set_var("FOLIO_BASE_URL", "http://override:8080/") };
        let config = ClientConfig::default().with_env_overrides();
        assert_eq!(config.base_url, "http://override:8080/");

        unsafe { std::env::remove_var("FOLIO_BASE_URL") };
        let config = ClientConfig::default().with_env_overrides();
        assert_eq!(config.base_url, ClientConfig::default().base_url);
    }

    #[test]
    fn test_from_yaml_file() {
        use std::io::Write;
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "base_url: http://localhost:9000/").unwrap();
        let config = ClientConfig::from_yaml_file(file.path().to_str().unwrap()).unwrap();
        assert_eq!(config.base_url, "http://localhost:9000/");
    }
}
