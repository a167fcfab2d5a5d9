//! Configuration module
//!
//! Turns the global flags into the client configuration, poll policy and
//! history store the commands work with.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use imotion_client::{ClientConfig, GenerationClient};
use imotion_engine::{FileStore, HistoryStore, KeyValueStore, PollPolicy};

/// CLI configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Base URL of the generation API
    pub api_base_url: String,
    /// API keys used in rotation
    pub api_keys: Vec<String>,
    /// Directory of the history store
    pub data_dir: PathBuf,
    pub poll_interval_ms: u64,
    pub max_poll_attempts: u32,
}

impl Config {
    /// Client configuration for the API, validated
    pub fn client_config(&self) -> Result<ClientConfig> {
        let keys: Vec<String> = self
            .api_keys
            .iter()
            .map(|k| k.trim().to_string())
            .filter(|k| !k.is_empty())
            .collect();
        if keys.is_empty() {
            anyhow::bail!("No API key configured; pass --api-key or set IMOTION_API_KEYS");
        }

        let config = ClientConfig::with_base_url(&self.api_base_url, keys);
        config.validate().context("Invalid API configuration")?;
        Ok(config)
    }

    /// HTTP client for the API
    pub fn client(&self) -> Result<GenerationClient> {
        GenerationClient::new(self.client_config()?).context("Failed to create API client")
    }

    /// Poll policy from the interval and attempt flags, validated
    pub fn poll_policy(&self) -> Result<PollPolicy> {
        let policy = PollPolicy::default()
            .with_interval(Duration::from_millis(self.poll_interval_ms))
            .with_max_attempts(self.max_poll_attempts);
        policy.validate().map_err(anyhow::Error::msg)?;
        Ok(policy)
    }

    /// Store backing the generation history
    pub fn store(&self) -> Arc<dyn KeyValueStore> {
        Arc::new(FileStore::new(self.data_dir.clone()))
    }

    /// History loaded from the data directory
    pub fn history(&self) -> HistoryStore {
        HistoryStore::load(self.store())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> Config {
        Config {
            api_base_url: "http://localhost:9000/api/v2/".to_string(),
            api_keys: vec!["k1".to_string(), " ".to_string(), "k2".to_string()],
            data_dir: PathBuf::from(".imotion"),
            poll_interval_ms: 1000,
            max_poll_attempts: 100,
        }
    }

    #[test]
    fn test_client_config_drops_blank_keys() {
        let client = config().client_config().unwrap();
        assert_eq!(client.api_keys, vec!["k1".to_string(), "k2".to_string()]);
        assert!(client.result_endpoint.starts_with("http://localhost:9000/api/v2/"));
    }

    #[test]
    fn test_missing_keys_are_rejected() {
        let mut config = config();
        config.api_keys = vec![String::new()];
        assert!(config.client_config().is_err());
    }

    #[test]
    fn test_invalid_base_url_is_rejected() {
        let mut config = config();
        config.api_base_url = "localhost:9000".to_string();
        assert!(config.client_config().is_err());
    }

    #[test]
    fn test_poll_policy_from_flags() {
        let mut config = config();
        config.poll_interval_ms = 250;
        config.max_poll_attempts = 12;
        let policy = config.poll_policy().unwrap();
        assert_eq!(policy.interval, Duration::from_millis(250));
        assert_eq!(policy.max_attempts, 12);

        config.max_poll_attempts = 0;
        assert!(config.poll_policy().is_err());
    }
}
