//! ImageMotion HTTP Client
//!
//! A small, type-safe client for the remote image-to-video generation API.
//!
//! The client knows two calls: submitting a generation request and checking
//! the status of a submitted job. It holds no job state of its own; polling
//! and bookkeeping live in the engine.
//!
//! # Example
//!
//! ```no_run
//! use imotion_client::{ClientConfig, GenerationClient};
//! use imotion_core::domain::params::GenerationParameters;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = ClientConfig::new(vec!["my-api-key".to_string()]);
//!     let client = GenerationClient::new(config)?;
//!
//!     let handle = client.submit(&GenerationParameters::example()).await?;
//!     let result = client.fetch_status(&handle).await?;
//!
//!     println!("Job {} is {}", handle, result.status);
//!     Ok(())
//! }
//! ```

pub mod credentials;
pub mod error;
mod jobs;

// Re-export commonly used types
pub use credentials::Credentials;
pub use error::{ClientError, Result};

use reqwest::Client;
use serde::de::DeserializeOwned;

/// Default API base URL
pub const DEFAULT_BASE_URL: &str = "https://api.wavespeed.ai/api/v2";

/// Model path appended to the base URL for submissions
pub const DEFAULT_MODEL_PATH: &str = "wavespeed-ai/wan-2.1/i2v-480p-ultra-fast";

/// Endpoints and credentials for a [`GenerationClient`]
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Endpoint receiving `POST` submissions
    pub model_endpoint: String,
    /// Prefix of `GET <result_endpoint>/<id>/result` status checks
    pub result_endpoint: String,
    /// Interchangeable API keys, used round-robin
    pub api_keys: Vec<String>,
}

impl ClientConfig {
    /// Configuration against the default public API
    pub fn new(api_keys: Vec<String>) -> Self {
        Self::with_base_url(DEFAULT_BASE_URL, api_keys)
    }

    /// Configuration against an alternative API base URL
    ///
    /// The model endpoint becomes `<base>/<model path>` and the result
    /// endpoint `<base>/predictions`.
    pub fn with_base_url(base_url: &str, api_keys: Vec<String>) -> Self {
        let base_url = base_url.trim_end_matches('/');
        Self {
            model_endpoint: format!("{}/{}", base_url, DEFAULT_MODEL_PATH),
            result_endpoint: format!("{}/predictions", base_url),
            api_keys,
        }
    }

    /// Validates the configuration
    pub fn validate(&self) -> Result<()> {
        for (name, url) in [
            ("model_endpoint", &self.model_endpoint),
            ("result_endpoint", &self.result_endpoint),
        ] {
            if !url.starts_with("http://") && !url.starts_with("https://") {
                return Err(ClientError::Config(format!(
                    "{} must start with http:// or https:// (got '{}')",
                    name, url
                )));
            }
        }

        if self.api_keys.iter().all(|k| k.trim().is_empty()) {
            return Err(ClientError::Config(
                "at least one API key is required".to_string(),
            ));
        }

        Ok(())
    }
}

/// HTTP client for the generation API
///
/// Every call presents exactly one API key, picked round-robin from the
/// configured set. The rotation cursor belongs to this instance, so separate
/// clients rotate independently.
#[derive(Debug)]
pub struct GenerationClient {
    model_endpoint: String,
    result_endpoint: String,
    credentials: Credentials,
    /// HTTP client instance
    client: Client,
}

impl GenerationClient {
    /// Create a new generation client
    ///
    /// # Errors
    /// Returns [`ClientError::Config`] if the configuration is invalid.
    pub fn new(config: ClientConfig) -> Result<Self> {
        Self::with_client(config, Client::new())
    }

    /// Create a new generation client with a custom HTTP client
    ///
    /// This allows you to configure timeouts, proxies, TLS settings, etc.
    pub fn with_client(config: ClientConfig, client: Client) -> Result<Self> {
        config.validate()?;

        Ok(Self {
            model_endpoint: config.model_endpoint.trim_end_matches('/').to_string(),
            result_endpoint: config.result_endpoint.trim_end_matches('/').to_string(),
            credentials: Credentials::new(&config.api_keys)?,
            client,
        })
    }

    /// Endpoint submissions are posted to
    pub fn model_endpoint(&self) -> &str {
        &self.model_endpoint
    }

    /// Prefix of status check URLs
    pub fn result_endpoint(&self) -> &str {
        &self.result_endpoint
    }

    /// `Authorization` header value for the next call
    fn bearer(&self) -> String {
        format!("Bearer {}", self.credentials.next_key())
    }

    // =============================================================================
    // Response Handlers
    // =============================================================================

    /// Handle an API response and deserialize JSON
    ///
    /// Any non-success status is turned into [`ClientError::Transport`]
    /// carrying the status code and body text.
    async fn handle_response<T: DeserializeOwned>(&self, response: reqwest::Response) -> Result<T> {
        let status = response.status();

        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(ClientError::transport(status.as_u16(), body));
        }

        // The service answered; a body cut short is a malformed response.
        let body = response
            .text()
            .await
            .map_err(|e| ClientError::Parse(format!("Failed to read response body: {}", e)))?;
        serde_json::from_str(&body)
            .map_err(|e| ClientError::Parse(format!("Failed to parse JSON response: {}", e)))
    }
}
