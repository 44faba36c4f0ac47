use std::time::Duration;

use async_trait::async_trait;
use iml_types::AnchorId;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::AnchorError;
use crate::traits::AnchorClient;

/// Configuration for the Pinata pinning service.
#[derive(Debug, Clone)]
pub struct PinataConfig {
    /// API endpoint, without a trailing slash.
    pub api_url: String,
    /// Pinata API key, sent as the `pinata_api_key` header.
    pub api_key: String,
    /// Pinata secret, sent as the `pinata_secret_api_key` header.
    pub secret_api_key: String,
    /// Upper bound on one pinning request, connect included.
    pub timeout: Duration,
}

impl Default for PinataConfig {
    fn default() -> Self {
        Self {
            api_url: "https://api.pinata.cloud".to_string(),
            api_key: String::new(),
            secret_api_key: String::new(),
            timeout: Duration::from_secs(10),
        }
    }
}

impl PinataConfig {
    /// Configuration with the given credentials and default endpoint.
    pub fn new(api_key: impl Into<String>, secret_api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            secret_api_key: secret_api_key.into(),
            ..Self::default()
        }
    }

    /// Credentials from `PINATA_API_KEY` / `PINATA_SECRET_API_KEY`.
    ///
    /// Returns `None` when either variable is unset, so callers can fall
    /// back to file configuration.
    pub fn from_env() -> Option<Self> {
        let api_key = std::env::var("PINATA_API_KEY").ok()?;
        let secret_api_key = std::env::var("PINATA_SECRET_API_KEY").ok()?;
        Some(Self::new(api_key, secret_api_key))
    }
}

/// HTTP adapter for Pinata's JSON pinning endpoint.
pub struct PinataClient {
    client: reqwest::Client,
    config: PinataConfig,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct PinRequest<'a> {
    pinata_content: &'a serde_json::Value,
    pinata_metadata: PinMetadata<'a>,
}

#[derive(Debug, Serialize)]
struct PinMetadata<'a> {
    name: &'a str,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct PinResponse {
    ipfs_hash: Option<String>,
}

impl PinataClient {
    /// Build a client over the given configuration.
    pub fn new(config: PinataConfig) -> Result<Self, AnchorError> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| AnchorError::Config(e.to_string()))?;
        Ok(Self { client, config })
    }

    /// Public gateway URL where a pinned identifier can be fetched.
    pub fn gateway_url(anchor: &AnchorId) -> String {
        format!("https://gateway.pinata.cloud/ipfs/{}", anchor.as_str())
    }
}

#[async_trait]
impl AnchorClient for PinataClient {
    async fn anchor(
        &self,
        name: &str,
        content: &serde_json::Value,
    ) -> Result<AnchorId, AnchorError> {
        let url = format!("{}/pinning/pinJSONToIPFS", self.config.api_url);
        let request = PinRequest {
            pinata_content: content,
            pinata_metadata: PinMetadata { name },
        };

        let response = self
            .client
            .post(&url)
            .header("pinata_api_key", &self.config.api_key)
            .header("pinata_secret_api_key", &self.config.secret_api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| AnchorError::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            warn!(code = status.as_u16(), name, "pinning request rejected");
            return Err(AnchorError::Status {
                code: status.as_u16(),
            });
        }

        let pin: PinResponse = response
            .json()
            .await
            .map_err(|e| AnchorError::Transport(e.to_string()))?;

        match pin.ipfs_hash {
            Some(hash) if !hash.is_empty() => {
                debug!(name, identifier = %hash, "content pinned");
                Ok(AnchorId::new(hash))
            }
            _ => Err(AnchorError::MissingIdentifier),
        }
    }
}
