use std::net::SocketAddr;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{ServerError, ServerResult};

/// Top-level server configuration, loadable from TOML.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Socket the HTTP server binds to.
    pub bind_addr: SocketAddr,
    /// Directory for the chain journal. `None` keeps the chain in memory
    /// only, losing it on restart.
    pub data_dir: Option<PathBuf>,
    /// Anchoring service settings.
    pub anchor: AnchorSettings,
    /// Initial stock registered at startup.
    pub inventory: Vec<SeedProduct>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: "127.0.0.1:8080".parse().unwrap(),
            data_dir: None,
            anchor: AnchorSettings::default(),
            inventory: Vec::new(),
        }
    }
}

impl ServerConfig {
    /// Load configuration from a TOML file.
    pub fn load(path: &Path) -> ServerResult<Self> {
        let raw = std::fs::read_to_string(path)?;
        toml::from_str(&raw).map_err(|e| ServerError::Config(e.to_string()))
    }
}

/// Pinning service settings.
///
/// Credentials from `PINATA_API_KEY` / `PINATA_SECRET_API_KEY` override
/// the file values. With `enabled = false` every movement records
/// unanchored.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct AnchorSettings {
    pub enabled: bool,
    pub api_url: String,
    pub api_key: String,
    pub secret_api_key: String,
    /// Upper bound on one pinning request, in seconds.
    pub timeout_secs: u64,
}

impl Default for AnchorSettings {
    fn default() -> Self {
        Self {
            enabled: false,
            api_url: "https://api.pinata.cloud".to_string(),
            api_key: String::new(),
            secret_api_key: String::new(),
            timeout_secs: 10,
        }
    }
}

/// One product's initial stock.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SeedProduct {
    pub product_id: u64,
    pub quantity: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config() {
        let c = ServerConfig::default();
        assert_eq!(c.bind_addr, "127.0.0.1:8080".parse::<SocketAddr>().unwrap());
        assert!(c.data_dir.is_none());
        assert!(!c.anchor.enabled);
        assert_eq!(c.anchor.timeout_secs, 10);
        assert!(c.inventory.is_empty());
    }

    #[test]
    fn parses_full_toml() {
        let c: ServerConfig = toml::from_str(
            r#"
            bind_addr = "0.0.0.0:9000"
            data_dir = "/var/lib/iml"

            [anchor]
            enabled = true
            api_key = "key"
            secret_api_key = "secret"
            timeout_secs = 5

            [[inventory]]
            product_id = 42
            quantity = 10

            [[inventory]]
            product_id = 7
            quantity = 3
            "#,
        )
        .unwrap();

        assert_eq!(c.bind_addr, "0.0.0.0:9000".parse::<SocketAddr>().unwrap());
        assert_eq!(c.data_dir, Some(PathBuf::from("/var/lib/iml")));
        assert!(c.anchor.enabled);
        assert_eq!(c.anchor.api_url, "https://api.pinata.cloud");
        assert_eq!(c.anchor.timeout_secs, 5);
        assert_eq!(c.inventory.len(), 2);
        assert_eq!(c.inventory[0].product_id, 42);
        assert_eq!(c.inventory[0].quantity, 10);
    }

    #[test]
    fn partial_toml_fills_defaults() {
        let c: ServerConfig = toml::from_str(r#"bind_addr = "127.0.0.1:9999""#).unwrap();
        assert_eq!(c.bind_addr, "127.0.0.1:9999".parse::<SocketAddr>().unwrap());
        assert!(!c.anchor.enabled);
        assert!(c.inventory.is_empty());
    }
}
