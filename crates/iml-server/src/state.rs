use std::sync::Arc;
use std::time::Duration;

use tracing::info;

use iml_anchor::{AnchorClient, NoAnchor, PinataClient, PinataConfig};
use iml_chain::{BlockJournal, SyncMode};
use iml_ledger::LedgerCoordinator;
use iml_store::{InMemoryInventory, InMemoryTransactionLog};
use iml_types::ProductId;

use crate::config::{AnchorSettings, ServerConfig};
use crate::error::ServerResult;

/// Shared handler state: the one ledger coordinator for the process.
#[derive(Clone)]
pub struct AppState {
    pub ledger: Arc<LedgerCoordinator>,
}

impl AppState {
    /// Wire stores, anchor client, and journal from configuration.
    pub fn from_config(config: &ServerConfig) -> ServerResult<Self> {
        let inventory = Arc::new(InMemoryInventory::with_products(
            config
                .inventory
                .iter()
                .map(|seed| (ProductId::new(seed.product_id), seed.quantity)),
        ));
        info!(products = inventory.len(), "inventory seeded");

        let txlog = Arc::new(InMemoryTransactionLog::new());
        let anchor = build_anchor(&config.anchor)?;

        let ledger = match &config.data_dir {
            Some(dir) => {
                let journal = BlockJournal::open(&dir.join("chain.journal"), SyncMode::default())?;
                LedgerCoordinator::with_journal(inventory, txlog, anchor, journal)?
            }
            None => LedgerCoordinator::new(inventory, txlog, anchor),
        };

        Ok(Self {
            ledger: Arc::new(ledger),
        })
    }
}

/// The configured anchor client, or the disabled fallback.
///
/// Environment credentials take precedence over file credentials; the
/// endpoint and timeout always come from the file.
fn build_anchor(settings: &AnchorSettings) -> ServerResult<Arc<dyn AnchorClient>> {
    if !settings.enabled {
        info!("anchoring disabled; movements will record unanchored");
        return Ok(Arc::new(NoAnchor));
    }

    let mut pinata = PinataConfig::from_env().unwrap_or_else(|| {
        PinataConfig::new(settings.api_key.clone(), settings.secret_api_key.clone())
    });
    pinata.api_url = settings.api_url.clone();
    pinata.timeout = Duration::from_secs(settings.timeout_secs);

    info!(api_url = %pinata.api_url, "anchoring via pinning service");
    Ok(Arc::new(PinataClient::new(pinata)?))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SeedProduct;

    #[test]
    fn state_from_default_config_serves_a_fresh_chain() {
        let state = AppState::from_config(&ServerConfig::default()).unwrap();
        assert_eq!(state.ledger.chain_len().unwrap(), 1);
        assert!(state.ledger.is_valid().unwrap());
    }

    #[test]
    fn seeded_inventory_is_visible_through_the_ledger() {
        let config = ServerConfig {
            inventory: vec![SeedProduct {
                product_id: 42,
                quantity: 10,
            }],
            ..ServerConfig::default()
        };
        let state = AppState::from_config(&config).unwrap();
        assert_eq!(state.ledger.quantity(ProductId::new(42)).unwrap(), 10);
    }

    #[test]
    fn data_dir_creates_a_journal() {
        let dir = tempfile::tempdir().unwrap();
        let config = ServerConfig {
            data_dir: Some(dir.path().to_path_buf()),
            ..ServerConfig::default()
        };

        let state = AppState::from_config(&config).unwrap();
        assert_eq!(state.ledger.chain_len().unwrap(), 1);
        assert!(dir.path().join("chain.journal").exists());
    }
}
