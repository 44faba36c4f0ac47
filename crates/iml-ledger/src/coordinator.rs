use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use tracing::{debug, info, warn};

use iml_anchor::{AnchorClient, AnchorError};
use iml_chain::{Block, BlockJournal, HashChain};
use iml_store::{InventoryStore, TransactionLog};
use iml_types::{AnchorId, LogEntry, MovementKind, ProductId};

use crate::error::LedgerError;
use crate::locks::ProductLocks;
use crate::receipt::{AnchorOutcome, ChainReport, MovementReceipt};

/// Owner of the chain and orchestrator of every movement.
///
/// Exactly one coordinator exists per process; it holds the only chain
/// instance, so `index` and `previous_hash` are never computed from a
/// stale view. Writes to the chain go through a single write lock; when a
/// journal is configured, a block reaches disk before it becomes visible
/// in memory.
pub struct LedgerCoordinator {
    inventory: Arc<dyn InventoryStore>,
    txlog: Arc<dyn TransactionLog>,
    anchor: Arc<dyn AnchorClient>,
    chain: RwLock<HashChain>,
    journal: Option<BlockJournal>,
    locks: ProductLocks,
}

impl LedgerCoordinator {
    /// A coordinator over a fresh in-memory chain, without durability.
    pub fn new(
        inventory: Arc<dyn InventoryStore>,
        txlog: Arc<dyn TransactionLog>,
        anchor: Arc<dyn AnchorClient>,
    ) -> Self {
        Self {
            inventory,
            txlog,
            anchor,
            chain: RwLock::new(HashChain::new()),
            journal: None,
            locks: ProductLocks::new(),
        }
    }

    /// A coordinator whose chain is recovered from, and persisted to, the
    /// given journal.
    ///
    /// An empty journal is seeded with genesis. A recovered chain that
    /// fails verification is served anyway; there is no repair path, and
    /// queries will keep reporting it invalid.
    pub fn with_journal(
        inventory: Arc<dyn InventoryStore>,
        txlog: Arc<dyn TransactionLog>,
        anchor: Arc<dyn AnchorClient>,
        journal: BlockJournal,
    ) -> Result<Self, LedgerError> {
        let blocks = journal
            .load()
            .map_err(|e| LedgerError::StoreUnavailable(e.to_string()))?;

        let chain = if blocks.is_empty() {
            let chain = HashChain::new();
            journal
                .append(chain.latest())
                .map_err(|e| LedgerError::StoreUnavailable(e.to_string()))?;
            chain
        } else {
            let chain = HashChain::from_blocks(blocks)?;
            if let Err(fault) = chain.verify() {
                warn!(%fault, "recovered chain fails verification; serving it unrepaired");
            }
            chain
        };

        info!(
            blocks = chain.len(),
            path = %journal.path().display(),
            "chain journal opened"
        );

        Ok(Self {
            inventory,
            txlog,
            anchor,
            chain: RwLock::new(chain),
            journal: Some(journal),
            locks: ProductLocks::new(),
        })
    }

    /// Record one inventory movement.
    ///
    /// Validates the amount, applies the stock delta and persists the log
    /// entry under the product's lock, makes at most one anchor attempt,
    /// then seals and appends the block. Anchor failures downgrade the
    /// receipt to [`AnchorOutcome::Unanchored`]; they never fail the
    /// movement. Store failures before the append are fatal and leave the
    /// chain untouched.
    pub async fn record_movement(
        &self,
        kind: MovementKind,
        product: ProductId,
        amount: u64,
    ) -> Result<MovementReceipt, LedgerError> {
        if amount == 0 {
            return Err(LedgerError::InvalidAmount);
        }

        // Stock check, stock write, and log insert are serialized per
        // product; movements for other products proceed in parallel.
        let mut entry = {
            let _guard = self.locks.acquire(product).await;

            let quantity = self.inventory.quantity(product)?;
            let updated = match kind {
                MovementKind::Import => quantity
                    .checked_add(amount)
                    .ok_or(LedgerError::QuantityOverflow(product))?,
                MovementKind::Export => {
                    if amount > quantity {
                        return Err(LedgerError::InsufficientStock {
                            product,
                            requested: amount,
                            available: quantity,
                        });
                    }
                    quantity - amount
                }
            };
            self.inventory.set_quantity(product, updated)?;

            let entry = LogEntry::new(kind, product, amount);
            self.txlog.insert(&entry)?;
            entry
        };

        // One attempt, outside the product lock: anchoring is network time
        // and must not serialize same-product movements.
        let anchor = match self.attempt_anchor(&entry).await {
            Ok(anchor_id) => {
                self.txlog.attach_anchor(entry.id, &anchor_id)?;
                entry.anchor_id = Some(anchor_id.clone());
                debug!(entry = %entry.id, anchor = %anchor_id, "movement anchored");
                AnchorOutcome::Anchored(anchor_id)
            }
            Err(err) => {
                warn!(entry = %entry.id, error = %err, "anchoring failed; recording unanchored");
                AnchorOutcome::Unanchored {
                    reason: err.to_string(),
                }
            }
        };

        let block = self.append_block(&entry)?;
        debug!(
            product = %product,
            kind = %kind,
            amount,
            index = block.index,
            "movement recorded"
        );

        Ok(MovementReceipt {
            entry,
            block,
            anchor,
        })
    }

    async fn attempt_anchor(&self, entry: &LogEntry) -> Result<AnchorId, AnchorError> {
        let name = format!("movement-{}", entry.id);
        let content =
            serde_json::to_value(entry).map_err(|e| AnchorError::Payload(e.to_string()))?;
        self.anchor.anchor(&name, &content).await
    }

    /// Seal the entry's movement into a block and append it, journal first.
    fn append_block(&self, entry: &LogEntry) -> Result<Block, LedgerError> {
        let mut chain = self.write_chain()?;
        let block = Block::next(chain.latest(), entry.record());
        if let Some(journal) = &self.journal {
            journal
                .append(&block)
                .map_err(|e| LedgerError::StoreUnavailable(e.to_string()))?;
        }
        chain.push(block.clone())?;
        Ok(block)
    }

    /// Consistent snapshot of every block.
    pub fn chain(&self) -> Result<Vec<Block>, LedgerError> {
        Ok(self.read_chain()?.blocks().to_vec())
    }

    /// Current chain length, genesis included.
    pub fn chain_len(&self) -> Result<usize, LedgerError> {
        Ok(self.read_chain()?.len())
    }

    /// The current tip block.
    pub fn latest_block(&self) -> Result<Block, LedgerError> {
        Ok(self.read_chain()?.latest().clone())
    }

    /// Full re-verification of the chain, genesis to tip.
    pub fn verify_chain(&self) -> Result<ChainReport, LedgerError> {
        let chain = self.read_chain()?;
        Ok(ChainReport {
            length: chain.len(),
            fault: chain.verify().err(),
        })
    }

    /// True when the whole chain verifies.
    pub fn is_valid(&self) -> Result<bool, LedgerError> {
        Ok(self.verify_chain()?.is_valid())
    }

    /// Every log entry, in insertion order.
    pub fn list_entries(&self) -> Result<Vec<LogEntry>, LedgerError> {
        Ok(self.txlog.list_all()?)
    }

    /// Current on-hand quantity for a product.
    pub fn quantity(&self, product: ProductId) -> Result<u64, LedgerError> {
        Ok(self.inventory.quantity(product)?)
    }

    fn read_chain(&self) -> Result<RwLockReadGuard<'_, HashChain>, LedgerError> {
        self.chain
            .read()
            .map_err(|_| LedgerError::StoreUnavailable("chain lock poisoned".to_string()))
    }

    fn write_chain(&self) -> Result<RwLockWriteGuard<'_, HashChain>, LedgerError> {
        self.chain
            .write()
            .map_err(|_| LedgerError::StoreUnavailable("chain lock poisoned".to_string()))
    }
}
