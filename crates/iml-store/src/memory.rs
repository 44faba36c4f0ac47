use std::collections::HashMap;
use std::sync::RwLock;

use iml_types::{AnchorId, EntryId, LogEntry, ProductId};

use crate::error::{StoreError, StoreResult};
use crate::traits::{InventoryStore, TransactionLog};

/// In-memory, HashMap-based inventory.
///
/// Intended for tests, the reference server, and embedding. Quantities are
/// held behind a `RwLock` for safe concurrent access.
pub struct InMemoryInventory {
    quantities: RwLock<HashMap<ProductId, u64>>,
}

impl InMemoryInventory {
    /// Create a new empty inventory.
    pub fn new() -> Self {
        Self {
            quantities: RwLock::new(HashMap::new()),
        }
    }

    /// Create an inventory pre-seeded with initial stock.
    pub fn with_products(seed: impl IntoIterator<Item = (ProductId, u64)>) -> Self {
        Self {
            quantities: RwLock::new(seed.into_iter().collect()),
        }
    }

    /// Register a product, overwriting any existing quantity.
    ///
    /// Seeding helper on the concrete type; the trait deliberately has no
    /// registration surface.
    pub fn insert_product(&self, product: ProductId, quantity: u64) {
        self.quantities
            .write()
            .expect("lock poisoned")
            .insert(product, quantity);
    }

    /// Number of registered products.
    pub fn len(&self) -> usize {
        self.quantities.read().expect("lock poisoned").len()
    }

    /// Returns `true` if no products are registered.
    pub fn is_empty(&self) -> bool {
        self.quantities.read().expect("lock poisoned").is_empty()
    }

    /// All products with their quantities, sorted by product id.
    pub fn snapshot(&self) -> Vec<(ProductId, u64)> {
        let map = self.quantities.read().expect("lock poisoned");
        let mut items: Vec<(ProductId, u64)> = map.iter().map(|(p, q)| (*p, *q)).collect();
        items.sort_by_key(|(p, _)| *p);
        items
    }
}

impl Default for InMemoryInventory {
    fn default() -> Self {
        Self::new()
    }
}

impl InventoryStore for InMemoryInventory {
    fn quantity(&self, product: ProductId) -> StoreResult<u64> {
        let map = self.quantities.read().expect("lock poisoned");
        map.get(&product)
            .copied()
            .ok_or(StoreError::NotFound(product))
    }

    fn set_quantity(&self, product: ProductId, quantity: u64) -> StoreResult<()> {
        let mut map = self.quantities.write().expect("lock poisoned");
        match map.get_mut(&product) {
            Some(slot) => {
                *slot = quantity;
                Ok(())
            }
            None => Err(StoreError::NotFound(product)),
        }
    }
}

impl std::fmt::Debug for InMemoryInventory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InMemoryInventory")
            .field("product_count", &self.len())
            .finish()
    }
}

/// Entries in insertion order, with an id index for anchor attachment.
struct LogInner {
    entries: Vec<LogEntry>,
    by_id: HashMap<EntryId, usize>,
}

/// In-memory transaction log.
pub struct InMemoryTransactionLog {
    inner: RwLock<LogInner>,
}

impl InMemoryTransactionLog {
    /// Create a new empty log.
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(LogInner {
                entries: Vec::new(),
                by_id: HashMap::new(),
            }),
        }
    }

    /// Number of logged entries.
    pub fn len(&self) -> usize {
        self.inner.read().expect("lock poisoned").entries.len()
    }

    /// Returns `true` if nothing has been logged.
    pub fn is_empty(&self) -> bool {
        self.inner.read().expect("lock poisoned").entries.is_empty()
    }

    /// A single entry by id.
    pub fn get(&self, id: EntryId) -> Option<LogEntry> {
        let inner = self.inner.read().expect("lock poisoned");
        inner.by_id.get(&id).map(|&idx| inner.entries[idx].clone())
    }
}

impl Default for InMemoryTransactionLog {
    fn default() -> Self {
        Self::new()
    }
}

impl TransactionLog for InMemoryTransactionLog {
    fn insert(&self, entry: &LogEntry) -> StoreResult<EntryId> {
        let mut inner = self.inner.write().expect("lock poisoned");
        if inner.by_id.contains_key(&entry.id) {
            return Err(StoreError::DuplicateEntry(entry.id));
        }
        let idx = inner.entries.len();
        inner.entries.push(entry.clone());
        inner.by_id.insert(entry.id, idx);
        Ok(entry.id)
    }

    fn attach_anchor(&self, id: EntryId, anchor: &AnchorId) -> StoreResult<()> {
        let mut inner = self.inner.write().expect("lock poisoned");
        let idx = *inner.by_id.get(&id).ok_or(StoreError::EntryNotFound(id))?;
        let entry = &mut inner.entries[idx];
        if entry.anchor_id.is_some() {
            return Err(StoreError::AlreadyAnchored(id));
        }
        entry.anchor_id = Some(anchor.clone());
        Ok(())
    }

    fn list_all(&self) -> StoreResult<Vec<LogEntry>> {
        let inner = self.inner.read().expect("lock poisoned");
        Ok(inner.entries.clone())
    }
}

impl std::fmt::Debug for InMemoryTransactionLog {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InMemoryTransactionLog")
            .field("entry_count", &self.len())
            .finish()
    }
}
