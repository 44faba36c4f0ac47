use iml_types::{AnchorId, EntryId, LogEntry, ProductId};

use crate::error::StoreResult;

/// On-hand quantity store, keyed by product.
///
/// All implementations must satisfy these invariants:
/// - Reads and writes are strongly consistent: a `quantity` call observes
///   every `set_quantity` that completed before it.
/// - Unknown products are an error, never an implicit zero. Product
///   registration is catalog territory and happens out of band.
/// - A store that cannot reach its backing state fails fast with
///   `Unavailable` instead of serving stale quantities.
pub trait InventoryStore: Send + Sync {
    /// Current on-hand quantity for a product.
    fn quantity(&self, product: ProductId) -> StoreResult<u64>;

    /// Overwrite the on-hand quantity for a product.
    fn set_quantity(&self, product: ProductId, quantity: u64) -> StoreResult<()>;
}

/// Durable record of every movement, independent of the chain.
///
/// All implementations must satisfy these invariants:
/// - Entries are immutable once inserted, except for a single
///   `attach_anchor` update; a second attachment is rejected.
/// - `list_all` returns entries in insertion order.
/// - Entry ids are caller-generated and unique; inserting a duplicate id
///   is an error.
pub trait TransactionLog: Send + Sync {
    /// Persist a new entry. Returns its id.
    fn insert(&self, entry: &LogEntry) -> StoreResult<EntryId>;

    /// Record the anchor id on an existing, not-yet-anchored entry.
    fn attach_anchor(&self, id: EntryId, anchor: &AnchorId) -> StoreResult<()>;

    /// Every entry, in insertion order.
    fn list_all(&self) -> StoreResult<Vec<LogEntry>>;
}
