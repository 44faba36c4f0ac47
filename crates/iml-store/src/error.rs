use iml_types::{EntryId, ProductId};

/// Errors from inventory and transaction-log operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StoreError {
    /// The product is not registered in the inventory.
    #[error("product not found: {0}")]
    NotFound(ProductId),

    /// The log entry does not exist.
    #[error("log entry not found: {0}")]
    EntryNotFound(EntryId),

    /// An entry with this id was already inserted.
    #[error("duplicate log entry: {0}")]
    DuplicateEntry(EntryId),

    /// The entry already carries an anchor id; it is attached at most once.
    #[error("log entry {0} is already anchored")]
    AlreadyAnchored(EntryId),

    /// The backing store cannot be reached. Fatal for the movement that hit
    /// it; the caller retries the whole operation.
    #[error("store unavailable: {0}")]
    Unavailable(String),
}

/// Result alias for store operations.
pub type StoreResult<T> = Result<T, StoreError>;
