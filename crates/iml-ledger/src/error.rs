use iml_chain::ChainError;
use iml_store::StoreError;
use iml_types::ProductId;
use thiserror::Error;

/// Failures from recording movements and querying the ledger.
///
/// The first four variants are caller errors with zero side effects: the
/// call can be retried identically. `StoreUnavailable` aborts a movement
/// before its block is appended; retrying re-checks stock. Anchor failures
/// never appear here, they ride along inside an unanchored receipt.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LedgerError {
    /// Movements always move a positive amount.
    #[error("movement amount must be positive")]
    InvalidAmount,

    /// The import would overflow the stored quantity.
    #[error("import would overflow stored quantity for product {0}")]
    QuantityOverflow(ProductId),

    /// The product is not registered in the inventory.
    #[error("product not found: {0}")]
    ProductNotFound(ProductId),

    /// An export larger than the current stock.
    #[error(
        "insufficient stock for product {product}: requested {requested}, available {available}"
    )]
    InsufficientStock {
        product: ProductId,
        requested: u64,
        available: u64,
    },

    /// Durable state could not be written or read. Fatal for the movement
    /// that hit it; no block is appended.
    #[error("store unavailable: {0}")]
    StoreUnavailable(String),

    /// The chain rejected an append or failed structural validation.
    #[error(transparent)]
    Chain(#[from] ChainError),
}

impl From<StoreError> for LedgerError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound(product) => LedgerError::ProductNotFound(product),
            StoreError::Unavailable(reason) => LedgerError::StoreUnavailable(reason),
            other => LedgerError::StoreUnavailable(other.to_string()),
        }
    }
}
