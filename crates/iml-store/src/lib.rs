//! Storage boundaries for the Inventory Movement Ledger.
//!
//! Defines the [`InventoryStore`] and [`TransactionLog`] traits the ledger
//! coordinator writes through, plus in-memory reference implementations
//! used by the server and by tests. Durable backends implement the same
//! traits without the coordinator noticing.

pub mod error;
pub mod memory;
pub mod traits;

pub use error::{StoreError, StoreResult};
pub use memory::{InMemoryInventory, InMemoryTransactionLog};
pub use traits::{InventoryStore, TransactionLog};
