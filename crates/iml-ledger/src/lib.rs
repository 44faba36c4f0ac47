//! Ledger coordinator for the Inventory Movement Ledger.
//!
//! Turns an inventory mutation into a durable, optionally-anchored log
//! entry and a sealed chain block, in that order, with one anchor attempt
//! per movement and a degraded unanchored path when the anchoring service
//! is unreachable. Also the home of the read-side chain queries.

pub mod coordinator;
pub mod error;
pub mod receipt;

mod locks;

pub use coordinator::LedgerCoordinator;
pub use error::LedgerError;
pub use receipt::{AnchorOutcome, ChainReport, MovementReceipt};
