//! Tamper-evident hash chain for the Inventory Movement Ledger.
//!
//! Every recorded movement is sealed into a [`Block`] whose digest commits
//! to the block's fields and to the digest of the block before it, starting
//! from a fixed genesis block. [`HashChain::verify`] re-checks the whole
//! history on demand and reports the first block that fails. The
//! [`BlockJournal`] persists sealed blocks to an append-only file so the
//! chain survives restarts.

pub mod block;
pub mod chain;
pub mod error;
pub mod journal;

pub use block::Block;
pub use chain::HashChain;
pub use error::{ChainError, JournalError};
pub use journal::{BlockJournal, SyncMode};
