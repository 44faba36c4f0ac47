//! Foundation types for the Inventory Movement Ledger (IML).
//!
//! This crate provides the identity, digest, and record types used
//! throughout the IML system. Every other IML crate depends on `iml-types`.
//!
//! # Key Types
//!
//! - [`BlockDigest`] — 32-byte SHA-256 digest, hex-encoded externally
//! - [`MovementKind`] / [`MovementRecord`] — one import or export event
//! - [`LogEntry`] — the durable record of a movement, independent of the chain
//! - [`ProductId`] / [`EntryId`] / [`AnchorId`] — identifiers

pub mod digest;
pub mod entry;
pub mod error;
pub mod movement;

pub use digest::BlockDigest;
pub use entry::{EntryId, LogEntry};
pub use error::TypeError;
pub use movement::{AnchorId, MovementKind, MovementRecord, ProductId};
