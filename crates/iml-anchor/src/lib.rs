//! External anchoring boundary for the Inventory Movement Ledger.
//!
//! Movements are optionally pinned to a content-addressed store so the
//! ledger's history can later be proven unaltered. [`AnchorClient`] is the
//! seam; [`PinataClient`] speaks the Pinata JSON-pinning wire contract; the
//! doubles make the coordinator's exactly-once attempt behavior testable
//! without a network.

pub mod doubles;
pub mod error;
pub mod pinata;
pub mod traits;

pub use doubles::{FixedAnchor, UnavailableAnchor};
pub use error::AnchorError;
pub use pinata::{PinataClient, PinataConfig};
pub use traits::{AnchorClient, NoAnchor};
