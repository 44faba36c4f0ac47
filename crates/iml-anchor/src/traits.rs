use async_trait::async_trait;
use iml_types::AnchorId;

use crate::error::AnchorError;

/// External content-addressed anchoring service.
///
/// All implementations must satisfy these invariants:
/// - One call makes at most one anchoring attempt; retries belong to the
///   caller, and the coordinator never retries.
/// - Success returns the content identifier under which the pinned JSON
///   can later be retrieved.
/// - Network time is bounded; a hung service surfaces as a transport
///   error, not a stuck coordinator.
#[async_trait]
pub trait AnchorClient: Send + Sync {
    /// Pin `content` under a human-readable `name`.
    async fn anchor(
        &self,
        name: &str,
        content: &serde_json::Value,
    ) -> Result<AnchorId, AnchorError>;
}

/// Client used when anchoring is not configured.
///
/// Fails every attempt immediately, so movements record unanchored with a
/// clear reason and no network time is spent.
pub struct NoAnchor;

#[async_trait]
impl AnchorClient for NoAnchor {
    async fn anchor(
        &self,
        _name: &str,
        _content: &serde_json::Value,
    ) -> Result<AnchorId, AnchorError> {
        Err(AnchorError::Disabled)
    }
}
