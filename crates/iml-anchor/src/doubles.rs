use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use iml_types::AnchorId;

use crate::error::AnchorError;
use crate::traits::AnchorClient;

/// Anchor client that always succeeds with a fixed identifier.
///
/// Counts calls so "attempted exactly once" is assertable in tests.
pub struct FixedAnchor {
    id: AnchorId,
    calls: AtomicUsize,
}

impl FixedAnchor {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: AnchorId::new(id),
            calls: AtomicUsize::new(0),
        }
    }

    /// Number of anchor attempts made against this double.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl AnchorClient for FixedAnchor {
    async fn anchor(
        &self,
        _name: &str,
        _content: &serde_json::Value,
    ) -> Result<AnchorId, AnchorError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.id.clone())
    }
}

/// Anchor client that always fails with a transport error.
pub struct UnavailableAnchor {
    calls: AtomicUsize,
}

impl UnavailableAnchor {
    pub fn new() -> Self {
        Self {
            calls: AtomicUsize::new(0),
        }
    }

    /// Number of anchor attempts made against this double.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl Default for UnavailableAnchor {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl AnchorClient for UnavailableAnchor {
    async fn anchor(
        &self,
        _name: &str,
        _content: &serde_json::Value,
    ) -> Result<AnchorId, AnchorError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Err(AnchorError::Transport(
            "anchor service unreachable".to_string(),
        ))
    }
}
