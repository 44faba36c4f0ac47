use std::fmt;

use serde::{Deserialize, Serialize};

/// Identifier of a product in the inventory catalog.
///
/// The catalog itself lives outside this system; the ledger only ever
/// references products by id.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProductId(u64);

impl ProductId {
    pub const fn new(id: u64) -> Self {
        Self(id)
    }

    pub const fn value(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for ProductId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for ProductId {
    fn from(id: u64) -> Self {
        Self(id)
    }
}

/// Content identifier returned by the anchoring service (e.g. an IPFS CID).
///
/// Opaque to this system: it is stored, displayed, and handed back to the
/// gateway for retrieval, never interpreted.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AnchorId(String);

impl AnchorId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns `true` if the identifier is empty (a response that names
    /// no content is treated as missing).
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for AnchorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Direction of an inventory movement.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MovementKind {
    /// Stock received: quantity increases.
    Import,
    /// Stock shipped: quantity decreases.
    Export,
}

impl MovementKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Import => "import",
            Self::Export => "export",
        }
    }

    pub fn is_export(&self) -> bool {
        matches!(self, Self::Export)
    }
}

impl fmt::Display for MovementKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One inventory movement as committed to the hash chain.
///
/// `anchor_id` is present only when the anchoring call for this movement
/// succeeded; anchoring is attempted at most once per movement and never
/// retried after the block is appended.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MovementRecord {
    #[serde(rename = "type")]
    pub kind: MovementKind,
    pub product_id: ProductId,
    pub amount: u64,
    pub anchor_id: Option<AnchorId>,
}

impl MovementRecord {
    pub fn new(kind: MovementKind, product_id: ProductId, amount: u64) -> Self {
        Self {
            kind,
            product_id,
            amount,
            anchor_id: None,
        }
    }

    pub fn with_anchor(mut self, anchor_id: AnchorId) -> Self {
        self.anchor_id = Some(anchor_id);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kind_wire_form_is_lowercase() {
        assert_eq!(serde_json::to_string(&MovementKind::Import).unwrap(), "\"import\"");
        assert_eq!(serde_json::to_string(&MovementKind::Export).unwrap(), "\"export\"");
        let parsed: MovementKind = serde_json::from_str("\"export\"").unwrap();
        assert_eq!(parsed, MovementKind::Export);
    }

    #[test]
    fn record_serializes_kind_as_type() {
        let record = MovementRecord::new(MovementKind::Import, ProductId::new(42), 3);
        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["type"], "import");
        assert_eq!(json["product_id"], 42);
        assert_eq!(json["amount"], 3);
        assert!(json["anchor_id"].is_null());
    }

    #[test]
    fn with_anchor_sets_identifier() {
        let record = MovementRecord::new(MovementKind::Export, ProductId::new(7), 1)
            .with_anchor(AnchorId::new("QmExample"));
        assert_eq!(record.anchor_id.as_ref().map(AnchorId::as_str), Some("QmExample"));
    }

    #[test]
    fn record_roundtrip() {
        let record = MovementRecord::new(MovementKind::Export, ProductId::new(9), 12)
            .with_anchor(AnchorId::new("bafyExample"));
        let json = serde_json::to_string(&record).unwrap();
        let parsed: MovementRecord = serde_json::from_str(&json).unwrap();
        assert_eq!(record, parsed);
    }

    #[test]
    fn product_id_display() {
        assert_eq!(ProductId::new(42).to_string(), "42");
        assert_eq!(ProductId::from(7).value(), 7);
    }

    #[test]
    fn empty_anchor_id_detected() {
        assert!(AnchorId::new("").is_empty());
        assert!(!AnchorId::new("Qm").is_empty());
    }
}
