use thiserror::Error;

/// Failures from a single anchor attempt.
///
/// Anchoring is advisory: the coordinator records these reasons on the
/// movement receipt instead of failing the movement. No variant is
/// retried by the client itself.
#[derive(Debug, Clone, Error)]
pub enum AnchorError {
    /// The request never produced an HTTP response (DNS, connect,
    /// timeout). Timeouts are bounded by the client configuration.
    #[error("anchor transport error: {0}")]
    Transport(String),

    /// The pinning service answered with a non-success status.
    #[error("anchor service returned status {code}")]
    Status { code: u16 },

    /// The response body was readable but carried no content identifier.
    #[error("anchor response missing content identifier")]
    MissingIdentifier,

    /// The content to pin could not be encoded as JSON.
    #[error("anchor payload could not be encoded: {0}")]
    Payload(String),

    /// Anchoring is switched off; no attempt was made.
    #[error("anchoring disabled by configuration")]
    Disabled,

    /// The client could not be built from its configuration.
    #[error("anchor client configuration: {0}")]
    Config(String),
}
