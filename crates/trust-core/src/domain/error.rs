//! Domain-level error taxonomy for contributor trust scoring.

/// Errors produced while normalizing or decoding review events.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ValidationError {
    #[error("unknown event type: {kind}")]
    UnknownEventType { kind: String },

    #[error("event type must not be empty")]
    EmptyEventType,

    #[error("invalid event timestamp: {value}")]
    InvalidTimestamp { value: String },

    #[error("unknown compact event code: {code}")]
    UnknownCompactCode { code: String },

    #[error("contributor id must not be empty")]
    EmptyContributor,
}

/// Trust scoring errors.
#[derive(Debug, thiserror::Error)]
pub enum TrustError {
    #[error("validation error: {0}")]
    Validation(#[from] ValidationError),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("contributor not found: {0}")]
    ContributorNotFound(String),

    #[error("invalid state document: {0}")]
    InvalidStateDocument(String),

    #[error("storage error: {0}")]
    StorageError(String),
}

/// Result type for trust scoring operations.
pub type Result<T> = std::result::Result<T, TrustError>;
