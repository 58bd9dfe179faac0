use thiserror::Error;

/// Engine-wide error types for the Augur scoring engine.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum AugurError {
    /// A value lies outside the mathematical domain (non-positive or non-finite loss).
    #[error("Domain error: {0}")]
    Domain(String),

    /// Structurally invalid input (length mismatch, zero total stake, duplicates).
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Malformed participant address.
    #[error("Identity error: {0}")]
    Identity(String),

    /// Missing stake, roster, or bundle field.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Collaborator write or read failure.
    #[error("Persistence error: {0}")]
    Persistence(String),

    /// Append-only write rejected because the key already exists.
    #[error("Duplicate key: {0}")]
    DuplicateKey(String),

    /// Serialization/deserialization error.
    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl From<serde_json::Error> for AugurError {
    fn from(e: serde_json::Error) -> Self {
        AugurError::Serialization(e.to_string())
    }
}
