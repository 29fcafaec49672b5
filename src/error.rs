//! Error types for the Hermes prompt relay
//!
//! This module provides comprehensive error handling using thiserror for
//! structured error definitions and anyhow for error propagation.

use thiserror::Error;

/// Main error type for relay operations
#[derive(Error, Debug)]
pub enum RelayError {
    /// No drafts available in the queried stage
    #[error("No drafts found: {0}")]
    NoDraftsFound(String),

    /// Artifact name does not contain a decodable draft id
    #[error("Malformed artifact name: {0}")]
    MalformedName(String),

    /// Draft not present in the expected stage
    #[error("Draft not found: {0}")]
    NotFound(String),

    /// Draft already present in the destination stage
    #[error("Draft already exists: {0}")]
    AlreadyExists(String),

    /// Transition attempted from the wrong stage
    #[error("Invalid state: {0}")]
    InvalidState(String),

    /// Agent name is not in the configured registry
    #[error("Unknown agent: {0}")]
    UnknownAgent(String),

    /// Acknowledging agent does not match the recorded recipient
    #[error("Wrong agent: {0}")]
    WrongAgent(String),

    /// Required command argument was not supplied
    #[error("Missing required argument: {0}")]
    MissingArgument(String),

    /// Advisory lock could not be acquired within the deadline
    #[error("Lock timeout: {0}")]
    LockTimeout(String),

    /// Slug cannot be embedded in an artifact name
    #[error("Invalid slug: {0}")]
    InvalidSlug(String),

    /// More than one draft shares the maximal sequence key
    #[error("Ambiguous latest draft: {0}")]
    AmbiguousLatest(String),

    /// Invalid draft ID format
    #[error("Invalid draft ID: {0}")]
    InvalidDraftId(#[from] uuid::Error),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Generic error with context
    #[error("{0}")]
    Other(String),
}

/// Result type alias for relay operations
pub type Result<T> = std::result::Result<T, RelayError>;

/// Convert anyhow::Error to RelayError
impl From<anyhow::Error> for RelayError {
    fn from(err: anyhow::Error) -> Self {
        RelayError::Other(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = RelayError::NotFound("a1b2 in pending".to_string());
        assert_eq!(err.to_string(), "Draft not found: a1b2 in pending");
    }

    #[test]
    fn test_error_conversion() {
        let uuid_err = uuid::Uuid::parse_str("invalid");
        assert!(uuid_err.is_err());

        let relay_err: RelayError = uuid_err.unwrap_err().into();
        assert!(matches!(relay_err, RelayError::InvalidDraftId(_)));
    }
}
