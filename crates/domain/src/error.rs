//! Domain error types

use thiserror::Error;

/// Domain-level errors that can occur during validation or processing.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// A diagnostic score outside the yes/no range.
    #[error("invalid score: {0}")]
    InvalidScore(i64),

    /// A payload did not have the expected shape.
    #[error("malformed payload: {0}")]
    MalformedPayload(String),

    /// An identifier is invalid or empty.
    #[error("invalid identifier: {0}")]
    InvalidIdentifier(String),
}

/// Result type alias for domain operations.
pub type DomainResult<T> = Result<T, DomainError>;
