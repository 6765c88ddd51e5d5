//! Application error types

use teacare_domain::{DomainError, ValidationErrors};
use thiserror::Error;

use crate::api::ApiError;
use crate::diagnostic::WizardError;

/// Application-level errors.
#[derive(Debug, Error)]
pub enum ApplicationError {
    /// A form failed local validation.
    #[error("invalid input: {0}")]
    Invalid(ValidationErrors),

    /// A domain rule was violated.
    #[error("domain error: {0}")]
    Domain(#[from] DomainError),

    /// The API call failed.
    #[error(transparent)]
    Api(#[from] ApiError),

    /// The diagnostic wizard rejected the event.
    #[error(transparent)]
    Wizard(#[from] WizardError),

    /// The requested resource was not found.
    #[error("not found: {0}")]
    NotFound(String),

    /// No diagnostic result to act on.
    #[error("no diagnostic result available")]
    NoResult,
}

impl ApplicationError {
    /// Message suitable for display.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::Api(err) => err.user_message(),
            Self::Invalid(errors) => errors
                .global_or("Check the information and try again.")
                .to_string(),
            other => other.to_string(),
        }
    }
}

/// Result type alias for application operations.
pub type ApplicationResult<T> = Result<T, ApplicationError>;
