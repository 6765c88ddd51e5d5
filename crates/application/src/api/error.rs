//! API error taxonomy

use teacare_domain::{ApiResponse, ValidationErrors};
use thiserror::Error;

use crate::ports::{TokenStoreError, TransportError};

/// Statuses that reject the submitted input even without a readable body.
const INPUT_REJECTED: [u16; 2] = [400, 422];

/// Message shown when nothing more specific is available.
pub const GENERIC_MESSAGE: &str = "Something went wrong. Please try again.";

/// Why a token refresh did not produce a new access token.
///
/// Cloned to every request parked behind the same refresh.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum RefreshFailure {
    /// No refresh token is stored; the endpoint is never called.
    #[error("no refresh token stored")]
    MissingToken,

    /// The refresh endpoint answered with a non-success status.
    #[error("refresh rejected with status {status}")]
    Rejected {
        /// Status code.
        status: u16,
    },

    /// The refresh endpoint could not be reached.
    #[error("refresh request failed: {0}")]
    Transport(TransportError),

    /// The refresh response did not carry an access token.
    #[error("refresh response unreadable: {0}")]
    Malformed(String),

    /// The new tokens could not be persisted.
    #[error("refreshed tokens not stored: {0}")]
    Storage(TokenStoreError),

    /// The refresh owner went away before settling.
    #[error("token refresh was abandoned")]
    Abandoned,
}

/// Errors surfaced by the API client.
#[derive(Debug, Clone, Error)]
pub enum ApiError {
    /// The server could not be reached.
    #[error("network error: {0}")]
    Network(#[from] TransportError),

    /// The server rejected the credentials, after any refresh attempt.
    #[error("unauthorized: {}", .0.global_or("authentication required"))]
    Unauthorized(ValidationErrors),

    /// The session could not be renewed; stored tokens were cleared.
    #[error("session refresh failed: {0}")]
    RefreshFailed(RefreshFailure),

    /// A refresh was needed but no refresh token is stored.
    #[error("no refresh token available")]
    MissingRefreshToken,

    /// The server rejected the input: a 4xx other than 401 carrying error
    /// messages, or a bare 400/422.
    #[error("request rejected with status {status}: {errors}")]
    Validation {
        /// Status code.
        status: u16,
        /// Parsed field and global messages.
        errors: ValidationErrors,
    },

    /// The server failed (5xx) or answered with an unexpected status, such
    /// as a 404 without error details.
    #[error("server error {status}: {message}")]
    Server {
        /// Status code.
        status: u16,
        /// Body excerpt.
        message: String,
    },

    /// A successful response body did not have the expected shape.
    #[error("unexpected response body: {0}")]
    Decode(String),

    /// A request body could not be serialized.
    #[error("request body not serializable: {0}")]
    Encode(String),

    /// Tokens could not be persisted.
    #[error(transparent)]
    TokenStore(#[from] TokenStoreError),
}

impl ApiError {
    /// Classifies a non-success response.
    #[must_use]
    pub fn from_response(response: &ApiResponse) -> Self {
        if response.is_unauthorized() {
            return Self::Unauthorized(ValidationErrors::from_body(&response.body));
        }
        let errors = ValidationErrors::from_body(&response.body);
        if response.is_client_error()
            && (!errors.is_empty() || INPUT_REJECTED.contains(&response.status))
        {
            Self::Validation {
                status: response.status,
                errors,
            }
        } else {
            Self::Server {
                status: response.status,
                message: excerpt(&response.text_lossy()),
            }
        }
    }

    /// Returns true for authentication failures, including failed refreshes.
    #[must_use]
    pub const fn is_auth_failure(&self) -> bool {
        matches!(
            self,
            Self::Unauthorized(_) | Self::RefreshFailed(_) | Self::MissingRefreshToken
        )
    }

    /// Field-level messages, for validation failures.
    #[must_use]
    pub const fn validation_errors(&self) -> Option<&ValidationErrors> {
        match self {
            Self::Validation { errors, .. } | Self::Unauthorized(errors) => Some(errors),
            _ => None,
        }
    }

    /// Message suitable for display.
    ///
    /// Validation failures show the server's global message; everything else
    /// maps to a generic sentence and the details go to the log.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::Network(_) => "Could not reach the server. Check your connection.".to_string(),
            Self::Unauthorized(errors) => errors
                .global_or("Invalid credentials or expired session.")
                .to_string(),
            Self::RefreshFailed(_) | Self::MissingRefreshToken => {
                "Your session has expired. Please sign in again.".to_string()
            }
            Self::Validation { errors, .. } => {
                errors.global_or("Check the information and try again.").to_string()
            }
            Self::Server { .. } | Self::Decode(_) | Self::Encode(_) | Self::TokenStore(_) => {
                GENERIC_MESSAGE.to_string()
            }
        }
    }
}

impl From<RefreshFailure> for ApiError {
    fn from(failure: RefreshFailure) -> Self {
        match failure {
            RefreshFailure::MissingToken => Self::MissingRefreshToken,
            other => Self::RefreshFailed(other),
        }
    }
}

fn excerpt(body: &str) -> String {
    const LIMIT: usize = 200;
    let trimmed = body.trim();
    match trimmed.char_indices().nth(LIMIT) {
        Some((index, _)) => format!("{}...", &trimmed[..index]),
        None => trimmed.to_string(),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::panic)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_classification() {
        let err = ApiError::from_response(&ApiResponse::new(400, r#"{"email": ["Required."]}"#));
        match &err {
            ApiError::Validation { status, errors } => {
                assert_eq!(*status, 400);
                assert_eq!(errors.field("email"), Some("Required."));
            }
            other => panic!("unexpected {other:?}"),
        }
        assert_eq!(err.user_message(), "Required.");

        let err = ApiError::from_response(&ApiResponse::new(503, "upstream down"));
        assert!(matches!(err, ApiError::Server { status: 503, .. }));
        assert_eq!(err.user_message(), GENERIC_MESSAGE);

        let err = ApiError::from_response(&ApiResponse::new(
            401,
            r#"{"detail": "No active account found with the given credentials"}"#,
        ));
        assert!(err.is_auth_failure());
        assert_eq!(
            err.user_message(),
            "No active account found with the given credentials"
        );
    }

    #[test]
    fn test_refresh_failures() {
        assert!(matches!(
            ApiError::from(RefreshFailure::MissingToken),
            ApiError::MissingRefreshToken
        ));
        let err = ApiError::from(RefreshFailure::Rejected { status: 500 });
        assert!(err.is_auth_failure());
        assert_eq!(
            err.user_message(),
            "Your session has expired. Please sign in again."
        );
    }

    #[test]
    fn test_unrecognized_validation_body_falls_back() {
        let err = ApiError::from_response(&ApiResponse::new(422, "<html></html>"));
        assert_eq!(err.user_message(), "Check the information and try again.");
    }

    #[test]
    fn test_client_error_without_details_is_not_validation() {
        let err = ApiError::from_response(&ApiResponse::new(404, ""));
        assert!(matches!(err, ApiError::Server { status: 404, .. }));
        assert!(err.validation_errors().is_none());
        assert_eq!(err.user_message(), GENERIC_MESSAGE);

        let err = ApiError::from_response(&ApiResponse::new(405, "<h1>Method Not Allowed</h1>"));
        assert!(matches!(err, ApiError::Server { status: 405, .. }));

        let err = ApiError::from_response(&ApiResponse::new(404, r#"{"detail": "Not found."}"#));
        assert!(matches!(err, ApiError::Validation { status: 404, .. }));
        assert_eq!(err.user_message(), "Not found.");

        let err = ApiError::from_response(&ApiResponse::new(400, ""));
        assert!(matches!(err, ApiError::Validation { status: 400, .. }));
    }

    #[test]
    fn test_excerpt_truncates_long_bodies() {
        let long = "x".repeat(500);
        let err = ApiError::from_response(&ApiResponse::new(500, long));
        match err {
            ApiError::Server { message, .. } => assert_eq!(message.len(), 203),
            other => panic!("unexpected {other:?}"),
        }
    }
}
