//! HTTP transport port
//!
//! The single seam through which requests leave the process. The API client
//! decorates requests and interprets responses; the transport only moves
//! bytes.

use async_trait::async_trait;
use teacare_domain::{ApiRequest, ApiResponse};

/// Errors raised before a response status is available.
#[derive(Debug, Clone, thiserror::Error, PartialEq, Eq)]
pub enum TransportError {
    /// The request URL could not be built.
    #[error("invalid URL: {0}")]
    InvalidUrl(String),

    /// The server could not be reached.
    #[error("connection failed: {0}")]
    ConnectionFailed(String),

    /// The request did not complete in time.
    #[error("request timed out")]
    Timeout,

    /// Any other transport failure.
    #[error("transport error: {0}")]
    Other(String),
}

/// Executes requests against the API base URL.
#[async_trait]
pub trait HttpTransport: Send + Sync {
    /// Sends the request and buffers the whole response.
    ///
    /// Any status code, including 4xx and 5xx, is a successful send.
    ///
    /// # Errors
    /// Returns an error only when no response was received.
    async fn send(&self, request: &ApiRequest) -> Result<ApiResponse, TransportError>;
}
