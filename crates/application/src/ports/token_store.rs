//! Token store port
//!
//! Defines the interface for bearer token persistence.

use async_trait::async_trait;
use teacare_domain::TokenKind;

/// Errors that can occur while persisting tokens.
#[derive(Debug, Clone, thiserror::Error, PartialEq, Eq)]
pub enum TokenStoreError {
    /// The backing storage could not be written.
    #[error("token storage write failed: {0}")]
    Write(String),

    /// The backing storage could not be serialized.
    #[error("token storage serialization failed: {0}")]
    Serialization(String),
}

/// Capability to read and write the session tokens.
///
/// Reads are served from memory. Writes may touch storage and are atomic per
/// key. Empty values are ignored so a partial server response can never erase
/// a stored credential.
#[async_trait]
pub trait TokenStore: Send + Sync {
    /// Returns the stored token of the given kind.
    fn get(&self, kind: TokenKind) -> Option<String>;

    /// Stores a token. Empty values are a no-op.
    ///
    /// # Errors
    /// Returns an error if the backing storage cannot be written.
    async fn set(&self, kind: TokenKind, value: &str) -> Result<(), TokenStoreError>;

    /// Removes the token of the given kind.
    ///
    /// # Errors
    /// Returns an error if the backing storage cannot be written.
    async fn clear(&self, kind: TokenKind) -> Result<(), TokenStoreError>;

    /// Removes both tokens.
    ///
    /// # Errors
    /// Returns an error if the backing storage cannot be written.
    async fn clear_all(&self) -> Result<(), TokenStoreError> {
        for kind in TokenKind::ALL {
            self.clear(kind).await?;
        }
        Ok(())
    }

    /// Stores the token when one is present.
    ///
    /// # Errors
    /// Returns an error if the backing storage cannot be written.
    async fn set_if_present(
        &self,
        kind: TokenKind,
        value: Option<&str>,
    ) -> Result<(), TokenStoreError> {
        match value {
            Some(value) => self.set(kind, value).await,
            None => Ok(()),
        }
    }
}
