//! In-memory token storage.
//!
//! Used for ephemeral sessions and as the test double behind the
//! [`TokenStore`] port. Tokens vanish with the process.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::RwLock;
use teacare_domain::TokenKind;

use crate::ports::{TokenStore, TokenStoreError};

/// Thread-safe in-memory token store.
#[derive(Debug, Clone, Default)]
pub struct MemoryTokenStore {
    tokens: Arc<RwLock<HashMap<TokenKind, String>>>,
}

impl MemoryTokenStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store already holding a session.
    #[must_use]
    pub fn with_tokens(access: &str, refresh: &str) -> Self {
        let store = Self::new();
        {
            let mut tokens = store.tokens.write();
            tokens.insert(TokenKind::Access, access.to_string());
            tokens.insert(TokenKind::Refresh, refresh.to_string());
        }
        store
    }

    /// Get count of stored tokens.
    #[must_use]
    pub fn count(&self) -> usize {
        self.tokens.read().len()
    }
}

#[async_trait]
impl TokenStore for MemoryTokenStore {
    fn get(&self, kind: TokenKind) -> Option<String> {
        self.tokens.read().get(&kind).cloned()
    }

    async fn set(&self, kind: TokenKind, value: &str) -> Result<(), TokenStoreError> {
        if value.is_empty() {
            return Ok(());
        }
        self.tokens.write().insert(kind, value.to_string());
        Ok(())
    }

    async fn clear(&self, kind: TokenKind) -> Result<(), TokenStoreError> {
        self.tokens.write().remove(&kind);
        Ok(())
    }

    async fn clear_all(&self) -> Result<(), TokenStoreError> {
        self.tokens.write().clear();
        Ok(())
    }
}
