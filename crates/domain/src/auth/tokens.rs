//! Bearer token types

use serde::{Deserialize, Serialize};

/// The two credentials kept by the client.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TokenKind {
    /// Short-lived credential attached to every request.
    Access,
    /// Longer-lived credential exchanged for a new access token.
    Refresh,
}

impl TokenKind {
    /// Both kinds, in a stable order.
    pub const ALL: [Self; 2] = [Self::Access, Self::Refresh];

    /// Key under which the token is persisted.
    #[must_use]
    pub const fn storage_key(self) -> &'static str {
        match self {
            Self::Access => "teacare.accessToken",
            Self::Refresh => "teacare.refreshToken",
        }
    }

    /// Resolves a persisted key back to its kind.
    #[must_use]
    pub fn from_storage_key(key: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.storage_key() == key)
    }
}

/// Token pair returned by `POST /auth/login/`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenPair {
    /// Access token.
    pub access: String,
    /// Refresh token.
    pub refresh: String,
}

/// Payload returned by `POST /auth/refresh/`.
///
/// The server only includes `refresh` when it rotates the refresh token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RefreshGrant {
    /// New access token.
    pub access: String,
    /// Rotated refresh token, if any.
    #[serde(default)]
    pub refresh: Option<String>,
}

/// Shortens a token for log output.
#[must_use]
pub fn token_preview(token: &str) -> String {
    if token.len() > 12 {
        token.get(..8).map_or_else(|| "...".to_string(), |head| format!("{head}..."))
    } else {
        "***".to_string()
    }
}
