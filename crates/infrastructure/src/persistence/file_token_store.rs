//! File-backed token store.
//!
//! Tokens live in a small JSON document keyed by their storage key:
//! ```json
//! {
//!   "teacare.accessToken": "eyJ...",
//!   "teacare.refreshToken": "eyJ..."
//! }
//! ```
//! Reads are served from memory. Every write replaces the file through a
//! temporary sibling and a rename, so a crash never leaves a half-written
//! document behind. On unix the file is readable by its owner only.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::RwLock;
use teacare_application::ports::{TokenStore, TokenStoreError};
use teacare_domain::TokenKind;
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;

use crate::serialization::{from_json_bytes, to_json_stable_bytes};

type Document = BTreeMap<String, String>;
type Tokens = BTreeMap<TokenKind, String>;

/// Permission bits of the token file.
#[cfg(unix)]
const TOKEN_FILE_MODE: u32 = 0o600;

/// Token store persisted to a JSON file.
#[derive(Debug, Clone)]
pub struct FileTokenStore {
    path: PathBuf,
    tokens: Arc<RwLock<Tokens>>,
    /// Serializes writers so files land in the order changes were made.
    writer: Arc<Mutex<()>>,
}

impl FileTokenStore {
    /// Opens the store, loading any tokens already on disk.
    ///
    /// A missing file means no session. An unreadable or corrupt file is
    /// logged and treated the same way; it is overwritten on the next write.
    pub async fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let tokens = match tokio::fs::read(&path).await {
            Ok(bytes) => Self::decode(&path, &bytes),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => BTreeMap::new(),
            Err(err) => {
                tracing::warn!(path = %path.display(), error = %err, "Token file unreadable, starting signed out");
                BTreeMap::new()
            }
        };
        tracing::debug!(path = %path.display(), tokens = tokens.len(), "Token store opened");
        Self {
            path,
            tokens: Arc::new(RwLock::new(tokens)),
            writer: Arc::new(Mutex::new(())),
        }
    }

    /// Location of the token file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn decode(path: &Path, bytes: &[u8]) -> Tokens {
        match from_json_bytes::<Document>(bytes) {
            Ok(document) => document
                .into_iter()
                .filter(|(_, value)| !value.is_empty())
                .filter_map(|(key, value)| TokenKind::from_storage_key(&key).map(|kind| (kind, value)))
                .collect(),
            Err(err) => {
                tracing::warn!(path = %path.display(), error = %err, "Token file corrupt, starting signed out");
                BTreeMap::new()
            }
        }
    }

    /// Applies `change`, writes the result, then publishes it to readers.
    async fn update(&self, change: impl FnOnce(&mut Tokens) + Send) -> Result<(), TokenStoreError> {
        let _writer = self.writer.lock().await;
        let mut next = self.tokens.read().clone();
        change(&mut next);
        if next == *self.tokens.read() {
            return Ok(());
        }
        self.persist(&next).await?;
        *self.tokens.write() = next;
        Ok(())
    }

    async fn persist(&self, tokens: &Tokens) -> Result<(), TokenStoreError> {
        let document: Document = tokens
            .iter()
            .map(|(kind, value)| (kind.storage_key().to_string(), value.clone()))
            .collect();
        let bytes = to_json_stable_bytes(&document)
            .map_err(|e| TokenStoreError::Serialization(e.to_string()))?;

        let write_error = |e: std::io::Error| {
            TokenStoreError::Write(format!("{}: {e}", self.path.display()))
        };
        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            tokio::fs::create_dir_all(parent).await.map_err(write_error)?;
        }

        let staging = self.path.with_extension("json.tmp");
        // A leftover staging file could carry wider permissions.
        match tokio::fs::remove_file(&staging).await {
            Err(err) if err.kind() != std::io::ErrorKind::NotFound => return Err(write_error(err)),
            _ => {}
        }
        let mut options = tokio::fs::OpenOptions::new();
        options.write(true).create_new(true);
        #[cfg(unix)]
        options.mode(TOKEN_FILE_MODE);
        let mut file = options.open(&staging).await.map_err(write_error)?;
        file.write_all(&bytes).await.map_err(write_error)?;
        file.sync_all().await.map_err(write_error)?;
        drop(file);

        tokio::fs::rename(&staging, &self.path)
            .await
            .map_err(write_error)?;
        Ok(())
    }
}

#[async_trait]
impl TokenStore for FileTokenStore {
    fn get(&self, kind: TokenKind) -> Option<String> {
        self.tokens.read().get(&kind).cloned()
    }

    async fn set(&self, kind: TokenKind, value: &str) -> Result<(), TokenStoreError> {
        if value.is_empty() {
            return Ok(());
        }
        let value = value.to_string();
        self.update(move |tokens| {
            tokens.insert(kind, value);
        })
        .await
    }

    async fn clear(&self, kind: TokenKind) -> Result<(), TokenStoreError> {
        self.update(move |tokens| {
            tokens.remove(&kind);
        })
        .await
    }

    async fn clear_all(&self) -> Result<(), TokenStoreError> {
        self.update(BTreeMap::clear).await
    }
}
