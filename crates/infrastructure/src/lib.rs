//! TEAcare Infrastructure - Adapters and implementations
//!
//! This crate provides concrete implementations of the ports
//! defined in the application layer, plus configuration loading.

pub mod adapters;
pub mod config;
pub mod persistence;
pub mod serialization;

use std::sync::Arc;

use teacare_application::api::{ApiClient, ClinicalApi};
use teacare_application::ports::TransportError;

pub use adapters::ReqwestTransport;
pub use config::{ClientConfig, ConfigError, ConfigOverrides};
pub use persistence::FileTokenStore;
pub use serialization::{SerializationError, from_json_bytes, to_json_stable_bytes};

/// Wires the reqwest transport and the file token store into a
/// [`ClinicalApi`].
///
/// # Errors
/// Returns an error if the HTTP client cannot be built.
pub async fn connect(config: &ClientConfig) -> Result<ClinicalApi, TransportError> {
    let transport = ReqwestTransport::new(config)?;
    let tokens = FileTokenStore::open(&config.token_file).await;
    Ok(ClinicalApi::new(ApiClient::new(
        Arc::new(transport),
        Arc::new(tokens),
    )))
}
