//! API gateway for the clinical records server.
//!
//! - [`ApiClient`]: bearer injection, single-flight token refresh and status
//!   classification for every outbound request
//! - [`ClinicalApi`]: typed endpoints on top of the client

mod client;
mod clinical;
mod error;
mod refresh;

pub use client::{ApiClient, REFRESH_PATH};
pub use clinical::{ClinicalApi, PDF_MEDIA_TYPE, paths};
pub use error::{ApiError, GENERIC_MESSAGE, RefreshFailure};
pub use refresh::RefreshCoordinator;
