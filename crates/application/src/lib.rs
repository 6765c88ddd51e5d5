//! TEAcare Application - Use cases and ports
//!
//! This crate holds the client-side behaviour of TEAcare: the API client
//! with its shared token refresh, the authentication session and route
//! guard, and the diagnostic questionnaire wizard. I/O happens only through
//! the traits in [`ports`].

pub mod api;
pub mod auth;
pub mod diagnostic;
pub mod error;
pub mod ports;

#[cfg(test)]
mod testing;

pub use error::{ApplicationError, ApplicationResult};
