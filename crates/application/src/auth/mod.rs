//! Authentication for the TEAcare client.
//!
//! This module provides:
//! - In-memory token storage
//! - The session provider that owns login, logout and the signed-in profile
//! - The route guard deciding access to protected content

mod guard;
mod session;
mod token_store;

pub use guard::{LOGIN_ROUTE, RouteDecision, RouteGuard};
pub use session::{AuthSession, SessionState};
pub use token_store::MemoryTokenStore;
