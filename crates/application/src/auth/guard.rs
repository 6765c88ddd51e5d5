//! Protected route gate.

use super::session::SessionState;

/// Default redirect target for signed-out visitors.
pub const LOGIN_ROUTE: &str = "/login";

/// What to do with a request for protected content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RouteDecision {
    /// The session is still resolving; show a loading indicator.
    ShowLoading,
    /// Send the visitor elsewhere.
    Redirect {
        /// Target route.
        to: String,
    },
    /// Render the protected content.
    Render,
}

/// Decides access to protected content from the session state alone.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteGuard {
    redirect_to: String,
}

impl RouteGuard {
    /// Guard redirecting to a custom route.
    #[must_use]
    pub fn new(redirect_to: impl Into<String>) -> Self {
        Self {
            redirect_to: redirect_to.into(),
        }
    }

    /// Redirect target.
    #[must_use]
    pub fn redirect_to(&self) -> &str {
        &self.redirect_to
    }

    /// Evaluates the guard.
    #[must_use]
    pub fn evaluate(&self, state: &SessionState) -> RouteDecision {
        match state {
            SessionState::Loading => RouteDecision::ShowLoading,
            SessionState::Unauthenticated => RouteDecision::Redirect {
                to: self.redirect_to.clone(),
            },
            SessionState::Authenticated(_) => RouteDecision::Render,
        }
    }
}

impl Default for RouteGuard {
    fn default() -> Self {
        Self::new(LOGIN_ROUTE)
    }
}
