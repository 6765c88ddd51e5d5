//! Authentication session state.
//!
//! Tracks whether a professional is signed in, keeps their profile, and
//! owns the token lifecycle around login and logout.

use parking_lot::RwLock;
use teacare_domain::{Credentials, Profile, ProfileUpdate, Registration, TokenKind};

use crate::api::{ApiError, ClinicalApi};
use crate::error::{ApplicationError, ApplicationResult};
use crate::ports::TokenStore;

/// Session lifecycle: `Loading` until [`AuthSession::bootstrap`] settles.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum SessionState {
    /// The initial profile fetch has not completed.
    #[default]
    Loading,
    /// Signed in.
    Authenticated(Profile),
    /// Signed out.
    Unauthenticated,
}

impl SessionState {
    /// True once a profile is loaded.
    #[must_use]
    pub const fn is_authenticated(&self) -> bool {
        matches!(self, Self::Authenticated(_))
    }

    /// True only before bootstrap completes.
    #[must_use]
    pub const fn is_loading(&self) -> bool {
        matches!(self, Self::Loading)
    }

    /// The signed-in profile.
    #[must_use]
    pub const fn profile(&self) -> Option<&Profile> {
        match self {
            Self::Authenticated(profile) => Some(profile),
            _ => None,
        }
    }
}

/// Authentication session provider.
#[derive(Debug)]
pub struct AuthSession {
    api: ClinicalApi,
    state: RwLock<SessionState>,
}

impl AuthSession {
    /// Create a session in the `Loading` state.
    #[must_use]
    pub fn new(api: ClinicalApi) -> Self {
        Self {
            api,
            state: RwLock::new(SessionState::Loading),
        }
    }

    /// The API this session authenticates.
    #[must_use]
    pub const fn api(&self) -> &ClinicalApi {
        &self.api
    }

    /// Snapshot of the current state.
    #[must_use]
    pub fn state(&self) -> SessionState {
        self.state.read().clone()
    }

    /// The signed-in profile, if any.
    #[must_use]
    pub fn profile(&self) -> Option<Profile> {
        self.state.read().profile().cloned()
    }

    /// Returns true when a profile is loaded.
    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.state.read().is_authenticated()
    }

    /// Returns true until bootstrap completes.
    #[must_use]
    pub fn is_loading(&self) -> bool {
        self.state.read().is_loading()
    }

    /// Resolves the initial state.
    ///
    /// Without a stored access token this settles on `Unauthenticated`
    /// without touching the network. Otherwise the profile is fetched; any
    /// failure wipes the stored tokens.
    pub async fn bootstrap(&self) -> SessionState {
        if self.tokens().get(TokenKind::Access).is_none() {
            tracing::debug!("No stored access token, starting signed out");
            self.set_state(SessionState::Unauthenticated);
        } else if let Err(err) = self.fetch_profile().await {
            tracing::info!(error = %err, "Stored session is no longer valid");
        }
        self.state()
    }

    /// Re-fetches the profile.
    ///
    /// # Errors
    /// On any failure the stored tokens are cleared, the state becomes
    /// `Unauthenticated` and the error is returned.
    pub async fn fetch_profile(&self) -> Result<Profile, ApiError> {
        match self.api.me().await {
            Ok(profile) => {
                tracing::debug!(email = %profile.email, "Profile loaded");
                self.set_state(SessionState::Authenticated(profile.clone()));
                Ok(profile)
            }
            Err(err) => {
                tracing::warn!(error = %err, "Failed to load profile");
                self.sign_out().await;
                Err(err)
            }
        }
    }

    /// Signs in and loads the profile.
    ///
    /// # Errors
    /// Returns the raw credentials error, or the profile fetch error after
    /// clearing the freshly stored tokens.
    pub async fn login(&self, credentials: &Credentials) -> Result<Profile, ApiError> {
        let pair = self.api.login(credentials).await?;
        self.tokens().set(TokenKind::Access, &pair.access).await?;
        self.tokens().set(TokenKind::Refresh, &pair.refresh).await?;
        tracing::info!(email = %credentials.email, "Signed in");
        self.fetch_profile().await
    }

    /// Signs out locally. No network call.
    pub async fn logout(&self) {
        self.sign_out().await;
        tracing::info!("Signed out");
    }

    /// Saves profile changes and keeps the session in sync.
    ///
    /// # Errors
    /// See [`ClinicalApi::update_me`].
    pub async fn update_profile(&self, update: &ProfileUpdate) -> Result<Profile, ApiError> {
        let profile = self.api.update_me(update).await?;
        self.set_state(SessionState::Authenticated(profile.clone()));
        Ok(profile)
    }

    /// Creates an account. The new professional still has to sign in.
    ///
    /// # Errors
    /// Returns [`ApplicationError::Invalid`] if the form fails local checks,
    /// without contacting the server.
    pub async fn register(&self, registration: &Registration) -> ApplicationResult<Profile> {
        let errors = registration.validate();
        if !errors.is_empty() {
            return Err(ApplicationError::Invalid(errors));
        }
        let profile = self.api.register(registration).await?;
        tracing::info!(email = %profile.email, "Account created");
        Ok(profile)
    }

    fn tokens(&self) -> &dyn TokenStore {
        self.api.client().tokens().as_ref()
    }

    async fn sign_out(&self) {
        if let Err(err) = self.tokens().clear_all().await {
            tracing::error!(error = %err, "Failed to clear stored tokens");
        }
        self.set_state(SessionState::Unauthenticated);
    }

    fn set_state(&self, state: SessionState) {
        *self.state.write() = state;
    }
}
