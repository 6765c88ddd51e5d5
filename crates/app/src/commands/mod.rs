//! Command handlers.

pub mod auth;
pub mod dashboard;
pub mod diagnostic;
pub mod patients;
pub mod records;

use anyhow::bail;
use teacare_application::api::ClinicalApi;
use teacare_application::auth::{AuthSession, RouteDecision, RouteGuard};
use teacare_application::{ApplicationError, api::ApiError};
use teacare_domain::{Profile, ValidationErrors};

/// Shared state for one invocation.
pub struct Context {
    pub session: AuthSession,
    pub guard: RouteGuard,
    pub json: bool,
}

impl Context {
    pub fn new(api: ClinicalApi, json: bool) -> Self {
        Self {
            session: AuthSession::new(api),
            guard: RouteGuard::default(),
            json,
        }
    }

    pub const fn api(&self) -> &ClinicalApi {
        self.session.api()
    }

    /// Resolves the stored session and lets protected commands through only
    /// when it is authenticated.
    pub async fn require_session(&self) -> anyhow::Result<Profile> {
        let state = self.session.bootstrap().await;
        match self.guard.evaluate(&state) {
            RouteDecision::Render => match state.profile() {
                Some(profile) => Ok(profile.clone()),
                None => bail!("session has no profile"),
            },
            RouteDecision::Redirect { to } => {
                tracing::debug!(redirect = %to, "Protected command without a session");
                bail!("You are not signed in. Run `teacare login --email <email>` first.")
            }
            RouteDecision::ShowLoading => bail!("session is still loading"),
        }
    }
}

/// Turns an API failure into a one-line message for the terminal.
pub fn api_failure(err: ApiError) -> anyhow::Error {
    tracing::debug!(error = ?err, "API call failed");
    let mut message = err.user_message();
    if let Some(errors) = err.validation_errors() {
        push_fields(&mut message, errors);
    }
    anyhow::anyhow!(message)
}

/// Appends one indented line per field message.
pub fn push_fields(message: &mut String, errors: &ValidationErrors) {
    for (field, detail) in errors.fields() {
        message.push_str("\n  ");
        message.push_str(field);
        message.push_str(": ");
        message.push_str(detail);
    }
}

/// Same as [`api_failure`] for use-case errors.
pub fn app_failure(err: ApplicationError) -> anyhow::Error {
    match err {
        ApplicationError::Api(err) => api_failure(err),
        ApplicationError::Invalid(errors) => {
            let mut message = errors
                .global_or("Check the information and try again.")
                .to_string();
            push_fields(&mut message, &errors);
            anyhow::anyhow!(message)
        }
        other => anyhow::anyhow!(other.user_message()),
    }
}
